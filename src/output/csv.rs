use super::{BeatOutput, Formatter, iso8601_timestamp};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, output: &BeatOutput) -> String {
        let bpm = output.bpm.map_or(String::new(), |b| format!("{:.1}", b));
        let rr = output.rr_ms.map_or(String::new(), |r| format!("{:.1}", r));
        format!(
            "{},{},{:.1},{},{},{}",
            iso8601_timestamp(),
            output.tick,
            output.time_ms,
            bpm,
            rr,
            output.filtered
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,tick,time_ms,bpm,rr_ms,filtered")
    }
}
