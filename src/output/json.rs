use super::{BeatOutput, Formatter, iso8601_timestamp};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, output: &BeatOutput) -> String {
        let bpm = output
            .bpm
            .map_or("null".to_string(), |b| format!("{:.1}", b));
        let rr = output
            .rr_ms
            .map_or("null".to_string(), |r| format!("{:.1}", r));
        format!(
            r#"{{"ts":"{}","tick":{},"time_ms":{:.1},"bpm":{},"rr_ms":{},"filtered":{}}}"#,
            iso8601_timestamp(),
            output.tick,
            output.time_ms,
            bpm,
            rr,
            output.filtered
        )
    }
}
