use super::{BeatOutput, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, output: &BeatOutput) -> String {
        let bpm = output
            .bpm
            .map_or("   -".to_string(), |b| format!("{:>4.1}", b));
        if self.verbose {
            let rr = output
                .rr_ms
                .map_or("-".to_string(), |r| format!("{:.0} ms", r));
            format!(
                "Beat at {:>8.3} s: {} bpm [tick: {}, RR: {}, filtered: {}]",
                output.time_ms / 1000.0,
                bpm,
                output.tick,
                rr,
                output.filtered
            )
        } else {
            format!("Beat at {:>8.3} s: {} bpm", output.time_ms / 1000.0, bpm)
        }
    }
}
