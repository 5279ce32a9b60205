mod csv;
mod json;
mod plot;
mod text;

use chrono::Utc;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::plot::{PlotRecorder, gnuplot_script};
pub use self::text::TextFormatter;

use crate::processing::BeatEvent;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// One reported heartbeat.
pub struct BeatOutput {
    pub tick: u64,
    /// Time of the beat since the first sample
    pub time_ms: f32,
    pub bpm: Option<f32>,
    pub rr_ms: Option<f32>,
    pub filtered: i32,
}

impl BeatOutput {
    pub fn from_event(event: &BeatEvent, period_ms: f32) -> Self {
        Self {
            tick: event.tick,
            time_ms: event.tick as f32 * period_ms,
            bpm: event.bpm,
            rr_ms: event.bpm.map(|bpm| crate::constants::MS_PER_MINUTE / bpm),
            filtered: event.filtered,
        }
    }
}

pub trait Formatter: Send {
    fn format(&self, output: &BeatOutput) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
