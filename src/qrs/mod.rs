pub mod bpm;
pub mod detector;

pub use bpm::BpmCalculator;
pub use detector::{CombinerState, DetectorOutput, QrsDetector};
