pub mod config;
pub mod constants;
pub mod error;
pub mod indicator;
pub mod output;
pub mod processing;
pub mod qrs;
pub mod signal_processing;
pub mod source;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{EcgConfig, SampleRate};
pub use error::{EcgError, Result};
pub use processing::{BeatEvent, EcgProcessor};
pub use qrs::{DetectorOutput, QrsDetector};
pub use wav::save_wav;
