//! Beat indicators driven from the detector output: beeper, LED, and the
//! heart-rate display.

pub mod display;
pub mod pulse;

pub use display::{SevenSegmentDisplay, encode_bpm};
pub use pulse::PulseIndicator;
