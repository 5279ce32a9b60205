pub mod biquad;
pub mod derivative;
pub mod moving_average;
pub mod peak_detector;
pub mod threshold;

pub use biquad::{Biquad, BiquadCascade, BiquadCoeffs, BiquadState, LOWPASS_20HZ};
pub use derivative::FivePointDerivative;
pub use moving_average::RunningAverage;
pub use peak_detector::PeakDetector;
pub use threshold::AdaptiveThreshold;
