mod measure;
mod noise;
mod signal;

pub use measure::{HeartRateMeasurement, measure_heart_rate};
pub use noise::{
    AdditiveNoiseConfig, ImpulseNoiseConfig, NoiseConfig, SinusoidConfig, apply_noise, noise_rms,
};
pub use signal::{EcgWaveform, generate_ecg, generate_pulse_train, quantize};
