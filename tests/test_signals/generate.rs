use qrsbeat::DetectorOutput;
use qrsbeat::simulation::{EcgWaveform, NoiseConfig, apply_noise, generate_ecg, quantize};

pub const SAMPLE_RATE: f32 = 500.0;

/// Full-scale rectangular pulses `width` ticks wide every `period` ticks,
/// starting at `offset`.
pub fn pulse_train(num_samples: usize, offset: usize, period: usize, width: usize) -> Vec<u16> {
    (0..num_samples)
        .map(|i| {
            if i >= offset && (i - offset) % period < width {
                4095
            } else {
                0
            }
        })
        .collect()
}

/// Clean synthetic lead at the nominal 500 Hz rate.
pub fn synthetic_ecg(bpm: f32, qrs_amplitude: f32, duration_secs: f32) -> Vec<u16> {
    let waveform = EcgWaveform::default()
        .with_heart_rate(bpm)
        .with_qrs_amplitude(qrs_amplitude);
    quantize(&generate_ecg(&waveform, duration_secs, SAMPLE_RATE))
}

/// Synthetic lead with Gaussian noise and slow baseline wander.
pub fn noisy_ecg(bpm: f32, duration_secs: f32, std_dev: f32, wander: f32, seed: u64) -> Vec<u16> {
    let waveform = EcgWaveform::default().with_heart_rate(bpm);
    let clean = generate_ecg(&waveform, duration_secs, SAMPLE_RATE);
    let noise = NoiseConfig::default()
        .with_seed(seed)
        .with_awgn(std_dev)
        .with_baseline_wander(wander, 0.3);
    quantize(&apply_noise(&clean, &noise, SAMPLE_RATE))
}

/// Ticks where the beat decision goes from false to true.
pub fn rising_edges(outputs: &[DetectorOutput]) -> Vec<u64> {
    outputs
        .iter()
        .filter(|o| o.rising_edge)
        .map(|o| o.tick)
        .collect()
}
