use serde::{Deserialize, Serialize};

use crate::constants::ADC_MAX;

/// Shape of a synthetic lead signal
///
/// Each beat is a sum of Gaussian bumps on a DC baseline, placed in seconds
/// from the start of the beat: P wave, R peak, S dip following the R, and a
/// T wave.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EcgWaveform {
    pub heart_rate_bpm: f32,
    /// DC level in ADC counts
    pub baseline: f32,
    /// R-peak height above baseline in ADC counts
    pub qrs_amplitude: f32,
    /// Standard deviation of the R bump in seconds
    pub qrs_width_secs: f32,
}

impl Default for EcgWaveform {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 72.0,
            baseline: 1400.0,
            qrs_amplitude: 800.0,
            qrs_width_secs: 0.02,
        }
    }
}

impl EcgWaveform {
    pub fn with_heart_rate(mut self, bpm: f32) -> Self {
        self.heart_rate_bpm = bpm;
        self
    }

    pub fn with_qrs_amplitude(mut self, amplitude: f32) -> Self {
        self.qrs_amplitude = amplitude;
        self
    }

    /// `(centre, relative amplitude, width)` of each bump, in seconds.
    fn components(&self) -> [(f32, f32, f32); 4] {
        let w = self.qrs_width_secs;
        [
            (0.10, 0.12, 0.020),
            (0.25, 1.0, w),
            (0.25 + 1.8 * w, -0.15, 0.8 * w),
            (0.45, 0.25, 0.040),
        ]
    }

    /// Beat period in samples.
    pub fn period_samples(&self, sample_rate: f32) -> f32 {
        sample_rate * 60.0 / self.heart_rate_bpm
    }

    /// Level at time `t` seconds into a beat.
    pub fn value_at(&self, t: f32) -> f32 {
        self.components()
            .iter()
            .fold(self.baseline, |acc, &(centre, rel, width)| {
                let z = (t - centre) / width;
                acc + self.qrs_amplitude * rel * (-0.5 * z * z).exp()
            })
    }
}

/// Unquantized synthetic ECG in ADC counts.
pub fn generate_ecg(waveform: &EcgWaveform, duration_secs: f32, sample_rate: f32) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate) as usize;
    let period = waveform.period_samples(sample_rate);

    (0..num_samples)
        .map(|i| waveform.value_at((i as f32 % period) / sample_rate))
        .collect()
}

/// Truncate to integers and clamp into the 12-bit ADC range.
pub fn quantize(signal: &[f32]) -> Vec<u16> {
    signal
        .iter()
        .map(|&v| (v as i32).clamp(0, ADC_MAX) as u16)
        .collect()
}

/// Rectangular pulses: `amplitude` for `width` ticks every `period` ticks,
/// starting at `offset`, zero elsewhere.
pub fn generate_pulse_train(
    num_samples: usize,
    offset: usize,
    period: usize,
    width: usize,
    amplitude: u16,
) -> Vec<u16> {
    (0..num_samples)
        .map(|i| {
            if i >= offset && (i - offset) % period.max(1) < width {
                amplitude
            } else {
                0
            }
        })
        .collect()
}
