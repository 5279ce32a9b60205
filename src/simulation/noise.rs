use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Impairments added to a clean synthetic lead, all in ADC counts
///
/// Loaded from TOML by `generate_ecg`:
///
/// ```toml
/// seed = 7
/// [additive]
/// std_dev = 15.0
/// [baseline_wander]
/// amplitude = 100.0
/// frequency_hz = 0.3
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub baseline_wander: Option<SinusoidConfig>,
    pub mains: Option<SinusoidConfig>,
    pub impulse: Option<ImpulseNoiseConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, std_dev: f32) -> Self {
        self.additive = Some(AdditiveNoiseConfig { std_dev });
        self
    }

    /// Slow baseline drift from respiration and electrode movement.
    pub fn with_baseline_wander(mut self, amplitude: f32, frequency_hz: f32) -> Self {
        self.baseline_wander = Some(SinusoidConfig {
            amplitude,
            frequency_hz,
        });
        self
    }

    /// Power-line interference.
    pub fn with_mains(mut self, amplitude: f32, frequency_hz: f32) -> Self {
        self.mains = Some(SinusoidConfig {
            amplitude,
            frequency_hz,
        });
        self
    }

    pub fn with_impulse(mut self, rate_hz: f32, amplitude: f32, duration_samples: usize) -> Self {
        self.impulse = Some(ImpulseNoiseConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdditiveNoiseConfig {
    pub std_dev: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SinusoidConfig {
    pub amplitude: f32,
    pub frequency_hz: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpulseNoiseConfig {
    pub rate_hz: f32,
    pub amplitude: f32,
    pub duration_samples: usize,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn apply_additive_noise(signal: &mut [f32], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let Ok(normal) = Normal::new(0.0, f64::from(config.std_dev)) else {
        log::warn!("Ignoring additive noise with std_dev {}", config.std_dev);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng) as f32;
    }
}

fn apply_sinusoid(signal: &mut [f32], config: &SinusoidConfig, sample_rate: f32, phase: f32) {
    let omega = 2.0 * PI * config.frequency_hz / sample_rate;
    for (i, sample) in signal.iter_mut().enumerate() {
        *sample += config.amplitude * (omega * i as f32 + phase).sin();
    }
}

fn apply_impulse_noise(
    signal: &mut [f32],
    config: &ImpulseNoiseConfig,
    sample_rate: f32,
    rng: &mut ChaCha8Rng,
) {
    let n = signal.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between_impulses = sample_rate / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f32>() * 2.0 * avg_samples_between_impulses) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples).min(n);

        for sample in signal[pos..end].iter_mut() {
            *sample += sign * config.amplitude;
        }
    }
}

/// Return a noisy copy of `clean_signal`. Seeded configs are reproducible.
pub fn apply_noise(clean_signal: &[f32], config: &NoiseConfig, sample_rate: f32) -> Vec<f32> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref wander) = config.baseline_wander {
        let phase = rng.random::<f32>() * 2.0 * PI;
        apply_sinusoid(&mut signal, wander, sample_rate, phase);
    }

    if let Some(ref mains) = config.mains {
        let phase = rng.random::<f32>() * 2.0 * PI;
        apply_sinusoid(&mut signal, mains, sample_rate, phase);
    }

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut signal, additive_config, &mut rng);
    }

    if let Some(ref impulse_config) = config.impulse {
        apply_impulse_noise(&mut signal, impulse_config, sample_rate, &mut rng);
    }

    signal
}

/// Root-mean-square of `noisy - clean`.
pub fn noise_rms(clean: &[f32], noisy: &[f32]) -> f32 {
    let n = clean.len().min(noisy.len());
    if n == 0 {
        return 0.0;
    }
    let power: f32 = clean
        .iter()
        .zip(noisy)
        .map(|(c, x)| (x - c) * (x - c))
        .sum::<f32>()
        / n as f32;
    power.sqrt()
}
