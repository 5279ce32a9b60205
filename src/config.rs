//! Configuration for the qrsbeat detector.
//!
//! Every timing constant of the detector is expressed in ticks (samples), not
//! wall time. The defaults are tuned for a 500 Hz, 12-bit front-end; use
//! [`EcgConfig::for_sample_rate`] to derive tick counts for another rate.
//!
//! ## Loading from TOML
//!
//! ```
//! use qrsbeat::config::EcgConfig;
//!
//! let config = EcgConfig::from_toml_str(
//!     r#"
//!     [sampling]
//!     sample_rate = "2ms"
//!     adc_bits = 12
//!
//!     [detector]
//!     refractory_ticks = 120
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.detector.refractory_ticks, 120);
//! assert_eq!(config.detector.window_size, 100);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{ADC_BITS, NOMINAL_SAMPLE_RATE_HZ};
use crate::error::{EcgError, Result};

/// Sampling rate specification
///
/// Can be specified as either a rate in Hz or a sample period; sampling
/// timers are usually set up by period ("every 2 ms").
///
/// # Parsing formats
/// - `500` - rate in Hz (no suffix)
/// - `500hz` or `500Hz` - rate in Hz (explicit)
/// - `2ms` - period in milliseconds
/// - `2000us` or `2000μs` - period in microseconds
///
/// # Example
/// ```
/// use qrsbeat::config::SampleRate;
///
/// let rate: SampleRate = "2ms".parse().unwrap();
/// assert!((rate.as_hz() - 500.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "SampleRateRepr")]
pub struct SampleRate(f32);

impl SampleRate {
    /// Create from a rate in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Create from a sample period in milliseconds
    pub fn from_period_ms(ms: f32) -> Self {
        Self(1000.0 / ms)
    }

    /// Get rate in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }

    /// Get sample period in milliseconds
    pub fn period_ms(&self) -> f32 {
        1000.0 / self.0
    }

    /// Number of ticks covering `ms` milliseconds, rounded to nearest.
    pub fn ticks_for_ms(&self, ms: f32) -> u32 {
        (ms / self.period_ms()).round() as u32
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        Self::from_hz(NOMINAL_SAMPLE_RATE_HZ)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}hz", self.0)
    }
}

impl FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        let parse_positive = |num: &str, what: &str| -> std::result::Result<f32, String> {
            let value: f32 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid {}: {}", what, s))?;
            if value <= 0.0 || !value.is_finite() {
                return Err(format!("{} must be positive", what));
            }
            Ok(value)
        };

        if let Some(num) = s.strip_suffix("ms") {
            return Ok(Self::from_period_ms(parse_positive(num, "period")?));
        }

        if let Some(num) = s.strip_suffix("us").or_else(|| s.strip_suffix("μs")) {
            let us = parse_positive(num, "period")?;
            return Ok(Self::from_period_ms(us / 1000.0));
        }

        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        Ok(Self::from_hz(parse_positive(num, "sample rate")?))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SampleRateRepr {
    Hz(f32),
    Text(String),
}

impl TryFrom<SampleRateRepr> for SampleRate {
    type Error = String;

    fn try_from(repr: SampleRateRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            SampleRateRepr::Hz(hz) if hz > 0.0 && hz.is_finite() => Ok(Self::from_hz(hz)),
            SampleRateRepr::Hz(hz) => Err(format!("sample rate must be positive, got {}", hz)),
            SampleRateRepr::Text(s) => s.parse(),
        }
    }
}

/// Complete detector configuration
///
/// Use `EcgConfig::default()` for the 500 Hz / 12-bit tuning.
///
/// # Example
/// ```
/// use qrsbeat::config::EcgConfig;
///
/// let mut config = EcgConfig::default();
/// config.detector.refractory_ticks = 120;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EcgConfig {
    /// ADC sampling parameters
    pub sampling: SamplingConfig,
    /// Combiner timing parameters
    pub detector: DetectorConfig,
    /// Threshold tracker on the filtered signal
    pub left_threshold: ThresholdConfig,
    /// Threshold tracker on the windowed derivative energy
    pub right_threshold: ThresholdConfig,
    /// Beeper and LED pulse shapes
    pub indicator: IndicatorConfig,
}

/// ADC sampling configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Tick rate of the detector
    pub sample_rate: SampleRate,
    /// ADC resolution; samples are in `[0, 2^adc_bits)`
    pub adc_bits: u32,
}

/// Tick counts used by the dual-branch combiner
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Running-average window length over the squared derivative (200 ms)
    pub window_size: usize,
    /// Minimum ticks after a beat ends before another may start (200 ms)
    pub refractory_ticks: u32,
    /// Ticks ignored at startup while the trackers settle (500 ms)
    pub startup_ignore_ticks: u32,
}

/// Initial envelope and decay of one adaptive threshold tracker
///
/// All four fields are required when given in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ThresholdConfig {
    pub initial_threshold: i32,
    pub initial_max: i32,
    pub initial_min: i32,
    /// Amount the envelope closes in on every real peak
    pub decay: i32,
}

/// Beeper and LED pulse configuration, in detector ticks
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Beep length after a rising beat edge (100 ms)
    pub beep_ticks: u32,
    /// Beeper output flips every this many ticks (125 Hz tone at 500 Hz)
    pub beep_toggle_ticks: u32,
    /// LED on-time after a rising beat edge (100 ms)
    pub led_ticks: u32,
}

impl EcgConfig {
    /// Parse a TOML document; missing tables and fields fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| EcgError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Defaults with every tick count rescaled for `sample_rate`.
    pub fn for_sample_rate(sample_rate: SampleRate) -> Self {
        Self {
            sampling: SamplingConfig {
                sample_rate,
                ..SamplingConfig::default()
            },
            detector: DetectorConfig::for_sample_rate(sample_rate),
            indicator: IndicatorConfig::for_sample_rate(sample_rate),
            ..Self::default()
        }
    }

    /// Largest representable sample value, used as the envelope ceiling.
    pub fn sample_max(&self) -> i32 {
        (1i32 << self.sampling.adc_bits) - 1
    }

    pub fn validate(&self) -> Result<()> {
        let rate = self.sampling.sample_rate.as_hz();
        if rate <= 0.0 || !rate.is_finite() {
            return Err(EcgError::Config(format!("invalid sample rate {}", rate)));
        }
        if !(1..=16).contains(&self.sampling.adc_bits) {
            return Err(EcgError::Config(format!(
                "adc_bits must be in 1..=16, got {}",
                self.sampling.adc_bits
            )));
        }
        if self.detector.window_size == 0 {
            return Err(EcgError::Config("window_size must be non-zero".to_string()));
        }
        if self.indicator.beep_toggle_ticks == 0 {
            return Err(EcgError::Config(
                "beep_toggle_ticks must be non-zero".to_string(),
            ));
        }

        let max = self.sample_max();
        for (name, t) in [
            ("left_threshold", &self.left_threshold),
            ("right_threshold", &self.right_threshold),
        ] {
            if t.decay < 0 {
                return Err(EcgError::Config(format!("{}: decay must be >= 0", name)));
            }
            for (field, value) in [
                ("initial_threshold", t.initial_threshold),
                ("initial_max", t.initial_max),
                ("initial_min", t.initial_min),
            ] {
                if !(0..=max).contains(&value) {
                    return Err(EcgError::Config(format!(
                        "{}.{} = {} outside [0, {}]",
                        name, field, value, max
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for EcgConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            detector: DetectorConfig::default(),
            left_threshold: ThresholdConfig::left(),
            right_threshold: ThresholdConfig::right(),
            indicator: IndicatorConfig::default(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::default(),
            adc_bits: ADC_BITS,
        }
    }
}

impl DetectorConfig {
    pub fn for_sample_rate(sample_rate: SampleRate) -> Self {
        Self {
            window_size: (sample_rate.ticks_for_ms(200.0) as usize).max(1),
            refractory_ticks: sample_rate.ticks_for_ms(200.0),
            startup_ignore_ticks: sample_rate.ticks_for_ms(500.0),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            refractory_ticks: 100,
            startup_ignore_ticks: 250,
        }
    }
}

impl ThresholdConfig {
    /// Filtered-signal tracker: fast decay, wide initial envelope.
    pub fn left() -> Self {
        Self {
            initial_threshold: 0x7FF,
            initial_max: 0x000,
            initial_min: 0xFFF,
            decay: 15,
        }
    }

    /// Derivative-energy tracker: slow decay, low initial floor.
    pub fn right() -> Self {
        Self {
            initial_threshold: 0x7FF,
            initial_max: 0x000,
            initial_min: 0x2FF,
            decay: 4,
        }
    }
}

impl IndicatorConfig {
    pub fn for_sample_rate(sample_rate: SampleRate) -> Self {
        Self {
            beep_ticks: sample_rate.ticks_for_ms(100.0),
            beep_toggle_ticks: sample_rate.ticks_for_ms(4.0).max(1),
            led_ticks: sample_rate.ticks_for_ms(100.0),
        }
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            beep_ticks: 50,
            beep_toggle_ticks: 2,
            led_ticks: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_rate_from_hz() {
        let rate: SampleRate = "500".parse().unwrap();
        assert!((rate.as_hz() - 500.0).abs() < 1e-3);

        let rate: SampleRate = "250Hz".parse().unwrap();
        assert!((rate.as_hz() - 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_sample_rate_from_period() {
        let rate: SampleRate = "2ms".parse().unwrap();
        assert!((rate.as_hz() - 500.0).abs() < 1e-3);

        let rate: SampleRate = "4000us".parse().unwrap();
        assert!((rate.as_hz() - 250.0).abs() < 1e-3);

        let rate: SampleRate = "1000μs".parse().unwrap();
        assert!((rate.as_hz() - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_sample_rate_invalid() {
        assert!("abc".parse::<SampleRate>().is_err());
        assert!("-500hz".parse::<SampleRate>().is_err());
        assert!("0ms".parse::<SampleRate>().is_err());
    }

    #[test]
    fn test_defaults_match_500hz_tuning() {
        let config = EcgConfig::for_sample_rate(SampleRate::from_hz(500.0));
        assert_eq!(config.detector, DetectorConfig::default());
        assert_eq!(config.indicator, IndicatorConfig::default());
        assert_eq!(config.sample_max(), 0xFFF);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rescale_for_1khz() {
        let detector = DetectorConfig::for_sample_rate(SampleRate::from_hz(1000.0));
        assert_eq!(detector.window_size, 200);
        assert_eq!(detector.refractory_ticks, 200);
        assert_eq!(detector.startup_ignore_ticks, 500);
    }

    #[test]
    fn test_toml_partial_override() {
        let config = EcgConfig::from_toml_str(
            r#"
            [sampling]
            sample_rate = 500

            [right_threshold]
            initial_threshold = 100
            initial_max = 0
            initial_min = 200
            decay = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.right_threshold.decay, 2);
        assert_eq!(config.left_threshold, ThresholdConfig::left());
        assert_eq!(config.detector.startup_ignore_ticks, 250);
    }

    #[test]
    fn test_toml_rejects_invalid() {
        assert!(EcgConfig::from_toml_str("[detector]\nwindow_size = 0\n").is_err());
        assert!(EcgConfig::from_toml_str("[sampling]\nadc_bits = 24\n").is_err());
        assert!(EcgConfig::from_toml_str("[sampling]\nsample_rate = \"fast\"\n").is_err());
    }
}
