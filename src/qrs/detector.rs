use crate::config::{DetectorConfig, EcgConfig};
use crate::signal_processing::{
    AdaptiveThreshold, BiquadCascade, FivePointDerivative, PeakDetector, RunningAverage,
};

/// Edge and timing state of the dual-branch combiner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombinerState {
    /// Beat decision of the current tick
    pub beat: bool,
    /// Beat decision of the previous evaluated tick
    pub previous_beat: bool,
    /// Ticks since the last beat ended; zeroed on the falling edge
    pub refractory_counter: u32,
    /// Ticks seen since startup, saturating
    pub startup_counter: u32,
}

/// Everything the detector computed for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOutput {
    /// Zero-based tick index since construction
    pub tick: u64,
    pub raw: u16,
    /// Low-pass filtered sample; signed, may leave the ADC range
    pub filtered: i32,
    /// Running average of the squared derivative
    pub windowed_energy: i32,
    pub left_threshold: i32,
    pub right_threshold: i32,
    /// True while both branches agree outside the refractory period
    pub beat: bool,
    /// True on the first tick of a beat
    pub rising_edge: bool,
}

/// Dual-branch QRS detector
///
/// Runs the full per-sample pipeline: 20 Hz low-pass cascade, then
/// - left branch: peak detector on the filtered signal feeding a fast
///   threshold tracker;
/// - right branch: five-point derivative, squared, 200 ms running average,
///   peak detector, slow threshold tracker.
///
/// A beat is declared while the filtered sample is above the left threshold,
/// the windowed energy is above the right threshold, and the refractory
/// counter has passed its limit. The refractory counter restarts when a beat
/// ends. Nothing is evaluated during the startup-ignore period.
///
/// All state is owned by the detector and advanced once per [`process_sample`]
/// call, so independent detectors never interact.
///
/// [`process_sample`]: QrsDetector::process_sample
#[derive(Debug, Clone)]
pub struct QrsDetector {
    config: DetectorConfig,
    lowpass: BiquadCascade,
    left_peak: PeakDetector,
    left_threshold: AdaptiveThreshold,
    derivative: FivePointDerivative,
    window: RunningAverage,
    right_peak: PeakDetector,
    right_threshold: AdaptiveThreshold,
    state: CombinerState,
    tick: u64,
}

impl QrsDetector {
    /// Build a detector from a validated configuration.
    pub fn new(config: &EcgConfig) -> Self {
        let ceiling = config.sample_max();
        Self {
            config: config.detector.clone(),
            lowpass: BiquadCascade::lowpass_20hz(config.sampling.adc_bits),
            left_peak: PeakDetector::new(),
            left_threshold: AdaptiveThreshold::new(&config.left_threshold, ceiling),
            derivative: FivePointDerivative::new(),
            window: RunningAverage::new(config.detector.window_size),
            right_peak: PeakDetector::new(),
            right_threshold: AdaptiveThreshold::new(&config.right_threshold, ceiling),
            state: CombinerState::default(),
            tick: 0,
        }
    }

    /// Advance the pipeline by one tick
    ///
    /// `raw` must be within the configured ADC range; it is not clamped.
    pub fn process_sample(&mut self, raw: u16) -> DetectorOutput {
        let tick = self.tick;
        self.tick += 1;

        let filtered = self.lowpass.process(i32::from(raw));

        // Left side: peaks of the filtered signal.
        let peak_left = self.left_peak.step(filtered);
        let left_threshold = self.left_threshold.update(peak_left);

        // Right side: peaks of the windowed slope energy. Saturate so an
        // out-of-contract sample cannot overflow the square.
        let derivative = self.derivative.step(filtered);
        let energy = derivative.saturating_mul(derivative);
        let windowed_energy = self.window.push(energy);
        let peak_right = self.right_peak.step(windowed_energy);

        self.state.startup_counter = self.state.startup_counter.saturating_add(1);
        if self.state.startup_counter < self.config.startup_ignore_ticks {
            return DetectorOutput {
                tick,
                raw,
                filtered,
                windowed_energy,
                left_threshold,
                right_threshold: self.right_threshold.threshold(),
                beat: false,
                rising_edge: false,
            };
        }
        let right_threshold = self.right_threshold.update(peak_right);

        self.state.previous_beat = self.state.beat;
        self.state.refractory_counter = self.state.refractory_counter.saturating_add(1);
        self.state.beat = filtered > left_threshold
            && windowed_energy > right_threshold
            && self.state.refractory_counter > self.config.refractory_ticks;
        if self.state.previous_beat && !self.state.beat {
            self.state.refractory_counter = 0;
        }

        let rising_edge = self.state.beat && !self.state.previous_beat;
        if rising_edge {
            log::debug!(
                "QRS at tick {}: filtered {} > {}, energy {} > {}",
                tick,
                filtered,
                left_threshold,
                windowed_energy,
                right_threshold
            );
        }
        log::trace!(
            "tick {} raw {} filtered {} thresholds {}/{} energy {} beat {}",
            tick,
            raw,
            filtered,
            left_threshold,
            right_threshold,
            windowed_energy,
            self.state.beat
        );

        DetectorOutput {
            tick,
            raw,
            filtered,
            windowed_energy,
            left_threshold,
            right_threshold,
            beat: self.state.beat,
            rising_edge,
        }
    }

    /// Run a whole buffer through [`process_sample`](Self::process_sample).
    pub fn process_buffer(&mut self, samples: &[u16]) -> Vec<DetectorOutput> {
        samples.iter().map(|&s| self.process_sample(s)).collect()
    }

    pub fn state(&self) -> &CombinerState {
        &self.state
    }

    pub fn left_threshold(&self) -> &AdaptiveThreshold {
        &self.left_threshold
    }

    pub fn right_threshold(&self) -> &AdaptiveThreshold {
        &self.right_threshold
    }

    /// Number of samples processed so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// True once the startup-ignore period is over.
    pub fn is_settled(&self) -> bool {
        self.state.startup_counter >= self.config.startup_ignore_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse_train(len: usize, period: usize, offset: usize, width: usize, amp: u16) -> Vec<u16> {
        (0..len)
            .map(|i| {
                let phase = i % period;
                if phase >= offset && phase < offset + width {
                    amp
                } else {
                    0
                }
            })
            .collect()
    }

    #[test]
    fn test_zero_input_keeps_configured_thresholds() {
        let config = EcgConfig::default();
        let mut detector = QrsDetector::new(&config);

        for out in detector.process_buffer(&vec![0; 2000]) {
            assert_eq!(out.filtered, 0);
            assert_eq!(out.windowed_energy, 0);
            assert_eq!(out.left_threshold, config.left_threshold.initial_threshold);
            assert_eq!(out.right_threshold, config.right_threshold.initial_threshold);
            assert!(!out.beat);
        }
        assert_eq!(detector.left_threshold().running_max(), 0);
        assert_eq!(detector.right_threshold().running_min(), 0x2FF);
    }

    #[test]
    fn test_no_beats_during_startup() {
        let config = EcgConfig::default();
        let mut detector = QrsDetector::new(&config);
        let signal = pulse_train(249, 100, 10, 20, 4095);

        let outputs = detector.process_buffer(&signal);

        assert!(outputs.iter().all(|o| !o.beat));
        assert!(!detector.is_settled());
        assert_eq!(detector.state().refractory_counter, 0);
        detector.process_sample(0);
        assert!(detector.is_settled());
        assert_eq!(detector.state().refractory_counter, 1);
    }

    #[test]
    fn test_refractory_counter_resets_on_falling_edge() {
        let config = EcgConfig::default();
        let mut detector = QrsDetector::new(&config);
        let signal = pulse_train(2000, 500, 200, 20, 4095);

        let mut prev_beat = false;
        for &s in &signal {
            let out = detector.process_sample(s);
            if prev_beat && !out.beat {
                assert_eq!(detector.state().refractory_counter, 0);
            }
            prev_beat = out.beat;
        }
    }

    #[test]
    fn test_refractory_period_skips_close_pulses() {
        let mut config = EcgConfig::default();
        config.detector.refractory_ticks = 200;
        let mut detector = QrsDetector::new(&config);
        // A pulse every 120 ticks: every other one falls inside the gate.
        let signal = pulse_train(4000, 120, 10, 20, 3000);

        let outputs = detector.process_buffer(&signal);

        let mut rising = Vec::new();
        let mut last_fall: Option<u64> = None;
        let mut prev = false;
        for out in &outputs {
            if out.rising_edge {
                if let Some(fall) = last_fall {
                    assert!(out.tick - fall > 200, "beat at {} too close", out.tick);
                }
                rising.push(out.tick);
            }
            if prev && !out.beat {
                last_fall = Some(out.tick);
            }
            prev = out.beat;
        }

        assert!(rising.len() >= 10, "only {} beats", rising.len());
        for pair in rising.windows(2) {
            assert_eq!(pair[1] - pair[0], 240);
        }
    }

    /// Pulses every 400 ticks on a 1400 baseline with +-60 counts of
    /// xorshift noise.
    fn noisy_pulses(len: usize) -> Vec<u16> {
        let mut state: u32 = 0x1234_5678;
        (0..len)
            .map(|i| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let noise = (state % 121) as i32 - 60;
                let base = if (100..120).contains(&(i % 400)) { 3000 } else { 1400 };
                (base + noise).clamp(0, 4095) as u16
            })
            .collect()
    }

    #[test]
    fn test_noisy_stream_filtered_values_and_beats() {
        let config = EcgConfig::default();
        let mut detector = QrsDetector::new(&config);
        let outputs = detector.process_buffer(&noisy_pulses(3000));

        let rising: Vec<u64> = outputs
            .iter()
            .filter(|o| o.rising_edge)
            .map(|o| o.tick)
            .collect();
        assert_eq!(rising, vec![512, 929, 1331, 1731, 2130, 2531, 2931]);

        let pinned = [
            (0, 0),
            (250, 1260),
            (500, 1289),
            (512, 2130),
            (1000, 1244),
            (1500, 1315),
            (2000, 1281),
            (2264, 1337),
            (2500, 1301),
            (2999, 1335),
        ];
        for (tick, filtered) in pinned {
            assert_eq!(outputs[tick].filtered, filtered, "filtered at tick {}", tick);
        }

        // A one-count rounding change anywhere in the stream moves the sum.
        let sum: i64 = outputs.iter().map(|o| i64::from(o.filtered)).sum();
        assert_eq!(sum, 4_115_647);
    }

    #[test]
    fn test_independent_detectors_do_not_interact() {
        let config = EcgConfig::default();
        let mut a = QrsDetector::new(&config);
        let mut b = QrsDetector::new(&config);
        let signal = pulse_train(1500, 500, 200, 20, 4095);

        let mut interleaved = Vec::new();
        for &s in &signal {
            interleaved.push(a.process_sample(s));
            b.process_sample(4095 - s);
        }

        let mut fresh = QrsDetector::new(&config);
        assert_eq!(fresh.process_buffer(&signal), interleaved);
    }
}
