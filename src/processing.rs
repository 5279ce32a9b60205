use crate::config::EcgConfig;
use crate::indicator::PulseIndicator;
use crate::qrs::{BpmCalculator, DetectorOutput, QrsDetector};

/// A detected heartbeat (rising edge of the beat decision).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatEvent {
    pub tick: u64,
    /// Rate from the interval to the previous beat; `None` for the first.
    pub bpm: Option<f32>,
    /// Low-passed sample at the edge
    pub filtered: i32,
}

/// Full per-tick chain: detector, heart rate, beeper and LED
///
/// Mirrors what the board does in its sampling interrupt. Buffers of any
/// size can be fed; the per-tick results of the latest buffer are kept for
/// plotting and WAV export.
pub struct EcgProcessor {
    detector: QrsDetector,
    bpm: BpmCalculator,
    beeper: PulseIndicator,
    led: PulseIndicator,
    beeper_level: bool,
    led_level: bool,
    outputs: Vec<DetectorOutput>,
}

impl EcgProcessor {
    pub fn new(config: &EcgConfig) -> Self {
        Self {
            detector: QrsDetector::new(config),
            bpm: BpmCalculator::new(config.sampling.sample_rate.period_ms()),
            beeper: PulseIndicator::beeper(&config.indicator),
            led: PulseIndicator::led(&config.indicator),
            beeper_level: false,
            led_level: false,
            outputs: Vec::new(),
        }
    }

    /// Run one tick; returns the beat if this tick is a rising edge.
    pub fn process_sample(&mut self, raw: u16) -> (DetectorOutput, Option<BeatEvent>) {
        let output = self.detector.process_sample(raw);
        self.beeper_level = self.beeper.step(output.beat);
        self.led_level = self.led.step(output.beat);

        let event = output.rising_edge.then(|| BeatEvent {
            tick: output.tick,
            bpm: self.bpm.update(&output),
            filtered: output.filtered,
        });
        (output, event)
    }

    pub fn process_buffer(&mut self, samples: &[u16]) -> Vec<BeatEvent> {
        self.outputs.clear();
        let mut events = Vec::new();
        for &raw in samples {
            let (output, event) = self.process_sample(raw);
            self.outputs.push(output);
            events.extend(event);
        }
        events
    }

    /// Per-tick detector results from the latest `process_buffer` call.
    pub fn outputs(&self) -> &[DetectorOutput] {
        &self.outputs
    }

    pub fn filtered_buffer(&self) -> Vec<i32> {
        self.outputs.iter().map(|o| o.filtered).collect()
    }

    pub fn bpm(&self) -> Option<f32> {
        self.bpm.bpm()
    }

    pub fn rr_interval_ms(&self) -> Option<f32> {
        self.bpm.rr_interval_ms()
    }

    pub fn beeper_level(&self) -> bool {
        self.beeper_level
    }

    pub fn led_level(&self) -> bool {
        self.led_level
    }

    pub fn detector(&self) -> &QrsDetector {
        &self.detector
    }
}
