use crate::constants::MS_PER_MINUTE;

use super::detector::DetectorOutput;

/// Heart rate from the spacing of consecutive beat rising edges
///
/// The interval between two rising edges is measured in ticks and converted
/// to milliseconds with the sample period; `bpm = 60000 / interval_ms`. The
/// first edge only starts the clock.
#[derive(Debug, Clone)]
pub struct BpmCalculator {
    period_ms: f32,
    last_beat_tick: Option<u64>,
    last_interval_ticks: Option<u64>,
    bpm: Option<f32>,
}

impl BpmCalculator {
    /// # Arguments
    /// * `period_ms` - Duration of one detector tick in milliseconds
    pub fn new(period_ms: f32) -> Self {
        Self {
            period_ms,
            last_beat_tick: None,
            last_interval_ticks: None,
            bpm: None,
        }
    }

    /// Register a rising edge at `tick`; returns the new rate once two edges
    /// have been seen.
    pub fn on_beat(&mut self, tick: u64) -> Option<f32> {
        let previous = self.last_beat_tick.replace(tick);
        let interval = tick.checked_sub(previous?).filter(|&i| i > 0)?;

        let interval_ms = interval as f32 * self.period_ms;
        let bpm = MS_PER_MINUTE / interval_ms;
        self.last_interval_ticks = Some(interval);
        self.bpm = Some(bpm);
        log::debug!("RR interval {:.0} ms, {:.1} bpm", interval_ms, bpm);
        Some(bpm)
    }

    /// Feed a detector output; only rising edges matter.
    pub fn update(&mut self, output: &DetectorOutput) -> Option<f32> {
        if output.rising_edge {
            self.on_beat(output.tick)
        } else {
            None
        }
    }

    /// Most recent heart rate.
    pub fn bpm(&self) -> Option<f32> {
        self.bpm
    }

    /// Most recent beat-to-beat interval in milliseconds.
    pub fn rr_interval_ms(&self) -> Option<f32> {
        self.last_interval_ticks
            .map(|ticks| ticks as f32 * self.period_ms)
    }
}
