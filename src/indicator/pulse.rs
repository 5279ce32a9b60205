use crate::config::IndicatorConfig;

/// Fixed-length output pulse triggered by a beat rising edge
///
/// Two shapes are used:
/// - LED: output held high for `duration_ticks`;
/// - beeper: a square wave that flips every `toggle_ticks` for
///   `duration_ticks`, starting low.
///
/// A new rising edge during a pulse restarts it. The output is forced low
/// when the pulse ends.
#[derive(Debug, Clone)]
pub struct PulseIndicator {
    duration_ticks: u32,
    toggle_ticks: Option<u32>,
    counter: u32,
    level: bool,
    previous_beat: bool,
}

impl PulseIndicator {
    pub fn led(config: &IndicatorConfig) -> Self {
        Self::new(config.led_ticks, None)
    }

    pub fn beeper(config: &IndicatorConfig) -> Self {
        Self::new(config.beep_ticks, Some(config.beep_toggle_ticks.max(1)))
    }

    fn new(duration_ticks: u32, toggle_ticks: Option<u32>) -> Self {
        Self {
            duration_ticks,
            toggle_ticks,
            counter: 0,
            level: false,
            previous_beat: false,
        }
    }

    /// Advance one tick with the current beat decision; returns the output level.
    pub fn step(&mut self, beat: bool) -> bool {
        if beat && !self.previous_beat {
            self.counter = 1;
            self.level = self.toggle_ticks.is_none();
        }
        self.previous_beat = beat;

        if self.counter == 0 {
            return false;
        }

        if let Some(toggle) = self.toggle_ticks {
            if self.counter % toggle == 0 {
                self.level = !self.level;
            }
        }

        let out = self.level;
        if self.counter >= self.duration_ticks {
            self.counter = 0;
            self.level = false;
        } else {
            self.counter += 1;
        }
        out
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }
}
