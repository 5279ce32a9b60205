use crate::config::ThresholdConfig;

/// Decaying min/max envelope producing a moving decision threshold
///
/// Each real peak widens the envelope to include it, then both edges move
/// toward each other by `decay`. The threshold is the envelope midpoint. The
/// envelope may invert (max below min) after enough decay; that is part of
/// the tracker's behavior and is kept as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveThreshold {
    threshold: i32,
    running_max: i32,
    running_min: i32,
    decay: i32,
    floor: i32,
    ceiling: i32,
}

impl AdaptiveThreshold {
    /// Create a tracker clamped to `[0, ceiling]`.
    ///
    /// `ceiling` is the largest representable sample (0xFFF for 12-bit data).
    pub fn new(config: &ThresholdConfig, ceiling: i32) -> Self {
        Self {
            threshold: config.initial_threshold,
            running_max: config.initial_max,
            running_min: config.initial_min,
            decay: config.decay,
            floor: 0,
            ceiling,
        }
    }

    /// Fold one peak report into the envelope and return the threshold
    ///
    /// Reports `<= 0` mean "no peak this tick" and leave everything unchanged.
    pub fn update(&mut self, sample: i32) -> i32 {
        if sample <= 0 {
            return self.threshold;
        }

        self.running_max = self.running_max.max(sample);
        self.running_min = self.running_min.min(sample);

        self.running_max = (self.running_max - self.decay).max(self.floor);
        self.running_min = (self.running_min + self.decay).min(self.ceiling);

        self.threshold = (self.running_min + self.running_max) / 2;
        self.threshold
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn running_max(&self) -> i32 {
        self.running_max
    }

    pub fn running_min(&self) -> i32 {
        self.running_min
    }

    /// True when decay has pushed the max below the min.
    pub fn is_inverted(&self) -> bool {
        self.running_max < self.running_min
    }
}
