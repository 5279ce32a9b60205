use crate::config::EcgConfig;
use crate::processing::EcgProcessor;

/// What the detector made of a signal.
#[derive(Debug, Clone, Default)]
pub struct HeartRateMeasurement {
    /// Rising-edge ticks
    pub beats: Vec<u64>,
    /// Beat-to-beat intervals in ticks
    pub intervals: Vec<u64>,
}

impl HeartRateMeasurement {
    pub fn median_interval(&self) -> Option<f32> {
        let mut sorted = self.intervals.clone();
        sorted.sort_unstable();
        let n = sorted.len();
        match n {
            0 => None,
            _ if n % 2 == 1 => Some(sorted[n / 2] as f32),
            _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) as f32 / 2.0),
        }
    }

    /// Heart rate from the median interval.
    pub fn median_bpm(&self, sample_rate: f32) -> Option<f32> {
        self.median_interval()
            .map(|ticks| 60.0 * sample_rate / ticks)
    }

    /// Intervals differing from `expected_ticks` by more than `tolerance`
    /// (a fraction).
    pub fn outliers(&self, expected_ticks: f32, tolerance: f32) -> usize {
        self.intervals
            .iter()
            .filter(|&&i| (i as f32 - expected_ticks).abs() > tolerance * expected_ticks)
            .count()
    }
}

/// Run a fresh detector over `samples` and collect its beats.
pub fn measure_heart_rate(samples: &[u16], config: &EcgConfig) -> HeartRateMeasurement {
    let mut processor = EcgProcessor::new(config);
    let beats: Vec<u64> = processor
        .process_buffer(samples)
        .iter()
        .map(|e| e.tick)
        .collect();
    let intervals = beats.windows(2).map(|w| w[1] - w[0]).collect();

    HeartRateMeasurement { beats, intervals }
}
