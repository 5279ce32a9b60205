/// Rectangular running average over a fixed integer window
///
/// Keeps a circular buffer and a running sum that is updated incrementally,
/// so each push costs O(1). The window starts zero-filled and is averaged over
/// its full length from the first push; there is no warm-up gating, so the
/// first `window_size` outputs under-read.
///
/// Used on the squared derivative of the filtered ECG (200 ms at 500 Hz).
#[derive(Debug, Clone)]
pub struct RunningAverage {
    buffer: Vec<i32>,
    index: usize,
    sum: i64,
}

impl RunningAverage {
    /// Create a new running average
    ///
    /// # Arguments
    /// * `window_size` - Number of samples averaged; must be non-zero
    ///   (checked by [`crate::config::EcgConfig::validate`])
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: vec![0; window_size.max(1)],
            index: 0,
            sum: 0,
        }
    }

    /// Replace the oldest sample with `value` and return the window average
    ///
    /// The average is `sum / window_size` with truncating integer division.
    pub fn push(&mut self, value: i32) -> i32 {
        self.sum -= i64::from(self.buffer[self.index]);
        self.buffer[self.index] = value;
        self.sum += i64::from(value);
        self.index = (self.index + 1) % self.buffer.len();

        self.average()
    }

    /// Current average without adding a sample.
    pub fn average(&self) -> i32 {
        (self.sum / self.buffer.len() as i64) as i32
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    pub fn window_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.index = 0;
        self.sum = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average_small_window() {
        let mut ra = RunningAverage::new(3);

        // Zero-filled slots count toward the average from the start.
        assert_eq!(ra.push(3), 1);
        assert_eq!(ra.push(6), 3);
        assert_eq!(ra.push(9), 6);
        assert_eq!(ra.push(12), 9); // (6+9+12)/3
        assert_eq!(ra.push(15), 12); // (9+12+15)/3
    }

    #[test]
    fn test_full_window_is_exact_mean() {
        let mut ra = RunningAverage::new(100);
        let values: Vec<i32> = (0..100).map(|i| i * 7 + (i % 3)).collect();
        let mut out = 0;
        for &v in &values {
            out = ra.push(v);
        }
        let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
        assert_eq!(ra.sum(), sum);
        assert_eq!(out, (sum / 100) as i32);
    }

    #[test]
    fn test_truncates_once_at_final_division() {
        let mut ra = RunningAverage::new(100);
        // 99 ones and a single 50: per-sample truncation would lose everything.
        for _ in 0..99 {
            ra.push(1);
        }
        assert_eq!(ra.push(50), 1); // 149 / 100
    }

    #[test]
    fn test_sum_tracks_buffer_after_wraparound() {
        let mut ra = RunningAverage::new(4);
        for v in 1..=10 {
            ra.push(v);
        }
        assert_eq!(ra.sum(), 7 + 8 + 9 + 10);
        assert_eq!(ra.average(), 8);
    }

    #[test]
    fn test_negative_average_truncates_toward_zero() {
        let mut ra = RunningAverage::new(4);
        assert_eq!(ra.push(-3), 0); // -3/4 truncates to 0
        assert_eq!(ra.push(-3), -1); // -6/4
    }

    #[test]
    fn test_reset() {
        let mut ra = RunningAverage::new(10);
        assert_eq!(ra.window_size(), 10);
        for _ in 0..25 {
            ra.push(1000);
        }
        ra.reset();
        assert_eq!(ra.sum(), 0);
        assert_eq!(ra.push(10), 1);
    }
}
