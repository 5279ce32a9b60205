use super::derivative::FivePointDerivative;

/// Local-maximum detector driven by the five-point derivative
///
/// A peak is declared when the previous derivative was non-negative and the
/// current one is negative, i.e. on the falling edge of the slope. The
/// derivative lags the input, so the reported value is the current sample,
/// taken a few ticks after the true maximum.
///
/// A return value of 0 means "no peak". A genuine zero-valued peak is
/// indistinguishable from that and is swallowed by the threshold trackers,
/// which treat any value `<= 0` as no event.
#[derive(Debug, Clone, Default)]
pub struct PeakDetector {
    derivative: FivePointDerivative,
    prev_derivative: i32,
}

impl PeakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample; returns the sample on a peak and 0 otherwise.
    pub fn step(&mut self, sample: i32) -> i32 {
        let derivative = self.derivative.step(sample);

        let peak = self.prev_derivative >= 0 && derivative < 0;
        self.prev_derivative = derivative;

        if peak { sample } else { 0 }
    }

    /// Find all peaks in a buffer
    ///
    /// Returns `(sample_index, value)` pairs for every tick that reported a
    /// non-zero peak.
    pub fn find_all_peaks(&mut self, buffer: &[i32]) -> Vec<(usize, i32)> {
        buffer
            .iter()
            .enumerate()
            .filter_map(|(i, &sample)| match self.step(sample) {
                0 => None,
                value => Some((i, value)),
            })
            .collect()
    }

    pub fn prev_derivative(&self) -> i32 {
        self.prev_derivative
    }
}
