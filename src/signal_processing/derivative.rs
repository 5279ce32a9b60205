/// Five-point derivative estimator
///
/// Keeps the last five inputs and returns `(-x[n-2] - 2x[n-1] + 2x[n+1] + x[n+2]) / 8`,
/// where the division is an arithmetic right shift by 3. The "future" slots
/// just hold the newest inputs, so the estimate lags the input by two ticks
/// (three counting the shift-after-compute).
///
/// Negative sums round toward negative infinity: `-1 >> 3 == -1`, not 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FivePointDerivative {
    xp2: i32,
    xp1: i32,
    x0: i32,
    xm1: i32,
    xm2: i32,
}

impl FivePointDerivative {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the derivative from the stored history, then push `sample`.
    pub fn step(&mut self, sample: i32) -> i32 {
        let sum = -self.xm2 - 2 * self.xm1 + 2 * self.xp1 + self.xp2;
        let derivative = sum >> 3;

        self.xm2 = self.xm1;
        self.xm1 = self.x0;
        self.x0 = self.xp1;
        self.xp1 = self.xp2;
        self.xp2 = sample;

        derivative
    }

    /// History in temporal order, newest first: `[xp2, xp1, x0, xm1, xm2]`.
    pub fn history(&self) -> [i32; 5] {
        [self.xp2, self.xp1, self.x0, self.xm1, self.xm2]
    }
}
