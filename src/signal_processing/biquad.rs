/// Coefficients of one second-order IIR section.
///
/// The recurrence is `y = b0*x + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]`;
/// `a0` is carried for completeness but is assumed to be 1 and never used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

/// 20 Hz low-pass at 500 Hz, as two cascaded sections.
pub const LOWPASS_20HZ: [BiquadCoeffs; 2] = [
    BiquadCoeffs {
        b0: 8.59278969e-05,
        b1: 1.71855794e-04,
        b2: 8.59278969e-05,
        a0: 1.0,
        a1: -1.77422345e+00,
        a2: 7.96197268e-01,
    },
    BiquadCoeffs {
        b0: 1.0,
        b1: 2.0,
        b2: 1.0,
        a0: 1.0,
        a1: -1.84565849e+00,
        a2: 9.11174670e-01,
    },
];

/// Delay line of one section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    pub x_nm1: f32,
    pub x_nm2: f32,
    pub y_nm1: f32,
    pub y_nm2: f32,
}

/// One biquad section working on integer ADC-scaled samples
///
/// The sample is normalized by `2^n_bits` before filtering and the output is
/// scaled back and truncated toward zero. The output is signed and is not
/// limited to the input's bit width.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    state: BiquadState,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            state: BiquadState::default(),
        }
    }

    /// Filter one sample.
    ///
    /// The accumulation runs strictly left to right in single precision;
    /// reordering it changes the rounding seen over a long stream.
    pub fn apply(&mut self, sample: i32, n_bits: u32) -> i32 {
        let scale = (1u32 << n_bits) as f32;
        let c = &self.coeffs;
        let s = &mut self.state;

        let xn = sample as f32 / scale;
        let yn = c.b0 * xn + c.b1 * s.x_nm1 + c.b2 * s.x_nm2 - c.a1 * s.y_nm1 - c.a2 * s.y_nm2;

        s.x_nm2 = s.x_nm1;
        s.x_nm1 = xn;
        s.y_nm2 = s.y_nm1;
        s.y_nm1 = yn;

        (yn * scale) as i32
    }

    pub fn state(&self) -> &BiquadState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state = BiquadState::default();
    }
}

/// Cascade of biquad sections sharing one bit-width contract.
///
/// Each section's integer output is the next section's input sample.
#[derive(Debug, Clone)]
pub struct BiquadCascade {
    sections: Vec<Biquad>,
    n_bits: u32,
}

impl BiquadCascade {
    pub fn new(coeffs: &[BiquadCoeffs], n_bits: u32) -> Self {
        Self {
            sections: coeffs.iter().copied().map(Biquad::new).collect(),
            n_bits,
        }
    }

    /// The fixed 20 Hz low-pass used by the detector front-end.
    pub fn lowpass_20hz(n_bits: u32) -> Self {
        Self::new(&LOWPASS_20HZ, n_bits)
    }

    pub fn process(&mut self, sample: i32) -> i32 {
        let n_bits = self.n_bits;
        self.sections
            .iter_mut()
            .fold(sample, |x, section| section.apply(x, n_bits))
    }

    pub fn process_buffer(&mut self, samples: &[u16]) -> Vec<i32> {
        samples
            .iter()
            .map(|&s| self.process(i32::from(s)))
            .collect()
    }

    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}
