//! Fixed parameters of the acquisition front-end.
//!
//! The detector works in ticks, one per ADC sample. These values describe the
//! nominal hardware the tick counts in [`crate::config`] were tuned for.

/// ADC resolution in bits.
pub const ADC_BITS: u32 = 12;

/// Largest value a 12-bit ADC can report (0xFFF).
pub const ADC_MAX: i32 = (1 << ADC_BITS) - 1;

/// Nominal sampling rate in Hz (one tick every 2 ms).
pub const NOMINAL_SAMPLE_RATE_HZ: f32 = 500.0;

/// Milliseconds per minute, used to turn beat intervals into beats per minute.
pub const MS_PER_MINUTE: f32 = 60_000.0;
