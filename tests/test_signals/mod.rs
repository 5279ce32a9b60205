#![allow(dead_code, unused_imports)]

pub mod generate;

pub use generate::{noisy_ecg, pulse_train, rising_edges, synthetic_ecg};
