//! Where raw ADC samples come from: capture files, in-memory buffers, and a
//! paced driver that replays any of them at the sampling period.

pub mod file;
pub mod paced;

use crate::config::SampleRate;
use crate::error::Result;

pub use file::{TextFileSource, WavFileSource, parse_samples, write_samples};
pub use paced::PacedSource;

pub trait SampleSource: Send {
    /// Next chunk of raw samples, or `None` once the source is exhausted.
    fn next_buffer(&mut self) -> Result<Option<Vec<u16>>>;
    fn sample_rate(&self) -> SampleRate;
}

/// Samples already in memory, handed out `chunk_size` at a time.
pub struct VecSource {
    samples: Vec<u16>,
    position: usize,
    chunk_size: usize,
    sample_rate: SampleRate,
    looping: bool,
}

impl VecSource {
    pub fn new(samples: Vec<u16>, sample_rate: SampleRate, chunk_size: usize) -> Self {
        Self {
            samples,
            position: 0,
            chunk_size: chunk_size.max(1),
            sample_rate,
            looping: false,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }
}

impl SampleSource for VecSource {
    fn next_buffer(&mut self) -> Result<Option<Vec<u16>>> {
        if self.samples.is_empty() {
            return Ok(None);
        }
        if self.position >= self.samples.len() {
            if !self.looping {
                return Ok(None);
            }
            log::debug!("Rewinding {} samples", self.samples.len());
            self.position = 0;
        }

        let end = (self.position + self.chunk_size).min(self.samples.len());
        let chunk = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(Some(chunk))
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}
