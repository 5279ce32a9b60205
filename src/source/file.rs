use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use hound::WavReader;

use super::{SampleSource, VecSource};
use crate::config::SampleRate;
use crate::error::{EcgError, Result};

/// Parse a text capture: unsigned integers separated by commas and/or
/// whitespace, trailing commas allowed, one or many per line.
///
/// Every value must fit `adc_bits`.
pub fn parse_samples<R: BufRead>(reader: R, adc_bits: u32) -> Result<Vec<u16>> {
    let limit = 1i64 << adc_bits;
    let mut samples = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty());

        for token in tokens {
            let value: i64 = token.parse().map_err(|_| EcgError::Parse {
                line: line_idx + 1,
                token: token.to_string(),
            })?;
            if !(0..limit).contains(&value) {
                return Err(EcgError::SampleOutOfRange {
                    value,
                    bits: adc_bits,
                });
            }
            samples.push(value as u16);
        }
    }

    Ok(samples)
}

/// Write samples in the text capture format, `per_line` values per line,
/// each followed by a comma.
pub fn write_samples<W: Write>(mut writer: W, samples: &[u16], per_line: usize) -> Result<()> {
    for line in samples.chunks(per_line.max(1)) {
        for sample in line {
            write!(writer, "{},", sample)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Capture file in the board's text format.
pub struct TextFileSource {
    inner: VecSource,
}

impl TextFileSource {
    pub fn new<P: AsRef<Path>>(
        path: P,
        sample_rate: SampleRate,
        adc_bits: u32,
        chunk_size: usize,
    ) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let samples = parse_samples(BufReader::new(file), adc_bits)?;
        log::info!(
            "Loaded {} samples from {}",
            samples.len(),
            path.as_ref().display()
        );
        Ok(Self {
            inner: VecSource::new(samples, sample_rate, chunk_size),
        })
    }

    /// Rewind to the start when the data runs out, like the board's canned
    /// playback.
    pub fn looping(mut self, looping: bool) -> Self {
        self.inner = self.inner.looping(looping);
        self
    }

    pub fn samples(&self) -> &[u16] {
        self.inner.samples()
    }
}

impl SampleSource for TextFileSource {
    fn next_buffer(&mut self) -> Result<Option<Vec<u16>>> {
        self.inner.next_buffer()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }
}

/// Mono WAV capture rescaled to the ADC bit width
///
/// Integer PCM is treated as signed and offset to unsigned, then shifted to
/// `adc_bits`. Float PCM in [-1, 1] maps linearly onto `[0, 2^adc_bits)`.
/// Only the first channel of multi-channel files is used.
pub struct WavFileSource {
    inner: VecSource,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, adc_bits: u32, chunk_size: usize) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        if spec.channels != 1 {
            log::warn!(
                "{}: {} channels, using the first",
                path.as_ref().display(),
                spec.channels
            );
        }

        let sample_rate = SampleRate::from_hz(spec.sample_rate as f32);
        let samples = Self::read_samples(reader, &spec, adc_bits)?;
        log::info!(
            "Loaded {} samples at {} from {}",
            samples.len(),
            sample_rate,
            path.as_ref().display()
        );

        Ok(Self {
            inner: VecSource::new(samples, sample_rate, chunk_size),
        })
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
        adc_bits: u32,
    ) -> Result<Vec<u16>> {
        let channels = spec.channels.max(1) as usize;
        let max = (1i64 << adc_bits) - 1;

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .step_by(channels)
                .map(|s| {
                    s.map(|v| {
                        let scaled = ((v + 1.0) * 0.5 * (max + 1) as f32) as i64;
                        scaled.clamp(0, max) as u16
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let bits = u32::from(spec.bits_per_sample);
                let offset = 1i64 << (bits - 1);
                reader
                    .samples::<i32>()
                    .step_by(channels)
                    .map(|s| {
                        s.map(|v| {
                            let unsigned = i64::from(v) + offset;
                            let scaled = if bits >= adc_bits {
                                unsigned >> (bits - adc_bits)
                            } else {
                                unsigned << (adc_bits - bits)
                            };
                            scaled.clamp(0, max) as u16
                        })
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }

    pub fn samples(&self) -> &[u16] {
        self.inner.samples()
    }
}

impl SampleSource for WavFileSource {
    fn next_buffer(&mut self) -> Result<Option<Vec<u16>>> {
        self.inner.next_buffer()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_board_format() {
        let text = "1300,1310,1322,\n1340,1351,\n\n 1360 1370\t1380,";
        let samples = parse_samples(Cursor::new(text), 12).unwrap();
        assert_eq!(samples, vec![1300, 1310, 1322, 1340, 1351, 1360, 1370, 1380]);
    }

    #[test]
    fn test_write_then_parse() {
        let samples: Vec<u16> = (0..25).map(|i| i * 160).collect();
        let mut text = Vec::new();
        write_samples(&mut text, &samples, 10).unwrap();

        assert_eq!(text.iter().filter(|&&b| b == b'\n').count(), 3);
        assert_eq!(parse_samples(Cursor::new(text), 12).unwrap(), samples);
    }

    #[test]
    fn test_parse_reports_line_of_bad_token() {
        let text = "1,2,3,\n4,x5,6,\n";
        match parse_samples(Cursor::new(text), 12) {
            Err(EcgError::Parse { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "x5");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            parse_samples(Cursor::new("4095,4096,"), 12),
            Err(EcgError::SampleOutOfRange { value: 4096, bits: 12 })
        ));
        assert!(matches!(
            parse_samples(Cursor::new("-1,"), 12),
            Err(EcgError::SampleOutOfRange { value: -1, .. })
        ));
    }

    #[test]
    fn test_wav_round_trip_through_save_wav() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("qrsbeat_wav_source_{}.wav", std::process::id()));
        let samples: Vec<u16> = vec![0, 1, 2048, 4000, 4095];

        crate::wav::save_samples_wav(&path, &samples, 500).unwrap();
        let source = WavFileSource::new(&path, 12, 64).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(source.samples(), samples.as_slice());
        assert!((source.sample_rate().as_hz() - 500.0).abs() < 1e-3);
    }
}
