use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::constants::ADC_BITS;

const HALF_SCALE: f32 = (1u32 << (ADC_BITS - 1)) as f32;

/// Map a 12-bit level onto [-1, 1).
fn normalize(value: i32) -> f32 {
    value as f32 / HALF_SCALE - 1.0
}

/// Save raw samples as 16-bit mono PCM; reads back losslessly through
/// `WavFileSource`.
pub fn save_samples_wav<P: AsRef<Path>>(
    path: P,
    samples: &[u16],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let shift = 16 - ADC_BITS;
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        let centered = i32::from(sample) - (1 << (ADC_BITS - 1));
        writer.write_sample((centered << shift) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Save raw (left) and filtered (right) series as 32-bit float stereo.
pub fn save_wav<P: AsRef<Path>>(
    path: P,
    raw: &[u16],
    filtered: &[i32],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for (&r, &f) in raw.iter().zip(filtered) {
        writer.write_sample(normalize(i32::from(r)))?;
        writer.write_sample(normalize(f))?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_layout() {
        let path = std::env::temp_dir().join(format!("qrsbeat_stereo_{}.wav", std::process::id()));
        save_wav(&path, &[0, 2048, 4095], &[2048, 0, 6144], 500).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0], -1.0);
        assert_eq!(samples[1], 0.0);
        assert_eq!(samples[3], -1.0);
        assert_eq!(samples[5], 2.0);
    }
}
