mod test_signals;

use approx::assert_relative_eq;
use qrsbeat::config::EcgConfig;
use qrsbeat::processing::EcgProcessor;
use qrsbeat::simulation::measure_heart_rate;
use test_signals::{noisy_ecg, synthetic_ecg};

const SAMPLE_RATE: f32 = 500.0;

fn expected_interval(bpm: f32) -> f32 {
    SAMPLE_RATE * 60.0 / bpm
}

#[test]
fn test_clean_ecg_across_rates_and_amplitudes() {
    let config = EcgConfig::default();

    for (bpm, min_beats) in [(60.0, 8), (72.0, 10), (90.0, 13), (120.0, 18)] {
        for amplitude in [400.0, 800.0, 1500.0] {
            let signal = synthetic_ecg(bpm, amplitude, 10.0);
            let m = measure_heart_rate(&signal, &config);

            assert!(
                m.beats.len() >= min_beats,
                "{} bpm, amplitude {}: {} beats",
                bpm,
                amplitude,
                m.beats.len()
            );
            // The first interval absorbs the trackers settling.
            let settled = qrsbeat::simulation::HeartRateMeasurement {
                beats: Vec::new(),
                intervals: m.intervals[1..].to_vec(),
            };
            assert_eq!(
                settled.outliers(expected_interval(bpm), 0.1),
                0,
                "{} bpm, amplitude {}: intervals {:?}",
                bpm,
                amplitude,
                m.intervals
            );
        }
    }
}

#[test]
fn test_reported_bpm_tracks_rate() {
    let mut processor = EcgProcessor::new(&EcgConfig::default());
    let events = processor.process_buffer(&synthetic_ecg(60.0, 800.0, 12.0));

    assert_eq!(events[0].bpm, None);
    let rates: Vec<f32> = events.iter().skip(2).filter_map(|e| e.bpm).collect();
    assert!(!rates.is_empty());
    let mean = rates.iter().sum::<f32>() / rates.len() as f32;
    assert_relative_eq!(mean, 60.0, max_relative = 0.02);
    assert_relative_eq!(processor.rr_interval_ms().unwrap(), 1000.0, max_relative = 0.05);
}

#[test]
fn test_noisy_ecg_keeps_rate() {
    let config = EcgConfig::default();

    for (bpm, min_beats) in [(60.0, 7), (72.0, 8), (90.0, 10)] {
        for seed in 1..=3 {
            let signal = noisy_ecg(bpm, 10.0, 10.0, 50.0, seed);
            let m = measure_heart_rate(&signal, &config);
            let expected = expected_interval(bpm);

            assert!(
                m.beats.len() >= min_beats,
                "{} bpm seed {}: {} beats",
                bpm,
                seed,
                m.beats.len()
            );
            let median = m.median_interval().unwrap();
            assert_relative_eq!(median, expected, max_relative = 0.05);
            // Noise may cost a beat, but must never add one.
            assert!(
                m.intervals.iter().all(|&i| i as f32 >= 0.8 * expected),
                "{} bpm seed {}: intervals {:?}",
                bpm,
                seed,
                m.intervals
            );
        }
    }
}

#[test]
fn test_median_bpm_from_measurement() {
    let m = measure_heart_rate(&synthetic_ecg(90.0, 800.0, 10.0), &EcgConfig::default());
    assert_relative_eq!(m.median_bpm(SAMPLE_RATE).unwrap(), 90.0, max_relative = 0.03);
}
