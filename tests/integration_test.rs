mod test_signals;

use qrsbeat::config::EcgConfig;
use qrsbeat::processing::EcgProcessor;
use qrsbeat::qrs::QrsDetector;
use test_signals::{noisy_ecg, pulse_train, rising_edges};

#[test]
fn test_one_beat_per_pulse() {
    let mut detector = QrsDetector::new(&EcgConfig::default());
    let signal = pulse_train(2000, 200, 500, 20);

    let outputs = detector.process_buffer(&signal);
    let edges = rising_edges(&outputs);

    // The first pulse falls inside the startup window.
    assert_eq!(edges.len(), 3, "edges: {:?}", edges);
    for (edge, pulse) in edges.iter().zip([700u64, 1200, 1700]) {
        assert!(
            *edge >= pulse && *edge < pulse + 500,
            "edge {} outside the period of pulse {}",
            edge,
            pulse
        );
    }
    assert!(edges.windows(2).all(|w| w[1] - w[0] == 500));
    assert_eq!(edges, vec![731, 1231, 1731]);
}

#[test]
fn test_single_sample_spikes_are_filtered_out() {
    let mut detector = QrsDetector::new(&EcgConfig::default());
    let signal = pulse_train(2000, 0, 500, 1);

    let outputs = detector.process_buffer(&signal);

    assert!(rising_edges(&outputs).is_empty());
}

#[test]
fn test_flat_input_never_beats() {
    let config = EcgConfig::default();
    let mut detector = QrsDetector::new(&config);

    let outputs = detector.process_buffer(&vec![2048u16; 3000]);

    assert!(outputs.iter().all(|o| !o.beat));
    // The only slope energy is the settling transient inside the startup
    // window, so the right tracker never updates.
    assert_eq!(detector.right_threshold().threshold(), config.right_threshold.initial_threshold);
}

#[test]
fn test_no_beat_during_startup() {
    let config = EcgConfig::default();
    let mut detector = QrsDetector::new(&config);
    let signal = pulse_train(1000, 0, 100, 20);

    let outputs = detector.process_buffer(&signal);

    let startup = config.detector.startup_ignore_ticks as usize;
    assert!(outputs[..startup - 1].iter().all(|o| !o.beat));
}

#[test]
fn test_refractory_spaces_beats() {
    let mut config = EcgConfig::default();
    config.detector.refractory_ticks = 200;
    let mut detector = QrsDetector::new(&config);

    // A pulse every 120 ticks is faster than the refractory period allows.
    let outputs = detector.process_buffer(&pulse_train(4000, 10, 120, 20));
    let edges = rising_edges(&outputs);

    assert!(edges.len() >= 10);
    assert!(edges.windows(2).all(|w| w[1] - w[0] == 240), "edges: {:?}", edges);
}

#[test]
fn test_replay_is_deterministic() {
    let signal = noisy_ecg(72.0, 10.0, 10.0, 50.0, 11);

    let mut first = QrsDetector::new(&EcgConfig::default());
    let mut second = QrsDetector::new(&EcgConfig::default());

    assert_eq!(first.process_buffer(&signal), second.process_buffer(&signal));
    assert_eq!(first.state(), second.state());
}

#[test]
fn test_buffer_size_does_not_matter() {
    let signal = noisy_ecg(90.0, 8.0, 10.0, 50.0, 5);

    let mut whole = EcgProcessor::new(&EcgConfig::default());
    let expected = whole.process_buffer(&signal);
    assert!(!expected.is_empty());

    for chunk_size in [1, 7, 64, 500] {
        let mut processor = EcgProcessor::new(&EcgConfig::default());
        let mut events = Vec::new();
        for chunk in signal.chunks(chunk_size) {
            events.extend(processor.process_buffer(chunk));
        }
        assert_eq!(events, expected, "chunk size {}", chunk_size);
    }
}
