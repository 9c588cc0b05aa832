use std::path::{Path, PathBuf};

use stutter_detector::analysis::{analyze, classify, Category, FEATURE_COUNT};
use stutter_detector::audio;
use stutter_detector::config::InputConfig;
use stutter_detector::error::{AnalysisError, AudioProcessingError, ErrorCode};
use stutter_detector::{extract, AnalysisReport};

fn write_wav(dir: &Path, name: &str, sample_rate: u32, samples: &[f32]) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &sample in samples {
        writer
            .write_sample((sample * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
    path
}

fn tone(sample_rate: u32, frequency: f32, seconds: f32, amplitude: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * seconds) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

#[test]
fn silent_recording_is_fluent() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_wav(dir.path(), "silence.wav", 16_000, &vec![0.0; 32_000]);

    let waveform = audio::load(&path, &InputConfig::default()).unwrap();
    let analysis = analyze(&waveform.samples, waveform.sample_rate).unwrap();

    assert_eq!(analysis.classification.category, Category::None);
    assert_eq!(analysis.classification.confidence, 80);
    assert!(!analysis.classification.has_disfluency);
}

#[test]
fn tone_produces_finite_feature_vector() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_wav(dir.path(), "tone.wav", 44_100, &tone(44_100, 440.0, 1.5, 0.6));

    let waveform = audio::load(&path, &InputConfig::default()).unwrap();
    let features = extract(&waveform.samples, waveform.sample_rate).unwrap();

    assert_eq!(features.as_slice().len(), FEATURE_COUNT);
    assert!(features.as_slice().iter().all(|v| v.is_finite()));
    assert!(features.tempo() > 0.0 && features.tempo() < 320.0);
    assert!(
        (features.centroid_mean() - 440.0).abs() < 200.0,
        "centroid {} should sit near the tone",
        features.centroid_mean()
    );

    // extracted vectors are always accepted by the classifier
    let result = classify(features.as_slice()).unwrap();
    assert!(result.confidence <= 100);
}

#[test]
fn report_carries_recording_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_wav(dir.path(), "speech.wav", 22_050, &tone(22_050, 180.0, 2.0, 0.3));

    let waveform = audio::load(&path, &InputConfig::default()).unwrap();
    let analysis = analyze(&waveform.samples, waveform.sample_rate).unwrap();
    let report = AnalysisReport::new("speech.wav", &waveform, &analysis);

    assert_eq!(report.sample_rate, 22_050);
    assert!((report.duration_secs - 2.0).abs() < 1e-9);
    assert_eq!(report.category, analysis.classification.category);
    assert_eq!(report.remedies, report.category.remedies());
    assert_eq!(report.features.len(), FEATURE_COUNT);
}

#[test]
fn low_sample_rate_cannot_resolve_contrast_bands() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_wav(dir.path(), "phone.wav", 8_000, &tone(8_000, 300.0, 1.0, 0.5));

    let waveform = audio::load(&path, &InputConfig::default()).unwrap();
    let err = analyze(&waveform.samples, waveform.sample_rate).unwrap_err();

    assert!(matches!(
        err,
        AnalysisError::Audio(AudioProcessingError::Transform { .. })
    ));
    assert_eq!(err.code(), 1007);
}

#[test]
fn empty_recording_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_wav(dir.path(), "empty.wav", 16_000, &[]);

    let waveform = audio::load(&path, &InputConfig::default()).unwrap();
    assert!(waveform.is_empty());

    let err = analyze(&waveform.samples, waveform.sample_rate).unwrap_err();
    assert_eq!(err, AnalysisError::Audio(AudioProcessingError::EmptySignal));
}

#[test]
fn analysis_is_deterministic() {
    let samples = tone(16_000, 250.0, 1.0, 0.4);
    let first = analyze(&samples, 16_000).unwrap();
    let second = analyze(&samples, 16_000).unwrap();
    assert_eq!(first, second);
}
