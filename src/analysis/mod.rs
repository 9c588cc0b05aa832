// Analysis module - recording-level disfluency analysis
//
// Pipeline: FeatureExtractor → classify → remedies
//
// Each stage is pure. The extractor summarizes a whole recording into a
// fixed feature vector, the classifier maps that vector to one category
// with a confidence, and the remedy table attaches suggestions for the
// category.

use serde::Serialize;

pub mod classifier;
pub mod features;
pub mod remedies;

pub use classifier::{classify, classify_vector, Category, ClassificationResult, UnknownCategory};
pub use features::{FeatureExtractor, FeatureVector, FEATURE_COUNT};
pub use remedies::{remedies, remedies_for_label, RemedyList};

use crate::config::FeatureConfig;
use crate::error::{
    log_audio_processing_error, log_feature_shape_error, AnalysisError, FeatureShapeError,
};

/// Features, classification and remedies for one recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub features: FeatureVector,
    pub classification: ClassificationResult,
    pub remedies: RemedyList,
}

impl Analysis {
    /// Classify an already extracted feature vector and attach remedies
    pub fn from_features(features: FeatureVector) -> Result<Self, FeatureShapeError> {
        let classification = classify_vector(&features)?;
        Ok(Self {
            features,
            remedies: remedies(classification.category),
            classification,
        })
    }
}

/// Run the full pipeline with default feature parameters
pub fn analyze(samples: &[f32], sample_rate: u32) -> Result<Analysis, AnalysisError> {
    analyze_with_config(samples, sample_rate, &FeatureConfig::default())
}

/// Run the full pipeline with explicit feature parameters
pub fn analyze_with_config(
    samples: &[f32],
    sample_rate: u32,
    config: &FeatureConfig,
) -> Result<Analysis, AnalysisError> {
    let extractor = FeatureExtractor::with_config(sample_rate, config)?;
    analyze_with(&extractor, samples)
}

/// Run the pipeline with a prepared extractor
///
/// Reusing an extractor skips rebuilding filterbanks and FFT plans when
/// many recordings share a sample rate.
pub fn analyze_with(extractor: &FeatureExtractor, samples: &[f32]) -> Result<Analysis, AnalysisError> {
    let features = extractor
        .extract(samples)
        .inspect_err(|err| log_audio_processing_error(err, "analyze"))?;
    let analysis = Analysis::from_features(features)
        .inspect_err(|err| log_feature_shape_error(err, "analyze"))?;

    tracing::info!(
        category = %analysis.classification.category,
        confidence = analysis.classification.confidence,
        samples = samples.len(),
        sample_rate = extractor.sample_rate(),
        "analysis complete"
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioProcessingError;

    #[test]
    fn test_silence_is_fluent() {
        let analysis = analyze(&vec![0.0; 16_000], 16_000).unwrap();

        assert_eq!(analysis.classification.category, Category::None);
        assert_eq!(analysis.classification.confidence, 80);
        assert_eq!(analysis.remedies, remedies(Category::None));
        assert_eq!(analysis.features.as_slice().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_remedies_follow_category() {
        let tone: Vec<f32> = (0..32_000)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16_000.0).sin() * 0.5)
            .collect();
        let analysis = analyze(&tone, 16_000).unwrap();

        assert_eq!(analysis.remedies, analysis.classification.category.remedies());
        assert_eq!(
            analysis.classification.description,
            analysis.classification.category.description()
        );
    }

    #[test]
    fn test_extractor_errors_propagate() {
        let err = analyze(&[], 16_000).unwrap_err();
        assert_eq!(err, AnalysisError::Audio(AudioProcessingError::EmptySignal));

        let err = analyze(&[0.0; 4096], 0).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Audio(AudioProcessingError::InvalidSampleRate { sample_rate: 0 })
        ));
    }

    #[test]
    fn test_from_features_rejects_non_finite() {
        let mut values = vec![0.0; FEATURE_COUNT];
        values[3] = f64::NAN;
        let features = FeatureVector::from_slice(&values).unwrap();

        assert_eq!(
            Analysis::from_features(features).unwrap_err(),
            FeatureShapeError::NonFinite { index: 3 }
        );
    }

    #[test]
    fn test_analysis_serializes_features_as_array() {
        let analysis = analyze(&vec![0.0; 8_000], 16_000).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();

        assert_eq!(json["features"].as_array().unwrap().len(), FEATURE_COUNT);
        assert_eq!(json["classification"]["category"], "none");
        assert!(json["remedies"].as_array().unwrap().len() >= 1);
    }
}
