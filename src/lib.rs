// Stutter Detector Core - speech disfluency analysis
// Feature extraction, rule-based classification and remedy lookup

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod report;

// Re-exports for convenience
pub use analysis::{
    analyze, classify, remedies, remedies_for_label, Analysis, Category, ClassificationResult,
    FeatureExtractor, FeatureVector, FEATURE_COUNT,
};
pub use analysis::features::extract;
pub use audio::Waveform;
pub use error::{AnalysisError, AudioProcessingError, FeatureShapeError};
pub use report::AnalysisReport;
