// Error types for the stutter detector
//
// This module defines the error taxonomy for audio processing and
// classification, with numeric error codes so callers (CLI, a web layer)
// can report failures without matching on variants.

mod audio;
mod features;

pub use audio::{log_audio_processing_error, AudioProcessingError, AudioProcessingErrorCodes};
pub use features::{log_feature_shape_error, FeatureShapeError, FeatureShapeErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting across the
/// library/CLI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Failure of a full analysis request (extract + classify)
///
/// Both stages are terminal for a request; there is no partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Audio(#[from] AudioProcessingError),

    #[error(transparent)]
    Shape(#[from] FeatureShapeError),
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::Audio(err) => err.code(),
            AnalysisError::Shape(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::Audio(err) => err.message(),
            AnalysisError::Shape(err) => err.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_delegates_codes() {
        let audio: AnalysisError = AudioProcessingError::EmptySignal.into();
        assert_eq!(audio.code(), AudioProcessingErrorCodes::EMPTY_SIGNAL);

        let shape: AnalysisError = FeatureShapeError::LengthMismatch {
            expected: 27,
            actual: 3,
        }
        .into();
        assert_eq!(shape.code(), FeatureShapeErrorCodes::LENGTH_MISMATCH);
        assert_eq!(shape.to_string(), shape.message());
    }
}
