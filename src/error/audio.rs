// Audio processing error types and constants

use crate::error::ErrorCode;
use log::error;

/// Audio processing error code constants
///
/// Error code range: 1001-1008
pub struct AudioProcessingErrorCodes {}

impl AudioProcessingErrorCodes {
    /// Waveform contains no samples
    pub const EMPTY_SIGNAL: i32 = 1001;

    /// Sample rate is zero
    pub const INVALID_SAMPLE_RATE: i32 = 1002;

    /// Waveform contains NaN or infinite samples
    pub const NON_FINITE_SAMPLES: i32 = 1003;

    /// File extension is not in the allowed set
    pub const UNSUPPORTED_FORMAT: i32 = 1004;

    /// File exceeds the configured size limit
    pub const FILE_TOO_LARGE: i32 = 1005;

    /// Container or codec could not be decoded
    pub const DECODE_FAILED: i32 = 1006;

    /// A spectral transform rejected its parameters
    pub const TRANSFORM_FAILED: i32 = 1007;

    /// Extraction produced a NaN or infinite feature
    pub const NON_FINITE_FEATURE: i32 = 1008;
}

/// Log an audio processing error with structured context
///
/// Logs the numeric code, the component and the human-readable message.
pub fn log_audio_processing_error(err: &AudioProcessingError, context: &str) {
    error!(
        "Audio processing error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while turning audio into a feature vector
///
/// Never retried: extraction is deterministic, so the same input fails
/// the same way again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioProcessingError {
    /// Waveform contains no samples
    #[error("Audio signal is empty")]
    EmptySignal,

    /// Sample rate is zero
    #[error("Sample rate must be greater than 0 (got {sample_rate})")]
    InvalidSampleRate { sample_rate: u32 },

    /// First non-finite sample found in the waveform
    #[error("Audio contains a non-finite sample at index {index}")]
    NonFiniteSamples { index: usize },

    /// File extension not accepted
    #[error("Unsupported audio format '{extension}'")]
    UnsupportedFormat { extension: String },

    /// File larger than the configured limit
    #[error("Audio file is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    /// Decoder failure
    #[error("Failed to decode audio: {reason}")]
    Decode { reason: String },

    /// Underlying transform failure
    #[error("Failed to process audio: {reason}")]
    Transform { reason: String },

    /// Extraction produced a NaN or infinite slot
    #[error("Extracted feature at slot {index} is not finite")]
    NonFiniteFeature { index: usize },
}

impl ErrorCode for AudioProcessingError {
    fn code(&self) -> i32 {
        match self {
            AudioProcessingError::EmptySignal => AudioProcessingErrorCodes::EMPTY_SIGNAL,
            AudioProcessingError::InvalidSampleRate { .. } => {
                AudioProcessingErrorCodes::INVALID_SAMPLE_RATE
            }
            AudioProcessingError::NonFiniteSamples { .. } => {
                AudioProcessingErrorCodes::NON_FINITE_SAMPLES
            }
            AudioProcessingError::UnsupportedFormat { .. } => {
                AudioProcessingErrorCodes::UNSUPPORTED_FORMAT
            }
            AudioProcessingError::FileTooLarge { .. } => AudioProcessingErrorCodes::FILE_TOO_LARGE,
            AudioProcessingError::Decode { .. } => AudioProcessingErrorCodes::DECODE_FAILED,
            AudioProcessingError::Transform { .. } => AudioProcessingErrorCodes::TRANSFORM_FAILED,
            AudioProcessingError::NonFiniteFeature { .. } => {
                AudioProcessingErrorCodes::NON_FINITE_FEATURE
            }
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let errors = [
            AudioProcessingError::EmptySignal,
            AudioProcessingError::InvalidSampleRate { sample_rate: 0 },
            AudioProcessingError::NonFiniteSamples { index: 3 },
            AudioProcessingError::UnsupportedFormat {
                extension: "ogg".to_string(),
            },
            AudioProcessingError::FileTooLarge { size: 2, limit: 1 },
            AudioProcessingError::Decode {
                reason: "bad header".to_string(),
            },
            AudioProcessingError::Transform {
                reason: "band".to_string(),
            },
            AudioProcessingError::NonFiniteFeature { index: 26 },
        ];

        let mut codes: Vec<i32> = errors.iter().map(ErrorCode::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|code| (1001..=1008).contains(code)));
    }

    #[test]
    fn test_error_messages_carry_cause() {
        let err = AudioProcessingError::InvalidSampleRate { sample_rate: 0 };
        assert!(err.message().contains("got 0"));

        let err = AudioProcessingError::Decode {
            reason: "truncated file".to_string(),
        };
        assert_eq!(err.message(), "Failed to decode audio: truncated file");
    }
}
