// Feature shape error types and constants

use crate::error::ErrorCode;
use log::error;

/// Feature shape error code constants
///
/// Error code range: 2001-2002
pub struct FeatureShapeErrorCodes {}

impl FeatureShapeErrorCodes {
    /// Vector length differs from the fixed layout
    pub const LENGTH_MISMATCH: i32 = 2001;

    /// A slot holds NaN or infinity
    pub const NON_FINITE: i32 = 2002;
}

/// Log a feature shape error with structured context
pub fn log_feature_shape_error(err: &FeatureShapeError, context: &str) {
    error!(
        "Feature shape error in {}: code={}, component=Classifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Classifier input does not satisfy the feature layout contract
///
/// Non-finite values are rejected here rather than coerced, so a
/// confidence can never become NaN.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureShapeError {
    #[error("Feature vector must have {expected} values (got {actual})")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Feature value at slot {index} is not finite")]
    NonFinite { index: usize },
}

impl ErrorCode for FeatureShapeError {
    fn code(&self) -> i32 {
        match self {
            FeatureShapeError::LengthMismatch { .. } => FeatureShapeErrorCodes::LENGTH_MISMATCH,
            FeatureShapeError::NonFinite { .. } => FeatureShapeErrorCodes::NON_FINITE,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }
}
