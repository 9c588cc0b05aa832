// Types module - Fixed-layout feature vector
//
// The classifier reads slots by offset, so the order below is a contract
// between extraction and classification. All offsets live here; nothing
// else indexes the raw values.

use serde::{Deserialize, Serialize};

use crate::error::FeatureShapeError;

/// Number of cepstral coefficients
pub const CEPSTRAL_COUNT: usize = 13;

/// Number of spectral contrast values (6 octave bands + residual band)
pub const CONTRAST_COUNT: usize = 7;

pub const CEPSTRAL_OFFSET: usize = 0;
pub const ZCR_MEAN_OFFSET: usize = 13;
pub const ZCR_STD_OFFSET: usize = 14;
pub const CENTROID_MEAN_OFFSET: usize = 15;
pub const RMS_MEAN_OFFSET: usize = 16;
pub const RMS_STD_OFFSET: usize = 17;
pub const BANDWIDTH_MEAN_OFFSET: usize = 18;
pub const CONTRAST_OFFSET: usize = 19;
pub const TEMPO_OFFSET: usize = 26;

/// Total slot count: 13 + 2 + 1 + 2 + 1 + 7 + 1
pub const FEATURE_COUNT: usize = 27;

/// Summary statistics of one recording, before concatenation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureParts {
    /// Per-coefficient mean of the cepstral representation
    pub cepstral: [f64; CEPSTRAL_COUNT],
    pub zcr_mean: f64,
    pub zcr_std: f64,
    /// Mean spectral centroid in Hz
    pub centroid_mean: f64,
    pub rms_mean: f64,
    pub rms_std: f64,
    /// Mean spectral bandwidth in Hz
    pub bandwidth_mean: f64,
    /// Per-band mean spectral contrast in dB
    pub contrast: [f64; CONTRAST_COUNT],
    /// Tempo estimate in BPM
    pub tempo: f64,
}

/// Ordered feature vector of exactly [`FEATURE_COUNT`] values
///
/// Serializes as a flat JSON array in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Concatenate sub-features in layout order
    pub fn from_parts(parts: &FeatureParts) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        values[CEPSTRAL_OFFSET..CEPSTRAL_OFFSET + CEPSTRAL_COUNT].copy_from_slice(&parts.cepstral);
        values[ZCR_MEAN_OFFSET] = parts.zcr_mean;
        values[ZCR_STD_OFFSET] = parts.zcr_std;
        values[CENTROID_MEAN_OFFSET] = parts.centroid_mean;
        values[RMS_MEAN_OFFSET] = parts.rms_mean;
        values[RMS_STD_OFFSET] = parts.rms_std;
        values[BANDWIDTH_MEAN_OFFSET] = parts.bandwidth_mean;
        values[CONTRAST_OFFSET..CONTRAST_OFFSET + CONTRAST_COUNT].copy_from_slice(&parts.contrast);
        values[TEMPO_OFFSET] = parts.tempo;
        Self(values)
    }

    /// Build from a raw slice, checking only its length
    pub fn from_slice(values: &[f64]) -> Result<Self, FeatureShapeError> {
        let values: [f64; FEATURE_COUNT] =
            values
                .try_into()
                .map_err(|_| FeatureShapeError::LengthMismatch {
                    expected: FEATURE_COUNT,
                    actual: values.len(),
                })?;
        Ok(Self(values))
    }

    /// Index of the first NaN or infinite slot, if any
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|value| !value.is_finite())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn cepstral(&self) -> &[f64] {
        &self.0[CEPSTRAL_OFFSET..CEPSTRAL_OFFSET + CEPSTRAL_COUNT]
    }

    pub fn zcr_mean(&self) -> f64 {
        self.0[ZCR_MEAN_OFFSET]
    }

    pub fn zcr_std(&self) -> f64 {
        self.0[ZCR_STD_OFFSET]
    }

    pub fn centroid_mean(&self) -> f64 {
        self.0[CENTROID_MEAN_OFFSET]
    }

    pub fn rms_mean(&self) -> f64 {
        self.0[RMS_MEAN_OFFSET]
    }

    pub fn rms_std(&self) -> f64 {
        self.0[RMS_STD_OFFSET]
    }

    pub fn bandwidth_mean(&self) -> f64 {
        self.0[BANDWIDTH_MEAN_OFFSET]
    }

    pub fn contrast(&self) -> &[f64] {
        &self.0[CONTRAST_OFFSET..CONTRAST_OFFSET + CONTRAST_COUNT]
    }

    pub fn tempo(&self) -> f64 {
        self.0[TEMPO_OFFSET]
    }

    /// Mean of cepstral coefficients 1 through 4 (articulation band)
    pub fn low_cepstral_mean(&self) -> f64 {
        mean(&self.cepstral()[1..5])
    }

    /// Mean of cepstral coefficients 8 through 11
    pub fn high_cepstral_mean(&self) -> f64 {
        mean(&self.cepstral()[8..12])
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
