// Temporal module - Time-domain feature extraction
//
// Frame-wise zero-crossing rate and RMS energy. Both use the same centered
// framing as the STFT so their frame counts line up with spectral frames.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

use super::fft::{frames, pad_center, PadMode};

/// Amplitudes at or below this magnitude count as zero for ZCR
const ZERO_THRESHOLD: f64 = 1e-10;

/// Time-domain feature computation functions
pub struct TemporalFeatures {
    frame_length: usize,
    hop_length: usize,
}

impl TemporalFeatures {
    /// Create a new temporal features processor
    ///
    /// # Arguments
    /// * `frame_length` - Samples per analysis frame
    /// * `hop_length` - Samples between successive frames
    pub fn new(frame_length: usize, hop_length: usize) -> Self {
        Self {
            frame_length,
            hop_length,
        }
    }

    /// Compute zero-crossing rate per frame
    ///
    /// The signal is edge-padded, near-zero samples are snapped to zero and
    /// zero counts as positive. Each frame's rate is
    /// `crossings / frame_length`, so a frame can reach at most
    /// `(frame_length - 1) / frame_length`.
    ///
    /// # Returns
    /// Zero-crossing rate per frame (0.0 to 1.0)
    pub fn compute_zcr(&self, signal: &[f64]) -> Vec<f64> {
        let padded = pad_center(signal, self.frame_length / 2, PadMode::Edge);

        frames(&padded, self.frame_length, self.hop_length)
            .map(|frame| {
                let crossings = frame
                    .windows(2)
                    .filter(|pair| is_negative(pair[0]) != is_negative(pair[1]))
                    .count();
                crossings as f64 / self.frame_length as f64
            })
            .collect()
    }

    /// Compute root-mean-square amplitude per frame
    ///
    /// Formula: RMS = sqrt((1 / N) × Σ x[n]²) over zero-padded centered frames
    pub fn compute_rms(&self, signal: &[f64]) -> Vec<f64> {
        let padded = pad_center(signal, self.frame_length / 2, PadMode::Zero);

        frames(&padded, self.frame_length, self.hop_length)
            .map(|frame| {
                let power = frame.iter().map(|x| x * x).sum::<f64>() / self.frame_length as f64;
                power.sqrt()
            })
            .collect()
    }
}

fn is_negative(sample: f64) -> bool {
    if sample.abs() <= ZERO_THRESHOLD {
        false
    } else {
        sample.is_sign_negative()
    }
}
