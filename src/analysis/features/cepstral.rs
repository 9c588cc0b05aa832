// Cepstral module - Mel filterbank and cepstral coefficients
//
// Power spectra are pooled into triangular mel bands (Slaney mel scale,
// area-normalized filters), converted to dB, and decorrelated with an
// orthonormal DCT-II. The first 13 coefficients describe the short-time
// spectral envelope.
//
// References:
// - Slaney, M. (1998). Auditory Toolbox, Technical Report #1998-010
// - Davis, S. & Mermelstein, P. (1980). Comparison of parametric
//   representations for monosyllabic word recognition

use std::f64::consts::PI;

use super::types::CEPSTRAL_COUNT;

/// Linear region slope of the Slaney scale (Hz per mel)
const F_SP: f64 = 200.0 / 3.0;

/// Start of the logarithmic region (Hz)
const MIN_LOG_HZ: f64 = 1000.0;

/// Convert Hz to mels (Slaney scale: linear below 1 kHz, log above)
pub fn hz_to_mel(hz: f64) -> f64 {
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f64.ln() / 27.0;
    if hz >= MIN_LOG_HZ {
        min_log_mel + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

/// Convert mels back to Hz (inverse of [`hz_to_mel`])
pub fn mel_to_hz(mel: f64) -> f64 {
    let min_log_mel = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f64.ln() / 27.0;
    if mel >= min_log_mel {
        MIN_LOG_HZ * (logstep * (mel - min_log_mel)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filterbank over the non-negative FFT bins
pub struct MelFilterbank {
    /// One weight row (n_fft / 2 + 1 bins) per mel band
    weights: Vec<Vec<f64>>,
}

impl MelFilterbank {
    /// Build `n_mels` filters spanning 0 Hz to Nyquist
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_frequencies` - Bin center frequencies of the spectrogram
    /// * `n_mels` - Number of mel bands
    pub fn new(sample_rate: u32, fft_frequencies: &[f64], n_mels: usize) -> Self {
        let max_mel = hz_to_mel(sample_rate as f64 / 2.0);
        let points = n_mels + 2;
        let mel_f: Vec<f64> = (0..points)
            .map(|i| mel_to_hz(max_mel * i as f64 / (points - 1) as f64))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let lower_width = mel_f[m + 1] - mel_f[m];
                let upper_width = mel_f[m + 2] - mel_f[m + 1];
                // Slaney normalization: constant energy per band
                let enorm = 2.0 / (mel_f[m + 2] - mel_f[m]);

                fft_frequencies
                    .iter()
                    .map(|&f| {
                        let lower = (f - mel_f[m]) / lower_width;
                        let upper = (mel_f[m + 2] - f) / upper_width;
                        lower.min(upper).max(0.0) * enorm
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    pub fn n_mels(&self) -> usize {
        self.weights.len()
    }

    /// Project power spectra onto the mel bands, frame by frame
    pub fn apply(&self, power_frames: &[Vec<f64>]) -> Vec<Vec<f64>> {
        power_frames
            .iter()
            .map(|spectrum| {
                self.weights
                    .iter()
                    .map(|row| row.iter().zip(spectrum).map(|(w, p)| w * p).sum())
                    .collect()
            })
            .collect()
    }
}

/// Orthonormal DCT-II keeping the first [`CEPSTRAL_COUNT`] coefficients
pub struct CepstralTransform {
    /// Basis rows, pre-scaled for orthonormality
    basis: Vec<Vec<f64>>,
}

impl CepstralTransform {
    pub fn new(n_mels: usize) -> Self {
        let n = n_mels as f64;
        let basis = (0..CEPSTRAL_COUNT)
            .map(|k| {
                let scale = if k == 0 {
                    (1.0 / n).sqrt()
                } else {
                    (2.0 / n).sqrt()
                };
                (0..n_mels)
                    .map(|i| scale * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos())
                    .collect()
            })
            .collect();
        Self { basis }
    }

    /// Cepstral coefficients for every frame of a dB mel spectrogram
    pub fn compute(&self, db_mel_frames: &[Vec<f64>]) -> Vec<[f64; CEPSTRAL_COUNT]> {
        db_mel_frames
            .iter()
            .map(|frame| {
                let mut coefficients = [0.0; CEPSTRAL_COUNT];
                for (c, row) in coefficients.iter_mut().zip(&self.basis) {
                    *c = row.iter().zip(frame).map(|(b, x)| b * x).sum();
                }
                coefficients
            })
            .collect()
    }
}
