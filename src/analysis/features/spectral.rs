// Spectral module - Frequency-domain feature extraction
//
// This module computes spectral features from magnitude spectrograms.
// Centroid and bandwidth weight each bin by its share of the frame's total
// magnitude; contrast compares spectral peaks and valleys per octave band.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Jiang, D. et al. (2002). Music type classification by spectral contrast feature

use super::fft::Spectrogram;
use super::types::CONTRAST_COUNT;
use crate::error::AudioProcessingError;

/// Power floor before taking logarithms
const AMIN: f64 = 1e-10;

/// Dynamic range kept below the loudest value (dB)
const TOP_DB: f64 = 80.0;

/// Number of octave bands; one more residual band covers the rest
const CONTRAST_OCTAVES: usize = CONTRAST_COUNT - 1;

/// Convert power values to decibels
///
/// `10 · log10(max(AMIN, x))`, then every value is floored at
/// `max − TOP_DB`, with the maximum taken over all rows.
pub fn power_to_db<R: AsRef<[f64]>>(rows: &[R]) -> Vec<Vec<f64>> {
    let mut db: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            row.as_ref()
                .iter()
                .map(|&p| 10.0 * p.max(AMIN).log10())
                .collect()
        })
        .collect();

    let max = db
        .iter()
        .flat_map(|row| row.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() {
        let floor = max - TOP_DB;
        for value in db.iter_mut().flat_map(|row| row.iter_mut()) {
            *value = value.max(floor);
        }
    }
    db
}

/// Contiguous bin range of one contrast band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContrastBand {
    /// First bin of the sub-band
    start: usize,
    /// One past the last bin of the sub-band
    end: usize,
    /// Bins averaged for the peak and for the valley
    quantile_bins: usize,
}

/// Spectral feature computation functions
pub struct SpectralFeatures {
    /// Center frequency of every bin
    frequencies: Vec<f64>,
    bands: Vec<ContrastBand>,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `frequencies` - Bin center frequencies of the spectrogram
    /// * `fmin` - Upper edge of the lowest contrast band (Hz)
    /// * `quantile` - Fraction of bins averaged for peaks/valleys
    ///
    /// # Errors
    /// Fails when an octave band starts at or above Nyquist, or when a band
    /// contains no bins.
    pub fn new(
        sample_rate: u32,
        frequencies: Vec<f64>,
        fmin: f64,
        quantile: f64,
    ) -> Result<Self, AudioProcessingError> {
        let bands = contrast_bands(sample_rate, &frequencies, fmin, quantile)?;
        Ok(Self { frequencies, bands })
    }

    /// Compute spectral centroid per frame (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// Silent frames have a centroid of 0.
    pub fn compute_centroid(&self, spectrogram: &Spectrogram) -> Vec<f64> {
        spectrogram
            .frames
            .iter()
            .map(|frame| self.frame_centroid(frame))
            .collect()
    }

    /// Compute spectral bandwidth per frame
    ///
    /// Formula: bandwidth = sqrt(Σ(|X[i]| / Σ|X|) × (f_i − centroid)²)
    pub fn compute_bandwidth(&self, spectrogram: &Spectrogram) -> Vec<f64> {
        spectrogram
            .frames
            .iter()
            .map(|frame| {
                let total: f64 = frame.iter().sum();
                if total <= f64::MIN_POSITIVE {
                    return 0.0;
                }
                let centroid = self.frame_centroid(frame);
                frame
                    .iter()
                    .zip(&self.frequencies)
                    .map(|(&mag, &freq)| (mag / total) * (freq - centroid).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }

    /// Compute spectral contrast per frame, in dB
    ///
    /// For each band the magnitudes are sorted; the valley is the mean of
    /// the lowest quantile, the peak the mean of the highest. Peaks and
    /// valleys are each converted to dB before subtracting.
    pub fn compute_contrast(&self, spectrogram: &Spectrogram) -> Vec<[f64; CONTRAST_COUNT]> {
        let mut peaks = Vec::with_capacity(spectrogram.frame_count());
        let mut valleys = Vec::with_capacity(spectrogram.frame_count());

        for frame in &spectrogram.frames {
            let mut peak = [0.0; CONTRAST_COUNT];
            let mut valley = [0.0; CONTRAST_COUNT];

            for (k, band) in self.bands.iter().enumerate() {
                let mut sorted = frame[band.start..band.end].to_vec();
                sorted.sort_by(f64::total_cmp);
                let q = band.quantile_bins.min(sorted.len());
                valley[k] = mean(&sorted[..q]);
                peak[k] = mean(&sorted[sorted.len() - q..]);
            }

            peaks.push(peak);
            valleys.push(valley);
        }

        let peak_db = power_to_db(&peaks);
        let valley_db = power_to_db(&valleys);

        peak_db
            .iter()
            .zip(&valley_db)
            .map(|(peak, valley)| {
                let mut contrast = [0.0; CONTRAST_COUNT];
                for (k, value) in contrast.iter_mut().enumerate() {
                    *value = peak[k] - valley[k];
                }
                contrast
            })
            .collect()
    }

    fn frame_centroid(&self, frame: &[f64]) -> f64 {
        let total: f64 = frame.iter().sum();
        if total <= f64::MIN_POSITIVE {
            return 0.0;
        }
        frame
            .iter()
            .zip(&self.frequencies)
            .map(|(&mag, &freq)| freq * mag)
            .sum::<f64>()
            / total
    }
}

/// Lay out the octave bands `[0, fmin], [fmin, 2·fmin], ...`
///
/// Every band after the first also takes the bin just below its lower
/// edge; every band but the last drops its top bin, and the last band
/// extends to Nyquist.
fn contrast_bands(
    sample_rate: u32,
    frequencies: &[f64],
    fmin: f64,
    quantile: f64,
) -> Result<Vec<ContrastBand>, AudioProcessingError> {
    let mut edges = [0.0; CONTRAST_OCTAVES + 2];
    for (i, edge) in edges.iter_mut().enumerate().skip(1) {
        *edge = fmin * 2f64.powi(i as i32 - 1);
    }

    let nyquist = sample_rate as f64 / 2.0;
    if edges[..edges.len() - 1].iter().any(|&edge| edge >= nyquist) {
        return Err(AudioProcessingError::Transform {
            reason: format!(
                "spectral contrast band exceeds Nyquist ({} Hz) for fmin {} Hz",
                nyquist, fmin
            ),
        });
    }

    let last = CONTRAST_OCTAVES;
    let mut bands = Vec::with_capacity(CONTRAST_COUNT);
    for k in 0..=last {
        let (f_low, f_high) = (edges[k], edges[k + 1]);
        let mut inside = frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f >= f_low && f <= f_high)
            .map(|(i, _)| i);
        let first = inside.next().ok_or_else(|| AudioProcessingError::Transform {
            reason: format!("spectral contrast band {}-{} Hz has no bins", f_low, f_high),
        })?;
        let last_inside = inside.last().unwrap_or(first);

        let start = if k > 0 { first.saturating_sub(1) } else { first };
        let stop = if k == last {
            frequencies.len()
        } else {
            last_inside + 1
        };
        let selected = stop - start;
        let end = if k < last { stop - 1 } else { stop };
        if end <= start {
            return Err(AudioProcessingError::Transform {
                reason: format!("spectral contrast band {}-{} Hz is too narrow", f_low, f_high),
            });
        }

        let quantile_bins = ((quantile * selected as f64).round_ties_even() as usize).max(1);
        bands.push(ContrastBand {
            start,
            end,
            quantile_bins,
        });
    }

    Ok(bands)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::super::fft::{fft_frequencies, FftProcessor};
    use super::*;
    use std::f64::consts::PI;

    fn spectral(sample_rate: u32) -> SpectralFeatures {
        SpectralFeatures::new(sample_rate, fft_frequencies(sample_rate, 2048), 200.0, 0.02)
            .unwrap()
    }

    fn sine_spectrogram(sample_rate: u32, frequency: f64) -> Spectrogram {
        let signal: Vec<f64> = (0..sample_rate as usize)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate as f64).sin())
            .collect();
        FftProcessor::new(2048, 512).stft(&signal)
    }

    #[test]
    fn test_power_to_db_floors_relative_to_max() {
        let db = power_to_db(&[vec![1.0, 1e-12], vec![0.01, 0.0]]);
        assert_eq!(db[0][0], 0.0);
        assert_eq!(db[0][1], -80.0);
        assert!((db[1][0] + 20.0).abs() < 1e-9);
        assert_eq!(db[1][1], -80.0);
    }

    #[test]
    fn test_centroid_tracks_sine_frequency() {
        let features = spectral(16_000);
        let low = features.compute_centroid(&sine_spectrogram(16_000, 300.0));
        let high = features.compute_centroid(&sine_spectrogram(16_000, 4000.0));
        let low_mid = low[low.len() / 2];
        let high_mid = high[high.len() / 2];
        assert!((low_mid - 300.0).abs() < 50.0, "low centroid {}", low_mid);
        assert!((high_mid - 4000.0).abs() < 50.0, "high centroid {}", high_mid);
    }

    #[test]
    fn test_silent_frames_yield_zero() {
        let features = spectral(16_000);
        let silence = FftProcessor::new(2048, 512).stft(&vec![0.0; 8000]);
        assert!(features.compute_centroid(&silence).iter().all(|&c| c == 0.0));
        assert!(features.compute_bandwidth(&silence).iter().all(|&b| b == 0.0));
        let contrast = features.compute_contrast(&silence);
        assert!(contrast.iter().flatten().all(|&c| c == 0.0));
    }

    #[test]
    fn test_bandwidth_narrow_for_sine() {
        let features = spectral(16_000);
        let bandwidth = features.compute_bandwidth(&sine_spectrogram(16_000, 1000.0));
        let middle = bandwidth[bandwidth.len() / 2];
        assert!(middle < 200.0, "sine bandwidth {}", middle);
    }

    #[test]
    fn test_contrast_bands_cover_spectrum() {
        let features = spectral(16_000);
        assert_eq!(features.bands.len(), CONTRAST_COUNT);
        assert_eq!(features.bands[0].start, 0);
        assert_eq!(features.bands[CONTRAST_COUNT - 1].end, 1025);
        for pair in features.bands.windows(2) {
            assert!(pair[1].start < pair[0].end + 1);
        }
    }

    #[test]
    fn test_contrast_rejects_band_above_nyquist() {
        let result = SpectralFeatures::new(8_000, fft_frequencies(8_000, 2048), 200.0, 0.02);
        assert!(matches!(
            result,
            Err(AudioProcessingError::Transform { .. })
        ));
    }

    #[test]
    fn test_contrast_high_in_sine_band() {
        let features = spectral(16_000);
        let contrast = features.compute_contrast(&sine_spectrogram(16_000, 1000.0));
        let middle = contrast[contrast.len() / 2];
        // 1 kHz lies in the 800-1600 Hz band (index 3)
        assert!(middle[3] > 20.0, "contrast {:?}", middle);
        assert!(middle.iter().all(|c| *c >= 0.0));
    }
}
