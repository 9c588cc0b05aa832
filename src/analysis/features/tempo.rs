// Tempo module - Onset strength envelope and global tempo estimate
//
// Algorithm:
// 1. Onset strength: positive first difference of the dB mel spectrogram,
//    averaged over mel bands, shifted to line up with STFT frames
// 2. Tempogram: autocorrelation of Hann-windowed envelope slices
//    (ac_size seconds each, one per frame), each normalized by its peak
// 3. Average the tempogram over time
// 4. Pick the lag maximizing log1p(1e6 · tempogram) + log-normal prior
//    centered on start_bpm; lags faster than max_bpm are excluded
//
// References:
// - Ellis, D. (2007). Beat tracking by dynamic programming
// - Grosche, P. et al. (2010). Cyclic tempogram

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::fft::hann_window;
use crate::config::FeatureConfig;
use crate::error::AudioProcessingError;

/// Tempo estimator over onset strength envelopes
pub struct TempoEstimator {
    sample_rate: u32,
    n_fft: usize,
    hop_length: usize,
    /// Autocorrelation window length in envelope frames
    win_length: usize,
    window: Vec<f64>,
    start_bpm: f64,
    std_bpm: f64,
    max_bpm: f64,
    ac_size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl TempoEstimator {
    /// Create a tempo estimator for the given sample rate
    ///
    /// # Errors
    /// Fails when the autocorrelation window spans fewer than two frames.
    pub fn new(sample_rate: u32, config: &FeatureConfig) -> Result<Self, AudioProcessingError> {
        let window_samples = (config.tempo_ac_size_secs * sample_rate as f64).floor();
        let win_length = (window_samples / config.hop_length as f64).floor() as usize;
        if win_length < 2 {
            return Err(AudioProcessingError::Transform {
                reason: format!(
                    "tempo window of {} s holds fewer than 2 frames at {} Hz",
                    config.tempo_ac_size_secs, sample_rate
                ),
            });
        }

        // zero padding to avoid circular wrap-around
        let ac_size = (2 * win_length - 1).next_power_of_two();
        let mut planner = FftPlanner::new();

        Ok(Self {
            sample_rate,
            n_fft: config.n_fft,
            hop_length: config.hop_length,
            win_length,
            window: hann_window(win_length),
            start_bpm: config.tempo_start_bpm,
            std_bpm: config.tempo_std_bpm,
            max_bpm: config.tempo_max_bpm,
            ac_size,
            forward: planner.plan_fft_forward(ac_size),
            inverse: planner.plan_fft_inverse(ac_size),
        })
    }

    /// Onset strength envelope from a dB mel spectrogram (frames × bands)
    ///
    /// Returns one value per spectrogram frame.
    pub fn onset_strength(&self, db_mel_frames: &[Vec<f64>]) -> Vec<f64> {
        let n_frames = db_mel_frames.len();
        // lag of one frame, plus the centering offset of the STFT
        let offset = 1 + self.n_fft / (2 * self.hop_length);

        let flux = db_mel_frames.windows(2).map(|pair| {
            let (previous, current) = (&pair[0], &pair[1]);
            let rising: f64 = current
                .iter()
                .zip(previous)
                .map(|(c, p)| (c - p).max(0.0))
                .sum();
            rising / current.len().max(1) as f64
        });

        std::iter::repeat(0.0)
            .take(offset)
            .chain(flux)
            .take(n_frames)
            .collect()
    }

    /// Estimate the dominant tempo in BPM
    pub fn estimate(&self, envelope: &[f64]) -> Result<f64, AudioProcessingError> {
        let tempogram = self.mean_tempogram(envelope);

        let best = (1..self.win_length)
            .map(|lag| {
                let bpm = self.lag_to_bpm(lag);
                let score = if bpm >= self.max_bpm {
                    f64::NEG_INFINITY
                } else {
                    let deviation = (bpm.log2() - self.start_bpm.log2()) / self.std_bpm;
                    (1e6 * tempogram[lag]).ln_1p() - 0.5 * deviation * deviation
                };
                (lag, score)
            })
            .filter(|(_, score)| score.is_finite())
            .fold(None, |best: Option<(usize, f64)>, (lag, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((lag, score)),
            });

        match best {
            Some((lag, _)) => Ok(self.lag_to_bpm(lag)),
            None => Err(AudioProcessingError::Transform {
                reason: format!("no tempo candidate below {} BPM", self.max_bpm),
            }),
        }
    }

    fn lag_to_bpm(&self, lag: usize) -> f64 {
        60.0 * self.sample_rate as f64 / (self.hop_length as f64 * lag as f64)
    }

    /// Autocorrelation tempogram averaged over all frames
    fn mean_tempogram(&self, envelope: &[f64]) -> Vec<f64> {
        let n = envelope.len();
        let mut sum = vec![0.0; self.win_length];
        if n == 0 {
            return sum;
        }

        let padded = ramp_pad(envelope, self.win_length / 2);
        let mut buffer = vec![Complex::new(0.0, 0.0); self.ac_size];

        for start in 0..n {
            let slice = &padded[start..start + self.win_length];
            buffer.fill(Complex::new(0.0, 0.0));
            for ((slot, &x), &w) in buffer.iter_mut().zip(slice).zip(&self.window) {
                *slot = Complex::new(x * w, 0.0);
            }

            self.forward.process(&mut buffer);
            for value in buffer.iter_mut() {
                *value = Complex::new(value.norm_sqr(), 0.0);
            }
            self.inverse.process(&mut buffer);

            let autocorr: Vec<f64> = buffer[..self.win_length]
                .iter()
                .map(|c| c.re / self.ac_size as f64)
                .collect();
            let peak = autocorr.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
            let scale = if peak > f64::MIN_POSITIVE { peak } else { 1.0 };
            for (total, value) in sum.iter_mut().zip(&autocorr) {
                *total += value / scale;
            }
        }

        for total in sum.iter_mut() {
            *total /= n as f64;
        }
        sum
    }
}

/// Pad with linear ramps from zero up to the edge values
fn ramp_pad(signal: &[f64], pad: usize) -> Vec<f64> {
    let first = signal.first().copied().unwrap_or(0.0);
    let last = signal.last().copied().unwrap_or(0.0);
    let mut padded = Vec::with_capacity(signal.len() + 2 * pad);
    padded.extend((0..pad).map(|i| first * i as f64 / pad as f64));
    padded.extend_from_slice(signal);
    padded.extend((0..pad).map(|j| last * (pad - 1 - j) as f64 / pad as f64));
    padded
}
