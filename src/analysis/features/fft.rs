// FFT module - Framing and short-time Fourier transform
//
// Signals are analysed in centered frames: the waveform is padded by
// n_fft / 2 on both sides so frame t is centered on sample t * hop.
// The STFT uses a periodic Hann window and keeps the n_fft / 2 + 1
// non-negative frequency bins.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// How the signal is extended past its ends before framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Pad with zeros
    Zero,
    /// Repeat the first/last sample
    Edge,
}

/// Pad a signal by `pad` samples on each side
pub fn pad_center(signal: &[f64], pad: usize, mode: PadMode) -> Vec<f64> {
    let (head, tail) = match mode {
        PadMode::Zero => (0.0, 0.0),
        PadMode::Edge => (
            signal.first().copied().unwrap_or(0.0),
            signal.last().copied().unwrap_or(0.0),
        ),
    };

    let mut padded = Vec::with_capacity(signal.len() + 2 * pad);
    padded.extend(std::iter::repeat(head).take(pad));
    padded.extend_from_slice(signal);
    padded.extend(std::iter::repeat(tail).take(pad));
    padded
}

/// Number of full frames of `frame_length` samples spaced `hop` apart
pub fn frame_count(len: usize, frame_length: usize, hop: usize) -> usize {
    if len < frame_length || hop == 0 {
        0
    } else {
        1 + (len - frame_length) / hop
    }
}

/// Iterate over full frames of a (padded) signal
pub fn frames(signal: &[f64], frame_length: usize, hop: usize) -> impl Iterator<Item = &[f64]> {
    (0..frame_count(signal.len(), frame_length, hop))
        .map(move |i| &signal[i * hop..i * hop + frame_length])
}

/// Periodic Hann window (suited to spectral analysis)
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / size as f64).cos())
        .collect()
}

/// Center frequency of every non-negative FFT bin
pub fn fft_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f64> {
    let n_bins = n_fft / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;
    (0..n_bins)
        .map(|k| k as f64 * nyquist / (n_bins - 1).max(1) as f64)
        .collect()
}

/// Magnitude spectrogram, stored frame by frame
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// One magnitude spectrum (n_fft / 2 + 1 bins) per frame
    pub frames: Vec<Vec<f64>>,
    pub n_bins: usize,
}

impl Spectrogram {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Squared magnitudes
    pub fn power(&self) -> Vec<Vec<f64>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|m| m * m).collect())
            .collect()
    }
}

/// FFT processor that computes magnitude spectrograms
pub struct FftProcessor {
    fft: Arc<dyn Fft<f64>>,
    n_fft: usize,
    hop_length: usize,
    /// Hann window (pre-computed)
    window: Vec<f64>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `n_fft` - FFT window size
    /// * `hop_length` - Samples between successive frames
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(n_fft),
            n_fft,
            hop_length,
            window: hann_window(n_fft),
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Short-time magnitude spectrum over centered, zero-padded frames
    ///
    /// Produces `1 + len / hop_length` frames.
    pub fn stft(&self, signal: &[f64]) -> Spectrogram {
        let padded = pad_center(signal, self.n_fft / 2, PadMode::Zero);
        let n_bins = self.n_fft / 2 + 1;
        let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); self.n_fft];

        let frames = frames(&padded, self.n_fft, self.hop_length)
            .map(|frame| {
                for ((slot, &sample), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
                    *slot = Complex::new(sample * w, 0.0);
                }
                self.fft.process(&mut buffer);
                buffer[..n_bins].iter().map(|c| c.norm()).collect()
            })
            .collect();

        Spectrogram { frames, n_bins }
    }
}
