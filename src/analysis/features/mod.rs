// FeatureExtractor - summary features of a whole speech recording
//
// This module turns a waveform into the fixed 27-slot feature vector used
// by the disfluency classifier. Every sub-feature is computed frame by
// frame over the full recording and then summarized across frames.
//
// Module organization:
// - types: FeatureVector layout and named accessors
// - fft: centered framing and STFT
// - cepstral: mel filterbank and cepstral coefficients
// - temporal: zero-crossing rate, RMS energy
// - spectral: centroid, bandwidth, contrast
// - tempo: onset strength envelope and tempo estimate
// - mod.rs: Coordinator (FeatureExtractor)
//
// Layout (in order):
// 1. Cepstral coefficient means (13)
// 2. Zero-crossing rate mean, std (2)
// 3. Spectral centroid mean (1)
// 4. RMS energy mean, std (2)
// 5. Spectral bandwidth mean (1)
// 6. Spectral contrast band means (7)
// 7. Tempo (1)

mod cepstral;
mod fft;
mod spectral;
mod tempo;
mod temporal;
mod types;

pub use types::{
    FeatureParts, FeatureVector, BANDWIDTH_MEAN_OFFSET, CENTROID_MEAN_OFFSET, CEPSTRAL_COUNT,
    CEPSTRAL_OFFSET, CONTRAST_COUNT, CONTRAST_OFFSET, FEATURE_COUNT, RMS_MEAN_OFFSET,
    RMS_STD_OFFSET, TEMPO_OFFSET, ZCR_MEAN_OFFSET, ZCR_STD_OFFSET,
};

use cepstral::{CepstralTransform, MelFilterbank};
use fft::{fft_frequencies, FftProcessor};
use spectral::{power_to_db, SpectralFeatures};
use tempo::TempoEstimator;
use temporal::TemporalFeatures;

use crate::config::FeatureConfig;
use crate::error::AudioProcessingError;

/// FeatureExtractor coordinates the feature extraction pipeline
///
/// Holds the pre-computed windows, filterbanks and FFT plans for one
/// sample rate. Extraction is pure: the same samples always produce the
/// same vector.
pub struct FeatureExtractor {
    sample_rate: u32,
    fft_processor: FftProcessor,
    mel_filterbank: MelFilterbank,
    cepstral_transform: CepstralTransform,
    temporal_features: TemporalFeatures,
    spectral_features: SpectralFeatures,
    tempo_estimator: TempoEstimator,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor with default frame parameters
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz (e.g., 16000)
    ///
    /// # Errors
    /// Fails for a zero sample rate, or one too low for the spectral
    /// contrast bands (Nyquist must exceed 6.4 kHz).
    pub fn new(sample_rate: u32) -> Result<Self, AudioProcessingError> {
        Self::with_config(sample_rate, &FeatureConfig::default())
    }

    /// Create a FeatureExtractor with explicit frame parameters
    pub fn with_config(
        sample_rate: u32,
        config: &FeatureConfig,
    ) -> Result<Self, AudioProcessingError> {
        if sample_rate == 0 {
            return Err(AudioProcessingError::InvalidSampleRate { sample_rate });
        }
        if config.n_fft < 2 || config.hop_length == 0 || config.n_mels == 0 {
            return Err(AudioProcessingError::Transform {
                reason: format!(
                    "invalid frame parameters (n_fft={}, hop_length={}, n_mels={})",
                    config.n_fft, config.hop_length, config.n_mels
                ),
            });
        }

        let frequencies = fft_frequencies(sample_rate, config.n_fft);

        Ok(Self {
            sample_rate,
            fft_processor: FftProcessor::new(config.n_fft, config.hop_length),
            mel_filterbank: MelFilterbank::new(sample_rate, &frequencies, config.n_mels),
            cepstral_transform: CepstralTransform::new(config.n_mels),
            temporal_features: TemporalFeatures::new(config.n_fft, config.hop_length),
            spectral_features: SpectralFeatures::new(
                sample_rate,
                frequencies,
                config.contrast_fmin,
                config.contrast_quantile,
            )?,
            tempo_estimator: TempoEstimator::new(sample_rate, config)?,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Extract the feature vector of a whole recording
    ///
    /// This method coordinates the entire feature extraction pipeline:
    /// 1. Validate the samples (non-empty, finite)
    /// 2. Compute the magnitude spectrogram and its dB mel projection
    /// 3. Summarize cepstral, temporal and spectral features per frame
    /// 4. Estimate tempo from the onset strength envelope
    /// 5. Concatenate into the fixed layout
    ///
    /// # Arguments
    /// * `samples` - Mono waveform; need not be normalized
    ///
    /// # Errors
    /// `EmptySignal` / `NonFiniteSamples` for unusable input, and
    /// `NonFiniteFeature` if a statistic still comes out non-finite.
    pub fn extract(&self, samples: &[f32]) -> Result<FeatureVector, AudioProcessingError> {
        if samples.is_empty() {
            return Err(AudioProcessingError::EmptySignal);
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AudioProcessingError::NonFiniteSamples { index });
        }

        let signal: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();

        let spectrogram = self.fft_processor.stft(&signal);
        let mel = self.mel_filterbank.apply(&spectrogram.power());
        let db_mel = power_to_db(&mel);

        let cepstral_frames = self.cepstral_transform.compute(&db_mel);
        let mut cepstral = [0.0; CEPSTRAL_COUNT];
        for (k, value) in cepstral.iter_mut().enumerate() {
            *value = mean(cepstral_frames.iter().map(|frame| frame[k]));
        }

        let (zcr_mean, zcr_std) = mean_std(&self.temporal_features.compute_zcr(&signal));
        let (rms_mean, rms_std) = mean_std(&self.temporal_features.compute_rms(&signal));

        let centroid_mean = mean(
            self.spectral_features
                .compute_centroid(&spectrogram)
                .into_iter(),
        );
        let bandwidth_mean = mean(
            self.spectral_features
                .compute_bandwidth(&spectrogram)
                .into_iter(),
        );

        let contrast_frames = self.spectral_features.compute_contrast(&spectrogram);
        let mut contrast = [0.0; CONTRAST_COUNT];
        for (k, value) in contrast.iter_mut().enumerate() {
            *value = mean(contrast_frames.iter().map(|frame| frame[k]));
        }

        let envelope = self.tempo_estimator.onset_strength(&db_mel);
        let tempo = self.tempo_estimator.estimate(&envelope)?;

        let features = FeatureVector::from_parts(&FeatureParts {
            cepstral,
            zcr_mean,
            zcr_std,
            centroid_mean,
            rms_mean,
            rms_std,
            bandwidth_mean,
            contrast,
            tempo,
        });

        if let Some(index) = features.first_non_finite() {
            return Err(AudioProcessingError::NonFiniteFeature { index });
        }

        tracing::debug!(
            "[FeatureExtractor] Extracted {} features from {} samples @ {} Hz ({} frames)",
            FEATURE_COUNT,
            samples.len(),
            self.sample_rate,
            spectrogram.frame_count()
        );

        Ok(features)
    }
}

/// Extract the feature vector of a waveform with default parameters
///
/// # Arguments
/// * `samples` - Mono waveform
/// * `sample_rate` - Sample rate in Hz, must be > 0
pub fn extract(samples: &[f32], sample_rate: u32) -> Result<FeatureVector, AudioProcessingError> {
    FeatureExtractor::new(sample_rate)?.extract(samples)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Population mean and standard deviation
fn mean_std(values: &[f64]) -> (f64, f64) {
    let average = mean(values.iter().copied());
    let variance = mean(values.iter().map(|v| (v - average).powi(2)));
    (average, variance.sqrt())
}
