//! Configuration management for analysis parameters
//!
//! This module provides runtime configuration loading from JSON files.
//! Frame parameters of the feature extractor and the input acceptance
//! rules can be adjusted without recompilation. The feature layout itself
//! (13 cepstral coefficients, 7 contrast bands) is fixed and not part of
//! the configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub features: FeatureConfig,
    pub input: InputConfig,
}

/// Feature extraction frame parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// FFT window size in samples
    pub n_fft: usize,
    /// Hop size between successive frames
    pub hop_length: usize,
    /// Number of mel bands feeding the cepstral and onset computations
    pub n_mels: usize,
    /// Lower edge of the first spectral contrast octave band (Hz)
    pub contrast_fmin: f64,
    /// Fraction of bins averaged for contrast peaks and valleys
    pub contrast_quantile: f64,
    /// Center of the tempo prior (BPM)
    pub tempo_start_bpm: f64,
    /// Width of the tempo prior in octaves
    pub tempo_std_bpm: f64,
    /// Autocorrelation window for tempo estimation (seconds)
    pub tempo_ac_size_secs: f64,
    /// Tempi at or above this value are never selected (BPM)
    pub tempo_max_bpm: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            contrast_fmin: 200.0,
            contrast_quantile: 0.02,
            tempo_start_bpm: 120.0,
            tempo_std_bpm: 1.0,
            tempo_ac_size_secs: 8.0,
            tempo_max_bpm: 320.0,
        }
    }
}

/// Acceptance rules for audio files handed to the decoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Lower-case file extensions accepted for decoding
    pub allowed_extensions: Vec<String>,
    /// Maximum accepted file size in bytes
    pub max_file_bytes: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["mp3".to_string(), "wav".to_string()],
            max_file_bytes: 16 * 1024 * 1024,
        }
    }
}

impl InputConfig {
    /// Whether the extension (case-insensitive) is accepted
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration. If the file doesn't exist or the JSON is
    /// invalid, a warning is logged and the defaults are returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
