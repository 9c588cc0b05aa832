//! Serializable record of one analyzed recording.

use serde::Serialize;

use crate::analysis::{Analysis, Category, RemedyList};
use crate::audio::Waveform;

/// Flat analysis record handed to presentation layers as JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub filename: String,
    pub sample_rate: u32,
    pub duration_secs: f64,
    pub has_disfluency: bool,
    pub category: Category,
    pub description: &'static str,
    /// Integer percentage
    pub confidence: u8,
    pub remedies: RemedyList,
    /// The 27 summary features, in layout order
    pub features: Vec<f64>,
}

impl AnalysisReport {
    pub fn new(filename: impl Into<String>, waveform: &Waveform, analysis: &Analysis) -> Self {
        let classification = &analysis.classification;
        Self {
            filename: filename.into(),
            sample_rate: waveform.sample_rate,
            duration_secs: waveform.duration_secs(),
            has_disfluency: classification.has_disfluency,
            category: classification.category,
            description: classification.description,
            confidence: classification.confidence,
            remedies: analysis.remedies,
            features: analysis.features.to_vec(),
        }
    }
}
