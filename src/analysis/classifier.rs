// Classifier - rule-based speech disfluency classification
//
// This module maps a feature vector to one disfluency category using a
// fixed, ordered list of threshold rules. The first rule whose guard holds
// decides the category and computes a raw confidence, bounded to a
// per-rule range; when no rule matches the recording is classified as
// fluent ("none").
//
// Rules, in evaluation order:
// 1. zcr_std > 0.1 AND rms_std > 0.2            → blocks        [0.60, 0.90]
// 2. mean(cepstral[1..5]) > 0.5                 → repetition    [0.55, 0.85]
// 3. rms_std < 0.05 AND zcr_mean > 0.1          → prolongation  [0.50, 0.80]
// 4. rms_mean > 0.3 AND zcr_std < 0.05          → interjections [0.45, 0.75]
// 5. rms_std > 0.1 AND mean(cepstral[8..12]) > 0.3 → revisions  [0.40, 0.70]
// 6. otherwise                                  → none          0.80
//
// The thresholds are a fixed, auditable heuristic over summary statistics,
// not a trained model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::features::FeatureVector;
use crate::analysis::remedies::{remedies, RemedyList};
use crate::error::FeatureShapeError;

/// Disfluency category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Repetition of sounds, syllables or words
    Repetition,
    /// Sound prolongations
    Prolongation,
    /// Silent blocks or stops
    Blocks,
    /// Fillers and interjections
    Interjections,
    /// Revisions or modifications of speech
    Revisions,
    /// No significant disfluency
    None,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 6] = [
        Category::Repetition,
        Category::Prolongation,
        Category::Blocks,
        Category::Interjections,
        Category::Revisions,
        Category::None,
    ];

    /// Stable lower-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Repetition => "repetition",
            Category::Prolongation => "prolongation",
            Category::Blocks => "blocks",
            Category::Interjections => "interjections",
            Category::Revisions => "revisions",
            Category::None => "none",
        }
    }

    /// Canonical human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Category::Repetition => "Repetition of sounds, syllables, or words",
            Category::Prolongation => "Sound prolongations",
            Category::Blocks => "Silent blocks or stops",
            Category::Interjections => "Fillers and interjections",
            Category::Revisions => "Revisions or modifications of speech",
            Category::None => "No significant stutter detected",
        }
    }

    /// Suggested remedies for this category
    pub fn remedies(&self) -> RemedyList {
        remedies(*self)
    }

    pub fn is_disfluency(&self) -> bool {
        *self != Category::None
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label that names no category
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown disfluency category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == label)
            .ok_or_else(|| UnknownCategory(label.to_string()))
    }
}

/// Outcome of classifying one recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Always `category.description()`
    pub description: &'static str,
    /// Integer percentage in [0, 100]
    pub confidence: u8,
    /// `category != none`
    pub has_disfluency: bool,
}

impl ClassificationResult {
    /// Build a result from a raw confidence in [0, 1]
    ///
    /// The raw value is scaled to a percentage and rounded half-to-even,
    /// once.
    pub fn new(category: Category, raw_confidence: f64) -> Self {
        let percent = (raw_confidence * 100.0).round_ties_even().clamp(0.0, 100.0);
        Self {
            category,
            description: category.description(),
            confidence: percent as u8,
            has_disfluency: category.is_disfluency(),
        }
    }
}

/// Confidence used when no rule matches
const FALLBACK_CONFIDENCE: f64 = 0.8;

/// One guarded rule of the decision list
struct Rule {
    category: Category,
    applies: fn(&FeatureVector) -> bool,
    confidence: fn(&FeatureVector) -> f64,
}

/// Decision list; order is significant
const RULES: [Rule; 5] = [
    Rule {
        category: Category::Blocks,
        applies: blocks_applies,
        confidence: blocks_confidence,
    },
    Rule {
        category: Category::Repetition,
        applies: repetition_applies,
        confidence: repetition_confidence,
    },
    Rule {
        category: Category::Prolongation,
        applies: prolongation_applies,
        confidence: prolongation_confidence,
    },
    Rule {
        category: Category::Interjections,
        applies: interjections_applies,
        confidence: interjections_confidence,
    },
    Rule {
        category: Category::Revisions,
        applies: revisions_applies,
        confidence: revisions_confidence,
    },
];

/// `min(hi, max(lo, x))`: lower bound first, then upper bound
fn bound(x: f64, lo: f64, hi: f64) -> f64 {
    hi.min(lo.max(x))
}

/// High variation in zero-crossings and energy
fn blocks_applies(f: &FeatureVector) -> bool {
    f.zcr_std() > 0.1 && f.rms_std() > 0.2
}

fn blocks_confidence(f: &FeatureVector) -> f64 {
    bound(f.zcr_std() * 2.0, 0.6, 0.9)
}

fn repetition_applies(f: &FeatureVector) -> bool {
    f.low_cepstral_mean() > 0.5
}

fn repetition_confidence(f: &FeatureVector) -> f64 {
    bound(f.low_cepstral_mean(), 0.55, 0.85)
}

/// Steady energy with frequent zero-crossings
fn prolongation_applies(f: &FeatureVector) -> bool {
    f.rms_std() < 0.05 && f.zcr_mean() > 0.1
}

fn prolongation_confidence(f: &FeatureVector) -> f64 {
    bound(1.0 - f.rms_std() * 10.0, 0.5, 0.8)
}

/// Loud with steady zero-crossings
fn interjections_applies(f: &FeatureVector) -> bool {
    f.rms_mean() > 0.3 && f.zcr_std() < 0.05
}

fn interjections_confidence(f: &FeatureVector) -> f64 {
    bound(f.rms_mean(), 0.45, 0.75)
}

fn revisions_applies(f: &FeatureVector) -> bool {
    f.rms_std() > 0.1 && f.high_cepstral_mean() > 0.3
}

fn revisions_confidence(f: &FeatureVector) -> f64 {
    bound(f.rms_std() * 2.0, 0.4, 0.7)
}

/// Classify a raw feature vector
///
/// # Errors
/// `LengthMismatch` unless exactly 27 values are given; `NonFinite` if any
/// value is NaN or infinite.
pub fn classify(features: &[f64]) -> Result<ClassificationResult, FeatureShapeError> {
    let vector = FeatureVector::from_slice(features)?;
    classify_vector(&vector)
}

/// Classify a feature vector produced by the extractor
///
/// Rules are evaluated in order and the first match wins; no later rule
/// is consulted once one fires.
pub fn classify_vector(features: &FeatureVector) -> Result<ClassificationResult, FeatureShapeError> {
    if let Some(index) = features.first_non_finite() {
        return Err(FeatureShapeError::NonFinite { index });
    }

    let (category, raw_confidence) = RULES
        .iter()
        .find(|rule| (rule.applies)(features))
        .map(|rule| (rule.category, (rule.confidence)(features)))
        .unwrap_or((Category::None, FALLBACK_CONFIDENCE));

    let result = ClassificationResult::new(category, raw_confidence);
    log::debug!(
        "[Classifier] category={} raw_confidence={:.4} confidence={}%",
        result.category,
        raw_confidence,
        result.confidence
    );
    Ok(result)
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
