// Remedies - static suggestion table per disfluency category
//
// Every category, including "none", has a non-empty ordered list.

use crate::analysis::classifier::Category;

/// Ordered remedy suggestions
pub type RemedyList = &'static [&'static str];

const REPETITION: RemedyList = &[
    "Practice slow speech techniques",
    "Try rhythm-based speech exercises",
    "Use light articulatory contacts when speaking",
    "Practice mindfulness during speech",
    "Consider syllable-timed speech practice",
];

const PROLONGATION: RemedyList = &[
    "Practice smooth transitions between sounds",
    "Use gentle onset of voicing techniques",
    "Implement airflow management exercises",
    "Try voluntary prolongation exercises",
    "Practice easy vocal onsets",
];

const BLOCKS: RemedyList = &[
    "Practice easy onset of speech",
    "Use pull-outs when feeling a block coming",
    "Implement diaphragmatic breathing techniques",
    "Try cancellations when you experience a block",
    "Practice relaxation techniques for speech muscles",
];

const INTERJECTIONS: RemedyList = &[
    "Practice pause placement in speech",
    "Work on identifying and reducing filler words",
    "Use phrasing techniques",
    "Practice speaking with purpose and intention",
    "Record yourself to become aware of interjection patterns",
];

const REVISIONS: RemedyList = &[
    "Practice pre-planning sentences",
    "Use visualization techniques before speaking",
    "Work on confidence-building exercises",
    "Practice speaking in shorter, complete phrases",
    "Try structured conversation exercises",
];

const FLUENT: RemedyList = &[
    "Continue practicing good speech habits",
    "Work on general speech clarity",
    "Practice public speaking for confidence",
    "Consider joining a speaking club like Toastmasters",
    "Learn relaxation techniques to maintain fluency",
];

/// Remedy suggestions for a category
pub fn remedies(category: Category) -> RemedyList {
    match category {
        Category::Repetition => REPETITION,
        Category::Prolongation => PROLONGATION,
        Category::Blocks => BLOCKS,
        Category::Interjections => INTERJECTIONS,
        Category::Revisions => REVISIONS,
        Category::None => FLUENT,
    }
}

/// Remedy suggestions for a category label
///
/// Labels that name no category get the "none" list instead of an error.
pub fn remedies_for_label(label: &str) -> RemedyList {
    match label.parse::<Category>() {
        Ok(category) => remedies(category),
        Err(err) => {
            log::warn!("[Remedies] {}, using 'none' suggestions", err);
            remedies(Category::None)
        }
    }
}
