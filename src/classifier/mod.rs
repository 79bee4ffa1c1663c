//! Sentiment classification.
//!
//! Every scorer implements [`Classifier`]; the rest of the pipeline only
//! depends on that trait. Labels come from the polarity alone, via
//! [`Thresholds`], so a classification can be checked by hand from the
//! printed polarity:
//!
//! - `polarity >= positive` → positive
//! - `polarity <= negative` → negative
//! - anything between → neutral

pub mod keyword;
pub mod lexicon;

pub use keyword::KeywordClassifier;
pub use lexicon::LexiconClassifier;

use crate::error::{ClassificationError, ConfigError};
use crate::models::{ClassifiedReview, ReviewRecord, Sentiment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default cutoff at or below which a review is negative.
pub const DEFAULT_NEGATIVE_THRESHOLD: f64 = -0.2;

/// Default cutoff at or above which a review is positive.
pub const DEFAULT_POSITIVE_THRESHOLD: f64 = 0.2;

/// Polarity cutoffs for the three labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    negative: f64,
    positive: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            negative: DEFAULT_NEGATIVE_THRESHOLD,
            positive: DEFAULT_POSITIVE_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Requires `-1 <= negative < positive <= 1`.
    pub fn new(negative: f64, positive: f64) -> Result<Self, ConfigError> {
        let in_range = |v: f64| v.is_finite() && (-1.0..=1.0).contains(&v);

        if !in_range(negative) || !in_range(positive) || negative >= positive {
            return Err(ConfigError::InvalidThresholds { negative, positive });
        }

        Ok(Self { negative, positive })
    }

    pub fn negative(&self) -> f64 {
        self.negative
    }

    pub fn positive(&self) -> f64 {
        self.positive
    }

    /// Label for a polarity.
    pub fn label_for(&self, polarity: f64) -> Sentiment {
        if polarity >= self.positive {
            Sentiment::Positive
        } else if polarity <= self.negative {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// A sentiment scorer.
///
/// Implementations must be pure: the same text always yields the same
/// polarity, and no state is carried between reviews. That is what allows
/// reviews to be classified concurrently.
pub trait Classifier: Send + Sync {
    /// Short name, recorded on each batch result.
    fn name(&self) -> &str;

    /// Cutoffs used to turn polarity into a label.
    fn thresholds(&self) -> Thresholds;

    /// Raw polarity of `text`, expected in [-1, 1]. Text with no sentiment
    /// signal scores 0.
    fn polarity(&self, text: &str) -> f64;

    /// Classify a single review.
    fn classify(&self, review: &ReviewRecord) -> Result<ClassifiedReview, ClassificationError> {
        if !is_decodable(&review.text) {
            return Err(ClassificationError::Undecodable {
                review_id: review.id,
            });
        }

        let raw = self.polarity(&review.text);
        if !raw.is_finite() {
            return Err(ClassificationError::NonFinitePolarity {
                review_id: review.id,
            });
        }

        let polarity = raw.clamp(-1.0, 1.0);

        Ok(ClassifiedReview {
            review: review.clone(),
            label: self.thresholds().label_for(polarity),
            polarity,
        })
    }
}

/// Text is rejected if it carries the lossy-decoding marker or a NUL byte.
fn is_decodable(text: &str) -> bool {
    !text.contains('\u{FFFD}') && !text.contains('\0')
}

/// Available classifier implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Valence lexicon with negation and intensity rules (default).
    #[default]
    Lexicon,
    /// Positive/negative keyword counting.
    Keyword,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Lexicon => write!(f, "lexicon"),
            ClassifierKind::Keyword => write!(f, "keyword"),
        }
    }
}

/// Build the classifier selected by `kind`.
pub fn build_classifier(kind: ClassifierKind, thresholds: Thresholds) -> Box<dyn Classifier> {
    match kind {
        ClassifierKind::Lexicon => Box::new(LexiconClassifier::new(thresholds)),
        ClassifierKind::Keyword => Box::new(KeywordClassifier::new(thresholds)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct FixedScore(f64);

    impl Classifier for FixedScore {
        fn name(&self) -> &str {
            "fixed"
        }

        fn thresholds(&self) -> Thresholds {
            Thresholds::default()
        }

        fn polarity(&self, _text: &str) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_threshold_bands() {
        let t = Thresholds::default();
        assert_eq!(t.label_for(0.2), Sentiment::Positive);
        assert_eq!(t.label_for(0.19), Sentiment::Neutral);
        assert_eq!(t.label_for(0.0), Sentiment::Neutral);
        assert_eq!(t.label_for(-0.2), Sentiment::Negative);
        assert_eq!(t.label_for(-0.95), Sentiment::Negative);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(Thresholds::new(0.3, 0.2).is_err());
        assert!(Thresholds::new(0.2, 0.2).is_err());
        assert!(Thresholds::new(-1.5, 0.2).is_err());
        assert!(Thresholds::new(f64::NAN, 0.2).is_err());
        assert!(Thresholds::new(-0.05, 0.05).is_ok());
    }

    #[test]
    fn test_classify_rejects_undecodable_text() {
        let review = ReviewRecord::new(7, "bad bytes \u{FFFD} here");
        let err = FixedScore(0.5).classify(&review).unwrap_err();
        assert_eq!(err, ClassificationError::Undecodable { review_id: 7 });
    }

    #[test]
    fn test_classify_rejects_non_finite_polarity() {
        let review = ReviewRecord::new(1, "anything");
        let err = FixedScore(f64::NAN).classify(&review).unwrap_err();
        assert_eq!(err, ClassificationError::NonFinitePolarity { review_id: 1 });
    }

    #[test]
    fn test_classify_clamps_polarity() {
        let review = ReviewRecord::new(0, "anything");
        let classified = FixedScore(3.0).classify(&review).unwrap();
        assert_eq!(classified.polarity, 1.0);
        assert_eq!(classified.label, Sentiment::Positive);
        assert_eq!(classified.review, review);
    }

    #[test]
    fn test_build_classifier_names() {
        let t = Thresholds::default();
        assert_eq!(build_classifier(ClassifierKind::Lexicon, t).name(), "lexicon");
        assert_eq!(build_classifier(ClassifierKind::Keyword, t).name(), "keyword");
    }

    proptest! {
        /// Property: classifying the same text twice yields identical results,
        /// and the label always agrees with the printed polarity.
        #[test]
        fn classification_is_pure(text in "[a-zA-Z !,.']{1,80}") {
            for kind in [ClassifierKind::Lexicon, ClassifierKind::Keyword] {
                let classifier = build_classifier(kind, Thresholds::default());
                let review = ReviewRecord::new(0, text.clone());
                let first = classifier.classify(&review).unwrap();
                let second = classifier.classify(&review).unwrap();

                prop_assert_eq!(&first, &second);
                prop_assert!((-1.0..=1.0).contains(&first.polarity));
                prop_assert_eq!(first.label, Thresholds::default().label_for(first.polarity));
            }
        }
    }
}
