//! Keyword-counting scorer.
//!
//! Counts favorable and unfavorable keywords appearing anywhere in the
//! lowercased text. Each net keyword moves the polarity by 0.2, so a single
//! keyword is enough to cross the default thresholds.

use super::{Classifier, Thresholds};

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "love",
    "best",
    "perfect",
    "recommend",
    "happy",
    "satisfied",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "poor",
    "terrible",
    "awful",
    "hate",
    "worst",
    "disappointed",
    "waste",
    "unhappy",
    "broken",
];

/// Net keywords needed to reach full polarity.
const SATURATION: f64 = 5.0;

/// Keyword classifier.
pub struct KeywordClassifier {
    thresholds: Thresholds,
}

impl KeywordClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }
}

impl Classifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();

        ((positive as f64 - negative as f64) / SATURATION).clamp(-1.0, 1.0)
    }
}
