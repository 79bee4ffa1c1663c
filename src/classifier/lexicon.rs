//! Rule-based valence lexicon scorer.
//!
//! Each known word carries a valence on a -4..4 scale. Word scores are
//! adjusted for intensity and negation, summed, and squashed into [-1, 1]
//! with `s / sqrt(s² + ALPHA)`.

use super::{Classifier, Thresholds};
use std::collections::{HashMap, HashSet};

/// Normalization constant for the squashing function.
const ALPHA: f64 = 15.0;

/// Added to a word's magnitude by a preceding booster, removed by a dampener.
const BOOSTER_INCREMENT: f64 = 0.293;

/// Added to the magnitude of an ALL-CAPS word in otherwise mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;

/// Scale applied to a negated word.
const NEGATION_SCALAR: f64 = -0.74;

/// How many preceding tokens can negate a word.
const NEGATION_WINDOW: usize = 3;

/// Emphasis per exclamation mark, counted up to `MAX_EXCLAMATIONS`.
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

/// Word valences.
const VALENCES: &[(&str, f64)] = &[
    // favorable
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("comfortable", 1.5),
    ("cool", 1.3),
    ("decent", 1.0),
    ("delighted", 2.8),
    ("easy", 1.9),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 3.2),
    ("fantastic", 2.6),
    ("fine", 0.8),
    ("friendly", 2.2),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressed", 2.1),
    ("impressive", 2.3),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("loves", 2.7),
    ("nice", 1.8),
    ("ok", 0.6),
    ("okay", 0.6),
    ("outstanding", 3.0),
    ("perfect", 2.7),
    ("perfectly", 3.2),
    ("pleased", 1.9),
    ("recommend", 1.5),
    ("recommended", 1.5),
    ("reliable", 1.9),
    ("satisfied", 1.8),
    ("smooth", 1.0),
    ("solid", 1.2),
    ("special", 1.7),
    ("sturdy", 1.4),
    ("superb", 3.1),
    ("thanks", 1.9),
    ("worth", 0.9),
    ("wonderful", 2.7),
    // unfavorable
    ("angry", -2.3),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("broke", -1.8),
    ("broken", -2.0),
    ("complicated", -1.2),
    ("confusing", -1.5),
    ("damaged", -2.0),
    ("defective", -2.2),
    ("difficult", -1.5),
    ("dirty", -1.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("expensive", -0.9),
    ("fail", -2.2),
    ("failed", -2.3),
    ("fails", -1.8),
    ("faulty", -1.8),
    ("flimsy", -1.6),
    ("frustrated", -1.9),
    ("frustrating", -2.0),
    ("garbage", -2.3),
    ("hate", -2.7),
    ("hated", -3.2),
    ("horrible", -2.5),
    ("issue", -0.9),
    ("issues", -0.9),
    ("junk", -1.9),
    ("lacking", -1.1),
    ("late", -1.0),
    ("mediocre", -1.0),
    ("missing", -1.2),
    ("noisy", -1.2),
    ("overpriced", -1.8),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("regret", -1.9),
    ("rude", -2.0),
    ("sad", -2.1),
    ("scam", -2.6),
    ("slow", -1.0),
    ("terrible", -2.5),
    ("ugly", -2.3),
    ("unacceptable", -2.0),
    ("uncomfortable", -1.6),
    ("unhappy", -1.8),
    ("unreliable", -1.9),
    ("useless", -1.8),
    ("waste", -1.8),
    ("wasted", -2.2),
    ("worse", -2.1),
    ("worst", -3.1),
];

const BOOSTERS: &[&str] = &[
    "absolutely",
    "amazingly",
    "completely",
    "especially",
    "exceptionally",
    "extremely",
    "fully",
    "greatly",
    "highly",
    "incredibly",
    "particularly",
    "really",
    "remarkably",
    "so",
    "super",
    "thoroughly",
    "totally",
    "truly",
    "very",
];

const DAMPENERS: &[&str] = &[
    "almost",
    "barely",
    "hardly",
    "kinda",
    "marginally",
    "partly",
    "scarcely",
    "slightly",
    "somewhat",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "none", "nobody", "nowhere", "neither", "nor", "without",
    "cannot", "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "cant", "wont",
    "wouldnt", "shouldnt", "couldnt", "aint",
];

/// Valence-lexicon classifier.
pub struct LexiconClassifier {
    thresholds: Thresholds,
    valences: HashMap<&'static str, f64>,
    boosters: HashSet<&'static str>,
    dampeners: HashSet<&'static str>,
    negators: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            valences: VALENCES.iter().copied().collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            dampeners: DAMPENERS.iter().copied().collect(),
            negators: NEGATORS.iter().copied().collect(),
        }
    }

    fn is_negator(&self, token: &str) -> bool {
        self.negators.contains(token) || token.ends_with("n't")
    }

    /// Score of the word at `index`, or `None` if it carries no valence.
    fn word_score(&self, tokens: &[Token], index: usize, emphasize_caps: bool) -> Option<f64> {
        let token = &tokens[index];
        let mut score = *self.valences.get(token.lower.as_str())?;

        if emphasize_caps && token.is_caps {
            score += CAPS_INCREMENT * score.signum();
        }

        if let Some(prev) = index.checked_sub(1).map(|i| tokens[i].lower.as_str()) {
            if self.boosters.contains(prev) {
                score += BOOSTER_INCREMENT * score.signum();
            } else if self.dampeners.contains(prev) {
                score -= BOOSTER_INCREMENT * score.signum();
            }
        }

        let window_start = index.saturating_sub(NEGATION_WINDOW);
        if tokens[window_start..index]
            .iter()
            .any(|t| self.is_negator(&t.lower))
        {
            score *= NEGATION_SCALAR;
        }

        Some(score)
    }
}

impl Classifier for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    fn polarity(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        // Capitals only signal emphasis when the rest of the text is not shouted.
        let emphasize_caps = tokens.iter().any(|t| t.is_caps) && !tokens.iter().all(|t| t.is_caps);

        let contrast = tokens.iter().position(|t| t.lower == "but");

        let mut sum = 0.0;
        for index in 0..tokens.len() {
            let Some(mut score) = self.word_score(&tokens, index, emphasize_caps) else {
                continue;
            };

            match contrast {
                Some(c) if index < c => score *= 0.5,
                Some(c) if index > c => score *= 1.5,
                _ => {}
            }

            sum += score;
        }

        if sum != 0.0 {
            let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += exclamations as f64 * EXCLAMATION_INCREMENT * sum.signum();
        }

        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

struct Token {
    lower: String,
    is_caps: bool,
}

/// Whitespace tokens with surrounding punctuation stripped.
fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .map(|word| word.trim_matches('\''))
        .filter(|word| !word.is_empty())
        .map(|word| Token {
            lower: word.to_lowercase(),
            is_caps: word.chars().count() > 1
                && word.chars().any(char::is_alphabetic)
                && !word.chars().any(char::is_lowercase),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewRecord, Sentiment};

    fn classifier() -> LexiconClassifier {
        LexiconClassifier::new(Thresholds::default())
    }

    fn label(text: &str) -> Sentiment {
        classifier()
            .classify(&ReviewRecord::new(0, text))
            .unwrap()
            .label
    }

    #[test]
    fn test_positive_sentiment() {
        let text = "I absolutely love this product! It's amazing and works perfectly.";
        let polarity = classifier().polarity(text);
        assert!(polarity > 0.5, "polarity was {}", polarity);
        assert_eq!(label(text), Sentiment::Positive);
    }

    #[test]
    fn test_negative_sentiment() {
        let text = "This is terrible. I hate it and it doesn't work at all.";
        assert!(classifier().polarity(text) < -0.5);
        assert_eq!(label(text), Sentiment::Negative);
    }

    #[test]
    fn test_neutral_sentiment() {
        assert_eq!(label("This product is okay. It works as expected."), Sentiment::Neutral);
    }

    #[test]
    fn test_no_signal_is_exactly_neutral() {
        assert_eq!(classifier().polarity("The box contains a lamp and a cable"), 0.0);
        assert_eq!(classifier().polarity("!!!"), 0.0);
    }

    #[test]
    fn test_negation_flips_sign() {
        let c = classifier();
        assert!(c.polarity("good") > 0.0);
        assert!(c.polarity("not good") < 0.0);
        assert!(c.polarity("it isn't very good") < 0.0);
        assert!(c.polarity("no problems at all") > 0.0);
    }

    #[test]
    fn test_booster_and_dampener() {
        let c = classifier();
        let plain = c.polarity("good");
        assert!(c.polarity("very good") > plain);
        assert!(c.polarity("slightly good") < plain);
    }

    #[test]
    fn test_contrast_weights_the_second_clause() {
        let c = classifier();
        assert!(c.polarity("The lamp is good but the cable is terrible") < 0.0);
    }

    #[test]
    fn test_emphasis() {
        let c = classifier();
        assert!(c.polarity("good!!") > c.polarity("good"));
        assert!(c.polarity("it is GOOD") > c.polarity("it is good"));
        // Shouting the whole text is not emphasis.
        assert_eq!(c.polarity("IT IS GOOD"), c.polarity("it is good"));
    }

    #[test]
    fn test_example_batch_labels() {
        let expected = [
            ("Great quality and fast delivery", Sentiment::Positive),
            ("Terrible packaging, arrived broken", Sentiment::Negative),
            ("It's okay, nothing special", Sentiment::Neutral),
            ("Excellent service, highly recommend", Sentiment::Positive),
            ("Packaging was bad again", Sentiment::Negative),
        ];

        for (text, sentiment) in expected {
            assert_eq!(label(text), sentiment, "text: {}", text);
        }
    }
}
