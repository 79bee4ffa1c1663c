//! Data models for review sentiment analysis.
//!
//! This module contains the core data structures shared by every stage of
//! the pipeline: review records, their classifications, the aggregated
//! distribution, synthesized insights, and the final batch result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Source name used for batches submitted as inline text.
pub const INLINE_SOURCE: &str = "inline text";

/// Sentiment label derived from a polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// Unfavorable review
    Negative,
    /// Neither clearly favorable nor unfavorable
    Neutral,
    /// Favorable review
    Positive,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Positive => write!(f, "Positive"),
        }
    }
}

impl Sentiment {
    /// All labels, in report order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Returns an emoji representation of the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Positive => "🟢",
            Sentiment::Neutral => "🟡",
            Sentiment::Negative => "🔴",
        }
    }

    /// Lowercase name, as used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// A single review as produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Position of the review within its batch (0-based, after blank rows are dropped).
    pub id: usize,
    /// Review text, trimmed and non-empty.
    pub text: String,
    /// Star rating carried by the input table, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_rating: Option<f64>,
}

impl ReviewRecord {
    /// Creates a review without a rating.
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            source_rating: None,
        }
    }

    /// Attaches a source rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.source_rating = Some(rating);
        self
    }
}

/// A review together with its sentiment classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    #[serde(flatten)]
    pub review: ReviewRecord,
    /// Label derived from `polarity` via the classifier's thresholds.
    pub label: Sentiment,
    /// Polarity in [-1, 1].
    pub polarity: f64,
}

/// Number of reviews per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    /// Count for a single label.
    pub fn get(&self, label: Sentiment) -> usize {
        match label {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub(crate) fn increment(&mut self, label: Sentiment) {
        match label {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    /// Sum across all labels.
    pub fn sum(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Rounded percentage per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl Percentages {
    /// Percentage for a single label.
    pub fn get(&self, label: Sentiment) -> u32 {
        match label {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    /// Sum of all three percentages. Within 100 ± 1 due to rounding.
    pub fn sum(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }
}

/// Label counts and mean polarity for a batch (or a shard of one).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    /// Reviews per label.
    pub counts: SentimentCounts,
    /// Total number of reviews; always equal to `counts.sum()`.
    pub total: usize,
    /// Mean polarity over all reviews, 0 when empty.
    pub average_polarity: f64,
}

impl SentimentDistribution {
    /// The distribution of a batch with no reviews.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the distribution covers no reviews.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Rounded percentages, or `None` for an empty distribution.
    pub fn percentages(&self) -> Option<Percentages> {
        if self.is_empty() {
            return None;
        }

        let pct = |count: usize| (100.0 * count as f64 / self.total as f64).round() as u32;

        Some(Percentages {
            positive: pct(self.counts.positive),
            neutral: pct(self.counts.neutral),
            negative: pct(self.counts.negative),
        })
    }

    /// Combine two partial distributions.
    ///
    /// Counts add; the mean is weighted by each side's total.
    pub fn merge(&self, other: &SentimentDistribution) -> SentimentDistribution {
        let total = self.total + other.total;
        let average_polarity = if total == 0 {
            0.0
        } else {
            let weight = other.total as f64 / total as f64;
            self.average_polarity + (other.average_polarity - self.average_polarity) * weight
        };

        SentimentDistribution {
            counts: SentimentCounts {
                positive: self.counts.positive + other.counts.positive,
                neutral: self.counts.neutral + other.counts.neutral,
                negative: self.counts.negative + other.counts.negative,
            },
            total,
            average_polarity,
        }
    }
}

/// Human-readable findings derived from a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    /// What customers praise, strongest first.
    pub strengths: Vec<String>,
    /// What customers complain about, most frequent first.
    pub weaknesses: Vec<String>,
    /// One improvement action per weakness category.
    pub suggestions: Vec<String>,
    /// A single sentence describing overall satisfaction.
    pub summary: String,
    /// The leading strength, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitive_advantage: Option<String>,
}

/// The result of analyzing one batch of reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Unique identifier generated when the batch was received.
    pub batch_id: Uuid,
    /// Uploaded file name, or "inline text".
    pub source_name: String,
    /// When the batch finished.
    pub created_at: DateTime<Utc>,
    /// Name of the classifier that labelled the reviews.
    pub classifier: String,
    /// Number of reviews in the batch.
    pub review_count: usize,
    /// Label distribution and mean polarity.
    pub distribution: SentimentDistribution,
    /// Pre-rounded percentages for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentages: Option<Percentages>,
    /// Mean of the source ratings present in the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Synthesized insights; `None` when the batch was too small.
    pub insights: Option<Insights>,
}

impl BatchResult {
    /// Positive share of the batch, 0 when empty.
    pub fn positive_percentage(&self) -> u32 {
        self.percentages.map(|p| p.positive).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distribution(positive: usize, neutral: usize, negative: usize, avg: f64) -> SentimentDistribution {
        SentimentDistribution {
            counts: SentimentCounts {
                positive,
                neutral,
                negative,
            },
            total: positive + neutral + negative,
            average_polarity: avg,
        }
    }

    #[test]
    fn test_sentiment_ordering() {
        assert!(Sentiment::Negative < Sentiment::Neutral);
        assert!(Sentiment::Neutral < Sentiment::Positive);
    }

    #[test]
    fn test_sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Positive).unwrap();
        assert_eq!(json, "\"positive\"");
        assert_eq!(Sentiment::Negative.as_str(), "negative");
        assert_eq!(Sentiment::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn test_percentages_thirds() {
        let dist = distribution(1, 1, 1, 0.0);
        let pct = dist.percentages().unwrap();
        assert_eq!(pct.positive, 33);
        assert_eq!(pct.sum(), 99);
    }

    #[test]
    fn test_percentages_round_up_case() {
        // 1/6 = 16.67 → 17, 5/6 = 83.3 → 83
        let dist = distribution(1, 0, 5, 0.0);
        let pct = dist.percentages().unwrap();
        assert_eq!(pct.positive, 17);
        assert_eq!(pct.negative, 83);
        assert_eq!(pct.sum(), 100);
    }

    #[test]
    fn test_empty_distribution_has_no_percentages() {
        let dist = SentimentDistribution::empty();
        assert!(dist.is_empty());
        assert!(dist.percentages().is_none());
    }

    #[test]
    fn test_merge_weights_by_total() {
        let a = distribution(3, 0, 0, 0.6);
        let b = distribution(0, 0, 1, -0.2);
        let merged = a.merge(&b);

        assert_eq!(merged.total, 4);
        assert_eq!(merged.counts.positive, 3);
        assert_eq!(merged.counts.negative, 1);
        assert!((merged.average_polarity - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_merge_with_empty() {
        let a = distribution(2, 1, 0, 0.5);
        assert_eq!(a.merge(&SentimentDistribution::empty()), a);
        assert_eq!(SentimentDistribution::empty().merge(&a), a);
    }

    #[test]
    fn test_classified_review_json_is_flat() {
        let review = ClassifiedReview {
            review: ReviewRecord::new(0, "Nice").with_rating(4.0),
            label: Sentiment::Positive,
            polarity: 0.42,
        };
        let value = serde_json::to_value(&review).unwrap();
        assert_eq!(value["text"], "Nice");
        assert_eq!(value["source_rating"], 4.0);
        assert_eq!(value["label"], "positive");
    }
}
