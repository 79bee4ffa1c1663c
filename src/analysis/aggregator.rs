//! Sentiment aggregation and statistics.
//!
//! This module reduces classified reviews into a [`SentimentDistribution`]
//! and per-label groupings, and provides the statistics reports draw on.

use crate::models::{ClassifiedReview, Sentiment, SentimentCounts, SentimentDistribution};
use serde::Serialize;

/// Classified reviews grouped by label, each group in batch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelGroups {
    positive: Vec<ClassifiedReview>,
    neutral: Vec<ClassifiedReview>,
    negative: Vec<ClassifiedReview>,
}

impl LabelGroups {
    /// Reviews with the given label.
    pub fn get(&self, label: Sentiment) -> &[ClassifiedReview] {
        match label {
            Sentiment::Positive => &self.positive,
            Sentiment::Neutral => &self.neutral,
            Sentiment::Negative => &self.negative,
        }
    }

    fn push(&mut self, review: ClassifiedReview) {
        match review.label {
            Sentiment::Positive => self.positive.push(review),
            Sentiment::Neutral => self.neutral.push(review),
            Sentiment::Negative => self.negative.push(review),
        }
    }

    /// Append another grouping after this one.
    pub fn extend(&mut self, other: LabelGroups) {
        self.positive.extend(other.positive);
        self.neutral.extend(other.neutral);
        self.negative.extend(other.negative);
    }

    /// Total number of grouped reviews.
    pub fn len(&self) -> usize {
        self.positive.len() + self.neutral.len() + self.negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(label, reviews)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, &[ClassifiedReview])> {
        Sentiment::ALL.into_iter().map(move |label| (label, self.get(label)))
    }
}

/// Output of aggregating a batch or a shard of one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub distribution: SentimentDistribution,
    pub groups: LabelGroups,
}

impl Aggregation {
    /// Combine with the aggregation of the following shard.
    pub fn merge(mut self, other: Aggregation) -> Aggregation {
        self.distribution = self.distribution.merge(&other.distribution);
        self.groups.extend(other.groups);
        self
    }
}

/// Aggregate classified reviews in a single pass.
///
/// The mean polarity is maintained as a running mean so it stays accurate
/// for large batches.
pub fn aggregate(classified: &[ClassifiedReview]) -> Aggregation {
    let mut counts = SentimentCounts::default();
    let mut groups = LabelGroups::default();
    let mut mean = 0.0;

    for (seen, review) in classified.iter().enumerate() {
        counts.increment(review.label);
        mean += (review.polarity - mean) / (seen + 1) as f64;
        groups.push(review.clone());
    }

    Aggregation {
        distribution: SentimentDistribution {
            counts,
            total: counts.sum(),
            average_polarity: mean,
        },
        groups,
    }
}

/// Combine shard aggregations, in shard order.
pub fn aggregate_shards(shards: impl IntoIterator<Item = Aggregation>) -> Aggregation {
    shards
        .into_iter()
        .fold(Aggregation::default(), Aggregation::merge)
}

/// Mean of the source ratings that are present.
pub fn average_rating(reviews: &[ClassifiedReview]) -> Option<f64> {
    let ratings: Vec<f64> = reviews
        .iter()
        .filter_map(|r| r.review.source_rating)
        .collect();

    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}

/// The `n` reviews of a label with the strongest polarity.
///
/// Ties keep batch order.
pub fn most_polarized(groups: &LabelGroups, label: Sentiment, n: usize) -> Vec<&ClassifiedReview> {
    let mut reviews: Vec<&ClassifiedReview> = groups.get(label).iter().collect();
    reviews.sort_by(|a, b| {
        b.polarity
            .abs()
            .partial_cmp(&a.polarity.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    reviews.truncate(n);
    reviews
}

/// Mean polarity per label, for labels that have reviews.
pub fn label_means(groups: &LabelGroups) -> Vec<(Sentiment, f64)> {
    groups
        .iter()
        .filter(|(_, reviews)| !reviews.is_empty())
        .map(|(label, reviews)| {
            let mean = reviews.iter().map(|r| r.polarity).sum::<f64>() / reviews.len() as f64;
            (label, mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewRecord;
    use proptest::prelude::*;

    fn create_test_review(id: usize, label: Sentiment, polarity: f64) -> ClassifiedReview {
        ClassifiedReview {
            review: ReviewRecord::new(id, format!("review {}", id)),
            label,
            polarity,
        }
    }

    fn label_for(polarity: f64) -> Sentiment {
        crate::classifier::Thresholds::default().label_for(polarity)
    }

    fn reviews_from(polarities: &[f64]) -> Vec<ClassifiedReview> {
        polarities
            .iter()
            .enumerate()
            .map(|(i, &p)| create_test_review(i, label_for(p), p))
            .collect()
    }

    #[test]
    fn test_aggregate_counts_and_mean() {
        let reviews = reviews_from(&[0.8, 0.5, 0.0, -0.6, -0.3]);
        let agg = aggregate(&reviews);

        assert_eq!(agg.distribution.total, 5);
        assert_eq!(agg.distribution.counts.positive, 2);
        assert_eq!(agg.distribution.counts.neutral, 1);
        assert_eq!(agg.distribution.counts.negative, 2);
        assert!((agg.distribution.average_polarity - 0.08).abs() < 1e-12);
        assert_eq!(agg.groups.len(), 5);
    }

    #[test]
    fn test_groups_keep_batch_order() {
        let reviews = reviews_from(&[0.9, -0.9, 0.4, -0.5]);
        let agg = aggregate(&reviews);

        let positive_ids: Vec<usize> = agg
            .groups
            .get(Sentiment::Positive)
            .iter()
            .map(|r| r.review.id)
            .collect();
        assert_eq!(positive_ids, vec![0, 2]);
    }

    #[test]
    fn test_aggregate_empty() {
        let agg = aggregate(&[]);
        assert_eq!(agg.distribution, SentimentDistribution::empty());
        assert_eq!(agg.distribution.average_polarity, 0.0);
        assert!(agg.groups.is_empty());
    }

    #[test]
    fn test_average_rating() {
        let mut reviews = reviews_from(&[0.5, 0.1, -0.4]);
        reviews[0].review.source_rating = Some(5.0);
        reviews[2].review.source_rating = Some(2.0);
        assert_eq!(average_rating(&reviews), Some(3.5));
        assert_eq!(average_rating(&reviews_from(&[0.5])), None);
    }

    #[test]
    fn test_most_polarized() {
        let reviews = reviews_from(&[0.3, 0.9, 0.6, -0.7]);
        let agg = aggregate(&reviews);
        let top = most_polarized(&agg.groups, Sentiment::Positive, 2);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].review.id, 1);
        assert_eq!(top[1].review.id, 2);
    }

    #[test]
    fn test_label_means_skip_empty_labels() {
        let reviews = reviews_from(&[0.4, 0.8]);
        let means = label_means(&aggregate(&reviews).groups);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].0, Sentiment::Positive);
        assert!((means[0].1 - 0.6).abs() < 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: counts always add up to the batch size.
        #[test]
        fn counts_sum_to_total(polarities in prop::collection::vec(-1.0f64..=1.0, 0..200)) {
            let agg = aggregate(&reviews_from(&polarities));
            let d = agg.distribution;
            prop_assert_eq!(d.counts.positive + d.counts.neutral + d.counts.negative, d.total);
            prop_assert_eq!(d.total, polarities.len());
        }

        /// Property: rounded percentages sum to 100 ± 1, or are absent when empty.
        #[test]
        fn percentages_sum_to_hundred(polarities in prop::collection::vec(-1.0f64..=1.0, 0..200)) {
            let d = aggregate(&reviews_from(&polarities)).distribution;
            match d.percentages() {
                Some(p) => prop_assert!((99..=101).contains(&p.sum())),
                None => prop_assert_eq!(d.total, 0),
            }
        }

        /// Property: aggregation does not depend on review order.
        #[test]
        fn aggregation_is_order_independent(polarities in prop::collection::vec(-1.0f64..=1.0, 0..200)) {
            let forward = reviews_from(&polarities);
            let mut reversed = forward.clone();
            reversed.reverse();

            let a = aggregate(&forward).distribution;
            let b = aggregate(&reversed).distribution;
            prop_assert_eq!(a.counts, b.counts);
            prop_assert!((a.average_polarity - b.average_polarity).abs() < 1e-9);
        }

        /// Property: aggregating shards and merging equals aggregating the whole.
        #[test]
        fn sharded_aggregation_matches_direct(
            polarities in prop::collection::vec(-1.0f64..=1.0, 0..200),
            shard_size in 1usize..40,
        ) {
            let reviews = reviews_from(&polarities);
            let direct = aggregate(&reviews);
            let sharded = aggregate_shards(reviews.chunks(shard_size).map(aggregate));

            prop_assert_eq!(direct.distribution.counts, sharded.distribution.counts);
            prop_assert_eq!(direct.distribution.total, sharded.distribution.total);
            prop_assert!(
                (direct.distribution.average_polarity - sharded.distribution.average_polarity).abs() < 1e-9
            );
            prop_assert_eq!(direct.groups, sharded.groups);
        }
    }
}
