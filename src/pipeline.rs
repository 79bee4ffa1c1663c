//! Batch orchestration.
//!
//! Runs one batch through normalize → classify → aggregate → synthesize and
//! assembles the [`BatchResult`]. Each batch moves through
//! `Received → Normalized → Classified → Aggregated → Done`, or ends in
//! `Failed`. Nothing is retried here; a failed batch reports the step and
//! cause and produces no result.

use crate::analysis::{
    aggregate, aggregate_shards, average_rating, default_rules, Aggregation, InsightConfig,
    InsightRule, InsightSynthesizer, MAX_INSIGHT_ITEMS, MIN_REVIEWS_FOR_INSIGHTS,
};
use crate::classifier::{build_classifier, Classifier, ClassifierKind, Thresholds};
use crate::error::{BatchError, BatchStep, ClassificationError, StageError};
use crate::models::{BatchResult, ClassifiedReview, ReviewRecord};
use crate::normalizer::{normalize, NormalizerConfig, RawInput};
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Lifecycle state of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    Received,
    Normalized,
    Classified,
    Aggregated,
    Done,
    Failed,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchState::Done | BatchState::Failed)
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Received => write!(f, "RECEIVED"),
            BatchState::Normalized => write!(f, "NORMALIZED"),
            BatchState::Classified => write!(f, "CLASSIFIED"),
            BatchState::Aggregated => write!(f, "AGGREGATED"),
            BatchState::Done => write!(f, "DONE"),
            BatchState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Analysis settings shared read-only by every batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Polarity cutoffs `(negative, positive)`.
    pub thresholds: Thresholds,
    /// Batches smaller than this get no insights.
    pub min_reviews_for_insights: usize,
    /// Cap on strengths, weaknesses, and suggestions (at most 5).
    pub max_insight_items: usize,
    pub classifier: ClassifierKind,
    pub normalizer: NormalizerConfig,
    pub insight_rules: Vec<InsightRule>,
    pub extra_stopwords: Vec<String>,
    pub min_term_frequency: usize,
    /// Batch size from which classification is spread over worker threads.
    pub parallel_threshold: usize,
    /// Reviews per shard when classifying in parallel.
    pub shard_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            min_reviews_for_insights: MIN_REVIEWS_FOR_INSIGHTS,
            max_insight_items: MAX_INSIGHT_ITEMS,
            classifier: ClassifierKind::default(),
            normalizer: NormalizerConfig::default(),
            insight_rules: default_rules(),
            extra_stopwords: Vec::new(),
            min_term_frequency: 2,
            parallel_threshold: 512,
            shard_size: 256,
        }
    }
}

impl BatchConfig {
    pub fn insight_config(&self) -> InsightConfig {
        InsightConfig {
            min_reviews: self.min_reviews_for_insights,
            max_items: self.max_insight_items,
            min_term_frequency: self.min_term_frequency,
            rules: self.insight_rules.clone(),
            extra_stopwords: self.extra_stopwords.clone(),
        }
    }
}

/// A finished batch: the result plus the per-review classifications.
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub result: BatchResult,
    /// Classified reviews in batch order.
    pub reviews: Vec<ClassifiedReview>,
    /// States the batch passed through.
    pub states: Vec<BatchState>,
}

/// State bookkeeping for one batch.
struct BatchTracker {
    batch_id: Uuid,
    states: Vec<BatchState>,
}

impl BatchTracker {
    fn new(batch_id: Uuid) -> Self {
        debug!("Batch {} {}", batch_id, BatchState::Received);
        Self {
            batch_id,
            states: vec![BatchState::Received],
        }
    }

    fn advance(&mut self, next: BatchState) {
        debug!("Batch {} {}", self.batch_id, next);
        self.states.push(next);
    }

    fn fail(&mut self, stage: BatchStep, cause: impl Into<StageError>) -> BatchError {
        let err = BatchError::new(stage, cause);
        warn!("Batch {} {}: {}", self.batch_id, BatchState::Failed, err);
        self.states.push(BatchState::Failed);
        err
    }
}

/// Runs batches with a fixed configuration and classifier.
pub struct BatchProcessor {
    config: BatchConfig,
    classifier: Box<dyn Classifier>,
    synthesizer: InsightSynthesizer,
}

impl BatchProcessor {
    /// Processor using the classifier named in `config`.
    pub fn new(config: BatchConfig) -> Self {
        let classifier = build_classifier(config.classifier, config.thresholds);
        Self::with_classifier(config, classifier)
    }

    /// Processor using a caller-supplied classifier. Labels follow that
    /// classifier's own thresholds.
    pub fn with_classifier(config: BatchConfig, classifier: Box<dyn Classifier>) -> Self {
        let synthesizer = InsightSynthesizer::new(&config.insight_config());
        Self {
            config,
            classifier,
            synthesizer,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Run the full pipeline for one batch.
    pub fn run(&self, raw: &RawInput, source_name: &str) -> Result<BatchRun, BatchError> {
        let mut tracker = BatchTracker::new(Uuid::new_v4());
        let batch_id = tracker.batch_id;

        let records = normalize(raw, &self.config.normalizer)
            .map_err(|e| tracker.fail(BatchStep::Normalize, e))?;
        tracker.advance(BatchState::Normalized);

        let shards = self
            .classify(&records)
            .map_err(|e| tracker.fail(BatchStep::Classify, e))?;
        tracker.advance(BatchState::Classified);

        let aggregation = if shards.len() == 1 {
            aggregate(&shards[0])
        } else {
            let partials: Vec<Aggregation> = shards.par_iter().map(|s| aggregate(s)).collect();
            aggregate_shards(partials)
        };
        let reviews: Vec<ClassifiedReview> = shards.into_iter().flatten().collect();
        tracker.advance(BatchState::Aggregated);

        let insights = match self
            .synthesizer
            .synthesize(&aggregation.groups, &aggregation.distribution)
        {
            Ok(insights) => Some(insights),
            Err(e) => {
                info!("Insights withheld for batch {}: {}", batch_id, e);
                None
            }
        };

        let distribution = aggregation.distribution;
        let result = BatchResult {
            batch_id,
            source_name: source_name.to_string(),
            created_at: Utc::now(),
            classifier: self.classifier.name().to_string(),
            review_count: reviews.len(),
            distribution,
            percentages: distribution.percentages(),
            average_rating: average_rating(&reviews),
            insights,
        };
        tracker.advance(BatchState::Done);

        info!(
            "Batch {} ({}) done: {} reviews, {} positive / {} neutral / {} negative",
            batch_id,
            source_name,
            result.review_count,
            distribution.counts.positive,
            distribution.counts.neutral,
            distribution.counts.negative
        );

        Ok(BatchRun {
            result,
            reviews,
            states: tracker.states,
        })
    }

    /// Classify every review, returning shards in batch order.
    ///
    /// Small batches form a single shard classified on the calling thread.
    fn classify(
        &self,
        records: &[ReviewRecord],
    ) -> Result<Vec<Vec<ClassifiedReview>>, ClassificationError> {
        let classify_shard = |shard: &[ReviewRecord]| {
            shard
                .iter()
                .map(|r| self.classifier.classify(r))
                .collect::<Result<Vec<_>, _>>()
        };

        if records.len() < self.config.parallel_threshold {
            return Ok(vec![classify_shard(records)?]);
        }

        let shard_size = self.config.shard_size.max(1);
        debug!(
            "Classifying {} reviews in parallel, {} per shard",
            records.len(),
            shard_size
        );

        records.par_chunks(shard_size).map(classify_shard).collect()
    }
}

/// Run one batch and return only its result.
pub fn run_batch(
    raw: &RawInput,
    source_name: &str,
    config: &BatchConfig,
) -> Result<BatchResult, BatchError> {
    BatchProcessor::new(config.clone())
        .run(raw, source_name)
        .map(|run| run.result)
}
