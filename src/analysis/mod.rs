//! Analysis modules.
//!
//! Aggregation of classified reviews and synthesis of insights from the
//! aggregated groups.

pub mod aggregator;
pub mod insights;
pub mod rules;

pub use aggregator::*;
pub use insights::{InsightConfig, InsightSynthesizer, MAX_INSIGHT_ITEMS, MIN_REVIEWS_FOR_INSIGHTS};
pub use rules::{default_rules, InsightRule, RuleBook};
