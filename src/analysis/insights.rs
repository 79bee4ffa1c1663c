//! Insight synthesis.
//!
//! Strengths come from the vocabulary of positive reviews, weaknesses from
//! negative reviews, suggestions from weaknesses. Terms are ranked by
//! frequency (ties broken by first appearance) and mapped to statements
//! through the [`RuleBook`]. Output is fully deterministic.

use super::aggregator::LabelGroups;
use super::rules::{default_rules, InsightRule, RuleBook};
use crate::error::InsufficientDataError;
use crate::models::{ClassifiedReview, Insights, Sentiment, SentimentDistribution};
use std::collections::{HashMap, HashSet};

/// Default number of reviews below which insights are withheld.
pub const MIN_REVIEWS_FOR_INSIGHTS: usize = 5;

/// Upper bound on strengths, weaknesses, and suggestions.
pub const MAX_INSIGHT_ITEMS: usize = 5;

/// Settings for the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    pub min_reviews: usize,
    pub max_items: usize,
    /// Occurrences needed before a term outside the rule table is reported.
    pub min_term_frequency: usize,
    pub rules: Vec<InsightRule>,
    pub extra_stopwords: Vec<String>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_reviews: MIN_REVIEWS_FOR_INSIGHTS,
            max_items: MAX_INSIGHT_ITEMS,
            min_term_frequency: 2,
            rules: default_rules(),
            extra_stopwords: Vec::new(),
        }
    }
}

/// Qualitative band for a positive percentage.
pub fn satisfaction_band(positive_pct: u32) -> &'static str {
    match positive_pct {
        80.. => "very high",
        60..=79 => "high",
        40..=59 => "mixed",
        _ => "low",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TermCount {
    term: String,
    count: usize,
    first_seen: usize,
}

/// A strength or weakness with the suggestion it implies.
#[derive(Debug, Clone)]
struct Finding {
    key: String,
    statement: String,
    suggestion: String,
}

#[derive(Clone, Copy)]
enum Polarity {
    Favorable,
    Unfavorable,
}

/// Derives [`Insights`] from aggregated reviews.
#[derive(Debug, Clone)]
pub struct InsightSynthesizer {
    min_reviews: usize,
    max_items: usize,
    min_term_frequency: usize,
    book: RuleBook,
}

impl Default for InsightSynthesizer {
    fn default() -> Self {
        Self::new(&InsightConfig::default())
    }
}

impl InsightSynthesizer {
    pub fn new(config: &InsightConfig) -> Self {
        Self {
            min_reviews: config.min_reviews,
            max_items: config.max_items.min(MAX_INSIGHT_ITEMS),
            min_term_frequency: config.min_term_frequency.max(1),
            book: RuleBook::new(config.rules.clone(), &config.extra_stopwords),
        }
    }

    /// Synthesize insights, or refuse when the batch is too small.
    ///
    /// An empty distribution is always too small, whatever `min_reviews` is.
    pub fn synthesize(
        &self,
        groups: &LabelGroups,
        distribution: &SentimentDistribution,
    ) -> Result<Insights, InsufficientDataError> {
        let required = self.min_reviews.max(1);
        if distribution.total < required {
            return Err(InsufficientDataError {
                total: distribution.total,
                required,
            });
        }

        let strengths = self.findings(groups.get(Sentiment::Positive), Polarity::Favorable);
        let weaknesses = self.findings(groups.get(Sentiment::Negative), Polarity::Unfavorable);

        let mut seen = HashSet::new();
        let suggestions: Vec<String> = weaknesses
            .iter()
            .filter(|w| seen.insert(w.suggestion.clone()))
            .map(|w| w.suggestion.clone())
            .take(self.max_items)
            .collect();

        let strengths: Vec<String> = strengths.into_iter().map(|f| f.statement).collect();
        let weaknesses: Vec<String> = weaknesses.into_iter().map(|f| f.statement).collect();

        Ok(Insights {
            competitive_advantage: strengths.first().cloned(),
            strengths,
            weaknesses,
            suggestions,
            summary: summary_sentence(distribution),
        })
    }

    /// Map the ranked vocabulary of `reviews` to at most `max_items` findings,
    /// one per category.
    fn findings(&self, reviews: &[ClassifiedReview], polarity: Polarity) -> Vec<Finding> {
        let mut seen = HashSet::new();
        let mut findings = Vec::new();

        for term in self.rank_terms(reviews) {
            if findings.len() >= self.max_items {
                break;
            }

            let finding = match self.book.rule_for(&term.term) {
                Some(rule) => Finding {
                    key: rule.category.clone(),
                    statement: match polarity {
                        Polarity::Favorable => rule.strength.clone(),
                        Polarity::Unfavorable => rule.weakness.clone(),
                    },
                    suggestion: rule.suggestion.clone(),
                },
                None if term.count >= self.min_term_frequency => generic_finding(&term.term, polarity),
                None => continue,
            };

            if seen.insert(finding.key.clone()) {
                findings.push(finding);
            }
        }

        findings
    }

    /// Non-stopword terms by descending frequency, ties by first appearance.
    fn rank_terms(&self, reviews: &[ClassifiedReview]) -> Vec<TermCount> {
        let mut counts: HashMap<String, TermCount> = HashMap::new();
        let mut position = 0;

        for review in reviews {
            for term in terms(&review.review.text) {
                if self.book.is_stopword(&term) {
                    continue;
                }
                counts
                    .entry(term.clone())
                    .or_insert_with(|| TermCount {
                        term,
                        count: 0,
                        first_seen: position,
                    })
                    .count += 1;
                position += 1;
            }
        }

        let mut ranked: Vec<TermCount> = counts.into_values().collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));
        ranked
    }
}

fn generic_finding(term: &str, polarity: Polarity) -> Finding {
    let statement = match polarity {
        Polarity::Favorable => format!("Customers frequently praise \"{}\"", term),
        Polarity::Unfavorable => format!("Customers repeatedly complain about \"{}\"", term),
    };

    Finding {
        key: format!("term:{}", term),
        statement,
        suggestion: format!("Investigate recurring complaints about \"{}\"", term),
    }
}

/// Lowercased candidate terms: at least three characters, not numbers, not
/// contractions.
fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| {
            w.chars().count() >= 3
                && !w.contains('\'')
                && !w.chars().all(|c| c.is_ascii_digit())
        })
}

fn summary_sentence(distribution: &SentimentDistribution) -> String {
    let positive = distribution.percentages().map(|p| p.positive).unwrap_or(0);
    let noun = if distribution.total == 1 { "review" } else { "reviews" };

    format!(
        "{}% of {} {} are positive, indicating {} customer satisfaction.",
        positive,
        distribution.total,
        noun,
        satisfaction_band(positive)
    )
}
