//! Report generation.
//!
//! Renders a finished batch as Markdown, JSON, or a per-review CSV export.

use crate::analysis::{aggregate, label_means, most_polarized, LabelGroups};
use crate::models::{BatchResult, ClassifiedReview, Insights, Sentiment};
use anyhow::{Context, Result};
use serde::Serialize;

/// Reviews quoted per label in the notable reviews section.
const NOTABLE_REVIEWS: usize = 3;

/// Longest review excerpt quoted in Markdown, in characters.
const MAX_EXCERPT_CHARS: usize = 200;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(result: &BatchResult, reviews: &[ClassifiedReview]) -> String {
    let groups = aggregate(reviews).groups;
    let mut output = String::new();

    output.push_str("# Sentiment Analysis Report\n\n");
    output.push_str(&generate_metadata_section(result));
    output.push_str(&generate_distribution_section(result, &groups));
    output.push_str(&generate_insights_section(result));
    output.push_str(&generate_notable_section(&groups));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(result: &BatchResult) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", result.source_name));
    section.push_str(&format!("- **Batch ID:** `{}`\n", result.batch_id));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        result.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Classifier:** `{}`\n", result.classifier));
    section.push_str(&format!("- **Reviews:** {}\n", result.review_count));
    section.push_str(&format!(
        "- **Average Polarity:** {:+.3}\n",
        result.distribution.average_polarity
    ));
    if let Some(rating) = result.average_rating {
        section.push_str(&format!("- **Average Rating:** {:.2}\n", rating));
    }
    section.push('\n');

    section
}

/// Generate the distribution table.
fn generate_distribution_section(result: &BatchResult, groups: &LabelGroups) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Distribution\n\n");
    section.push_str("| Label | Reviews | Share | Mean Polarity |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");

    let means = label_means(groups);
    for label in Sentiment::ALL {
        let share = result
            .percentages
            .map(|p| format!("{}%", p.get(label)))
            .unwrap_or_else(|| "-".to_string());
        let mean = means
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, m)| format!("{:+.3}", m))
            .unwrap_or_else(|| "-".to_string());

        section.push_str(&format!(
            "| {} {} | {} | {} | {} |\n",
            label.emoji(),
            label,
            result.distribution.counts.get(label),
            share,
            mean
        ));
    }
    section.push_str(&format!(
        "| **Total** | **{}** | | |\n\n",
        result.distribution.total
    ));

    section
}

/// Generate the insights section, or a note when they were withheld.
fn generate_insights_section(result: &BatchResult) -> String {
    let mut section = String::new();

    section.push_str("## Insights\n\n");

    let insights = match &result.insights {
        Some(insights) => insights,
        None => {
            section.push_str(&format!(
                "*Not enough reviews to derive insights ({} analyzed).*\n\n",
                result.review_count
            ));
            return section;
        }
    };

    section.push_str(&format!("{}\n\n", insights.summary));
    if let Some(ref advantage) = insights.competitive_advantage {
        section.push_str(&format!("> 🏆 **Competitive advantage:** {}\n\n", advantage));
    }

    section.push_str(&generate_list("Strengths", &insights.strengths));
    section.push_str(&generate_list("Weaknesses", &insights.weaknesses));
    section.push_str(&generate_numbered_suggestions(insights));

    section
}

fn generate_list(title: &str, items: &[String]) -> String {
    let mut list = format!("### {}\n\n", title);

    if items.is_empty() {
        list.push_str("*None identified.*\n\n");
        return list;
    }

    for item in items {
        list.push_str(&format!("- {}\n", item));
    }
    list.push('\n');

    list
}

fn generate_numbered_suggestions(insights: &Insights) -> String {
    let mut list = String::from("### Suggestions\n\n");

    if insights.suggestions.is_empty() {
        list.push_str("*None identified.*\n\n");
        return list;
    }

    for (i, suggestion) in insights.suggestions.iter().enumerate() {
        list.push_str(&format!("{}. {}\n", i + 1, suggestion));
    }
    list.push('\n');

    list
}

/// Generate the most strongly worded positive and negative reviews.
fn generate_notable_section(groups: &LabelGroups) -> String {
    let mut section = String::new();

    let positive = most_polarized(groups, Sentiment::Positive, NOTABLE_REVIEWS);
    let negative = most_polarized(groups, Sentiment::Negative, NOTABLE_REVIEWS);
    if positive.is_empty() && negative.is_empty() {
        return section;
    }

    section.push_str("## Notable Reviews\n\n");
    for (label, reviews) in [(Sentiment::Positive, positive), (Sentiment::Negative, negative)] {
        if reviews.is_empty() {
            continue;
        }
        section.push_str(&format!("### {} Most {}\n\n", label.emoji(), label));
        for review in reviews {
            section.push_str(&format!(
                "> {} *({:+.3})*\n\n",
                excerpt(&review.review.text),
                review.polarity
            ));
        }
    }

    section
}

/// Single-line excerpt of a review, truncated on a character boundary.
fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_EXCERPT_CHARS {
        return flat;
    }

    let mut cut: String = flat.chars().take(MAX_EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by SentiScope v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a BatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    reviews: Option<&'a [ClassifiedReview]>,
}

/// Generate a JSON report: the batch result, plus per-review rows if given.
pub fn generate_json_report(
    result: &BatchResult,
    reviews: Option<&[ClassifiedReview]>,
) -> Result<String> {
    serde_json::to_string_pretty(&JsonReport { result, reviews }).map_err(Into::into)
}

/// Generate a CSV export with one row per review.
pub fn generate_csv_export(reviews: &[ClassifiedReview]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["id", "text", "rating", "label", "polarity"])?;
    for review in reviews {
        let rating = review
            .review
            .source_rating
            .map(|r| r.to_string())
            .unwrap_or_default();
        writer.write_record([
            review.review.id.to_string(),
            review.review.text.clone(),
            rating,
            review.label.as_str().to_string(),
            format!("{:.4}", review.polarity),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV export: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV export is not valid UTF-8")
}
