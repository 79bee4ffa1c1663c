//! Review ingestion and normalization.
//!
//! Turns raw uploads (CSV/TSV tables or free text) into a uniform sequence
//! of [`ReviewRecord`]s. Blank rows are dropped and never counted.

mod table;

use crate::error::MalformedInputError;
use crate::models::ReviewRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Raw input for one batch.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// A delimited table with a header row.
    Table { data: Vec<u8>, delimiter: u8 },
    /// A free-text block, one review per delimited segment.
    Text(String),
}

impl RawInput {
    /// A comma-separated table.
    pub fn csv(data: impl Into<Vec<u8>>) -> Self {
        RawInput::Table {
            data: data.into(),
            delimiter: b',',
        }
    }

    /// A tab-separated table.
    pub fn tsv(data: impl Into<Vec<u8>>) -> Self {
        RawInput::Table {
            data: data.into(),
            delimiter: b'\t',
        }
    }

    /// A free-text block.
    pub fn text(text: impl Into<String>) -> Self {
        RawInput::Text(text.into())
    }

    /// Pick the input kind from a file's extension.
    ///
    /// `csv` and `tsv` files are tables; anything else is free text, decoded
    /// lossily so undecodable bytes surface later as classification errors.
    pub fn from_file(path: &Path, data: Vec<u8>) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => RawInput::csv(data),
            "tsv" => RawInput::tsv(data),
            _ => RawInput::Text(String::from_utf8_lossy(&data).into_owned()),
        }
    }

    /// Short description of the input kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RawInput::Table { delimiter: b'\t', .. } => "tsv",
            RawInput::Table { .. } => "csv",
            RawInput::Text(_) => "text",
        }
    }
}

/// Settings controlling how raw input is split into reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Separator between reviews in free text.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Column to read review text from, overriding detection.
    #[serde(default)]
    pub text_column: Option<String>,

    /// Header names recognized as review text, in priority order.
    #[serde(default = "default_text_columns")]
    pub text_columns: Vec<String>,

    /// Header names recognized as star ratings, in priority order.
    #[serde(default = "default_rating_columns")]
    pub rating_columns: Vec<String>,

    /// Average cell length above which an unrecognized column counts as text.
    #[serde(default = "default_min_average_text_length")]
    pub min_average_text_length: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            text_column: None,
            text_columns: default_text_columns(),
            rating_columns: default_rating_columns(),
            min_average_text_length: default_min_average_text_length(),
        }
    }
}

fn default_delimiter() -> String {
    "\n".to_string()
}

fn default_text_columns() -> Vec<String> {
    vec!["text", "review_text", "comment", "feedback", "review"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_rating_columns() -> Vec<String> {
    vec!["rating", "stars", "score"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_min_average_text_length() -> usize {
    10
}

/// Normalize raw input into review records.
pub fn normalize(
    raw: &RawInput,
    config: &NormalizerConfig,
) -> Result<Vec<ReviewRecord>, MalformedInputError> {
    let records = match raw {
        RawInput::Table { data, delimiter } => table::normalize_table(data, *delimiter, config)?,
        RawInput::Text(text) => normalize_text(text, &config.delimiter),
    };

    if records.is_empty() {
        return Err(MalformedInputError::Empty);
    }

    debug!("Normalized {} input into {} reviews", raw.kind(), records.len());
    Ok(records)
}

/// Split a free-text block on `delimiter`, dropping blank segments.
fn normalize_text(text: &str, delimiter: &str) -> Vec<ReviewRecord> {
    let delimiter = if delimiter.is_empty() { "\n" } else { delimiter };

    text.split(delimiter)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(id, segment)| ReviewRecord::new(id, segment))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_lines_become_reviews() {
        let raw = RawInput::text("Great quality\n\n   \nPackaging was bad\r\n");
        let records = normalize(&raw, &NormalizerConfig::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], ReviewRecord::new(0, "Great quality"));
        assert_eq!(records[1], ReviewRecord::new(1, "Packaging was bad"));
    }

    #[test]
    fn test_custom_delimiter_splits_paragraphs() {
        let config = NormalizerConfig {
            delimiter: "\n\n".to_string(),
            ..NormalizerConfig::default()
        };
        let raw = RawInput::text("First review\nspans two lines\n\nSecond review");
        let records = normalize(&raw, &config).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "First review\nspans two lines");
    }

    #[test]
    fn test_all_blank_text_is_malformed() {
        let raw = RawInput::text("  \n\n\t\n");
        let err = normalize(&raw, &NormalizerConfig::default()).unwrap_err();
        assert_eq!(err, MalformedInputError::Empty);
    }

    #[test]
    fn test_from_file_picks_kind_by_extension() {
        let csv = RawInput::from_file(Path::new("reviews.CSV"), b"text\nok".to_vec());
        assert_eq!(csv.kind(), "csv");

        let tsv = RawInput::from_file(Path::new("reviews.tsv"), b"text\nok".to_vec());
        assert_eq!(tsv.kind(), "tsv");

        let txt = RawInput::from_file(Path::new("reviews.txt"), b"fine".to_vec());
        assert_eq!(txt, RawInput::text("fine"));
    }

    #[test]
    fn test_from_file_decodes_invalid_bytes_lossily() {
        let raw = RawInput::from_file(Path::new("notes"), vec![b'o', b'k', 0xff]);
        match raw {
            RawInput::Text(text) => assert!(text.contains('\u{FFFD}')),
            other => panic!("expected text input, got {:?}", other),
        }
    }

    #[test]
    fn test_fixture_text_file() {
        let raw = RawInput::text(include_str!("../../fixtures/reviews.txt"));
        let records = normalize(&raw, &NormalizerConfig::default()).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[2].text, "It's okay, nothing special");
    }
}
