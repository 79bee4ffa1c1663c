//! Delimited table parsing.

use super::NormalizerConfig;
use crate::error::MalformedInputError;
use crate::models::ReviewRecord;
use csv::ReaderBuilder;
use tracing::{debug, info};

/// Parse a header-led table into review records.
pub(super) fn normalize_table(
    data: &[u8],
    delimiter: u8,
    config: &NormalizerConfig,
) -> Result<Vec<ReviewRecord>, MalformedInputError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| MalformedInputError::Table(e.to_string()))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| MalformedInputError::Table(e.to_string()))?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    debug!("Columns in table: {:?} ({} rows)", headers, rows.len());

    let text_index = find_text_column(&headers, &rows, config)?;
    let rating_index = find_column(&headers, &config.rating_columns);

    info!(
        "Using column '{}' as review text{}",
        headers[text_index],
        rating_index
            .map(|i| format!(", '{}' as rating", headers[i]))
            .unwrap_or_default()
    );

    let mut records = Vec::new();
    for row in &rows {
        let text = row.get(text_index).map(|s| s.trim()).unwrap_or("");
        if text.is_empty() {
            continue;
        }

        let mut record = ReviewRecord::new(records.len(), text);
        if let Some(rating) = rating_index.and_then(|i| parse_rating(row.get(i))) {
            record = record.with_rating(rating);
        }
        records.push(record);
    }

    Ok(records)
}

/// Locate the review-text column.
///
/// An explicit column wins; then known header names; then the first
/// non-numeric column whose cells are long enough on average to be prose.
fn find_text_column(
    headers: &[String],
    rows: &[Vec<String>],
    config: &NormalizerConfig,
) -> Result<usize, MalformedInputError> {
    if let Some(ref wanted) = config.text_column {
        return headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MalformedInputError::MissingColumn(wanted.clone()));
    }

    if let Some(index) = find_column(headers, &config.text_columns) {
        return Ok(index);
    }

    let min_len = config.min_average_text_length as f64;
    for index in 0..headers.len() {
        if is_numeric_column(rows, index) {
            continue;
        }
        if average_length(rows, index) > min_len {
            info!("No known text header, falling back to column '{}'", headers[index]);
            return Ok(index);
        }
    }

    Err(MalformedInputError::NoTextColumn {
        columns: headers.join(", "),
    })
}

/// First header matching any candidate, candidates taken in priority order.
fn find_column(headers: &[String], candidates: &[String]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(candidate))
    })
}

fn average_length(rows: &[Vec<String>], index: usize) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }

    let total: usize = rows
        .iter()
        .map(|row| row.get(index).map(|s| s.trim().chars().count()).unwrap_or(0))
        .sum();

    total as f64 / rows.len() as f64
}

fn is_numeric_column(rows: &[Vec<String>], index: usize) -> bool {
    let mut cells = rows
        .iter()
        .filter_map(|row| row.get(index))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .peekable();

    cells.peek().is_some() && cells.all(|s| s.parse::<f64>().is_ok())
}

fn parse_rating(cell: Option<&String>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite())
}
