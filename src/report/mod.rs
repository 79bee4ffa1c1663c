//! Report rendering for finished batches.

pub mod generator;

pub use generator::{generate_csv_export, generate_json_report, generate_markdown_report};
