//! Configuration file handling.
//!
//! This module handles loading and validating configuration from
//! `.sentiscope.toml` files.

use crate::analysis::{default_rules, InsightRule, MAX_INSIGHT_ITEMS, MIN_REVIEWS_FOR_INSIGHTS};
use crate::classifier::{
    ClassifierKind, Thresholds, DEFAULT_NEGATIVE_THRESHOLD, DEFAULT_POSITIVE_THRESHOLD,
};
use crate::error::ConfigError;
use crate::normalizer::NormalizerConfig;
use crate::pipeline::BatchConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".sentiscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Input normalization settings.
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    /// Insight synthesis settings.
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Scanner settings for directory input.
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report path for a single input file or inline text.
    #[serde(default = "default_output")]
    pub output: String,

    /// Directory receiving one report per file in directory mode.
    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Number of files processed at once in directory mode.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            report_dir: default_report_dir(),
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_output() -> String {
    "sentiment_report.md".to_string()
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_concurrency() -> usize {
    4
}

/// Classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Which classifier scores the reviews.
    #[serde(default)]
    pub kind: ClassifierKind,

    /// Polarity at or below which a review is negative.
    #[serde(default = "default_negative_threshold")]
    pub negative_threshold: f64,

    /// Polarity at or above which a review is positive.
    #[serde(default = "default_positive_threshold")]
    pub positive_threshold: f64,

    /// Batch size from which classification runs on worker threads.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Reviews per worker shard.
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::default(),
            negative_threshold: default_negative_threshold(),
            positive_threshold: default_positive_threshold(),
            parallel_threshold: default_parallel_threshold(),
            shard_size: default_shard_size(),
        }
    }
}

fn default_negative_threshold() -> f64 {
    DEFAULT_NEGATIVE_THRESHOLD
}

fn default_positive_threshold() -> f64 {
    DEFAULT_POSITIVE_THRESHOLD
}

fn default_parallel_threshold() -> usize {
    512
}

fn default_shard_size() -> usize {
    256
}

/// Insight synthesis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// Batches smaller than this get no insights.
    #[serde(default = "default_min_reviews")]
    pub min_reviews: usize,

    /// Maximum strengths, weaknesses, and suggestions (1 to 5).
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Occurrences needed before a term outside the rule table is reported.
    #[serde(default = "default_min_term_frequency")]
    pub min_term_frequency: usize,

    /// Words never reported as topics, on top of the built-in list.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,

    /// Category rule table. Replaces the built-in table when given.
    #[serde(default = "default_rules")]
    pub rules: Vec<InsightRule>,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            min_reviews: default_min_reviews(),
            max_items: default_max_items(),
            min_term_frequency: default_min_term_frequency(),
            extra_stopwords: Vec::new(),
            rules: default_rules(),
        }
    }
}

fn default_min_reviews() -> usize {
    MIN_REVIEWS_FOR_INSIGHTS
}

fn default_max_items() -> usize {
    MAX_INSIGHT_ITEMS
}

fn default_min_term_frequency() -> usize {
    2
}

/// Input discovery settings for directory mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Maximum files processed per run.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// File extensions to include.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Names to exclude.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            extensions: default_extensions(),
            excludes: default_excludes(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_max_files() -> usize {
    100
}

pub(crate) fn default_extensions() -> Vec<String> {
    vec!["csv", "tsv", "txt"]
        .into_iter()
        .map(String::from)
        .collect()
}

pub(crate) fn default_excludes() -> Vec<String> {
    vec!["target", "node_modules", "reports", "__pycache__"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> usize {
    50 * 1024 * 1024 // 50MB
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must load; otherwise `.sentiscope.toml` in `dir` is
    /// used if present, and defaults if not. A file that exists but does not
    /// parse is an error. Returns the path that was loaded, if any.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        match Self::load_from_dir(dir)? {
            Some(config) => Ok((config, Some(dir.join(CONFIG_FILE_NAME)))),
            None => Ok((Config::default(), None)),
        }
    }

    /// Try to load `.sentiscope.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Thresholds::new(
            self.classifier.negative_threshold,
            self.classifier.positive_threshold,
        )?;

        check_range("insights.max_items", self.insights.max_items, 1, MAX_INSIGHT_ITEMS)?;
        check_range("classifier.shard_size", self.classifier.shard_size, 1, usize::MAX)?;
        check_range("general.concurrency", self.general.concurrency, 1, 256)?;
        check_range("scanner.max_files", self.scanner.max_files, 1, usize::MAX)?;

        Ok(())
    }

    /// Analysis settings for the pipeline, after validation.
    pub fn batch_config(&self) -> Result<BatchConfig> {
        self.validate().context("Invalid configuration")?;

        let thresholds = Thresholds::new(
            self.classifier.negative_threshold,
            self.classifier.positive_threshold,
        )?;

        Ok(BatchConfig {
            thresholds,
            min_reviews_for_insights: self.insights.min_reviews,
            max_insight_items: self.insights.max_items,
            classifier: self.classifier.kind,
            normalizer: self.normalizer.clone(),
            insight_rules: self.insights.rules.clone(),
            extra_stopwords: self.insights.extra_stopwords.clone(),
            min_term_frequency: self.insights.min_term_frequency,
            parallel_threshold: self.classifier.parallel_threshold,
            shard_size: self.classifier.shard_size,
        })
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn check_range(field: &'static str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.classifier.kind, ClassifierKind::Lexicon);
        assert_eq!(config.insights.min_reviews, 5);
        assert_eq!(config.scanner.max_files, 100);
        assert_eq!(config.general.report_dir, "reports");
        assert!(config.scanner.extensions.contains(&"csv".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "custom_report.md"
report_dir = "out"
verbose = true

[classifier]
kind = "keyword"
negative_threshold = -0.3
positive_threshold = 0.4

[normalizer]
text_column = "body"

[insights]
max_items = 3
extra_stopwords = ["lamp"]

[scanner]
max_files = 50
extensions = ["csv"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "custom_report.md");
        assert_eq!(config.general.report_dir, "out");
        assert!(config.general.verbose);
        assert_eq!(config.classifier.kind, ClassifierKind::Keyword);
        assert_eq!(config.classifier.positive_threshold, 0.4);
        assert_eq!(config.classifier.shard_size, 256);
        assert_eq!(config.normalizer.text_column.as_deref(), Some("body"));
        assert_eq!(config.normalizer.delimiter, "\n");
        assert_eq!(config.insights.max_items, 3);
        assert_eq!(config.insights.rules, default_rules());
        assert_eq!(config.scanner.max_files, 50);
        assert_eq!(config.scanner.extensions, vec!["csv"]);
    }

    #[test]
    fn test_custom_rule_table() {
        let toml_content = r#"
[[insights.rules]]
category = "battery"
keywords = ["battery", "charge"]
strength = "Battery life is praised"
weakness = "Battery life disappoints"
suggestion = "Improve battery life"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.insights.rules.len(), 1);
        assert_eq!(config.insights.rules[0].category, "battery");

        let batch = config.batch_config().unwrap();
        assert_eq!(batch.insight_rules, config.insights.rules);
    }

    #[test]
    fn test_batch_config_carries_settings() {
        let mut config = Config::default();
        config.classifier.negative_threshold = -0.5;
        config.classifier.positive_threshold = 0.5;
        config.insights.min_reviews = 10;

        let batch = config.batch_config().unwrap();
        assert_eq!(batch.thresholds.negative(), -0.5);
        assert_eq!(batch.thresholds.positive(), 0.5);
        assert_eq!(batch.min_reviews_for_insights, 10);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let mut config = Config::default();
        config.classifier.negative_threshold = 0.3;
        config.classifier.positive_threshold = 0.1;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThresholds { .. })
        ));
        assert!(config.batch_config().is_err());
    }

    #[test]
    fn test_max_items_capped() {
        let mut config = Config::default();
        config.insights.max_items = 8;

        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "insights.max_items",
                value: 8,
                min: 1,
                max: 5,
            })
        );
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[general]\nconcurrency = 2\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.general.concurrency, 2);
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, source) = Config::resolve(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(source.is_none());
    }

    #[test]
    fn test_resolve_prefers_explicit_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[general]\nconcurrency = 2\n").unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[general]\nconcurrency = 7\n").unwrap();

        let (config, source) = Config::resolve(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.general.concurrency, 7);
        assert_eq!(source, Some(explicit));
    }

    #[test]
    fn test_resolve_rejects_unparsable_default_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[classifier]\nnegative_threshold = \"low\"\n",
        )
        .unwrap();

        assert!(Config::resolve(None, dir.path()).is_err());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[classifier\nkind = 1").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[classifier]"));
        assert!(toml_str.contains("[scanner]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
