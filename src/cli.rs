//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and overrides of file configuration.

use clap::Parser;
use sentiscope::classifier::ClassifierKind;
use sentiscope::config::Config;
use std::path::PathBuf;

/// SentiScope - sentiment analysis for customer reviews
///
/// Classify a batch of reviews as positive, neutral, or negative and
/// summarize what customers praise and complain about. Markdown, JSON,
/// and CSV output.
///
/// Examples:
///   sentiscope --input reviews.csv
///   sentiscope --input reviews.csv --format json --output result.json
///   sentiscope --text "Great lamp" --classifier keyword
///   sentiscope --input uploads/ --output reports/
///   sentiscope --input reviews.csv --fail-below 60
///   sentiscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Review file (.csv, .tsv, or text) or a directory of review files
    #[arg(
        short,
        long,
        value_name = "PATH",
        required_unless_present_any = ["text", "init_config"],
        conflicts_with = "text"
    )]
    pub input: Option<PathBuf>,

    /// Reviews given inline, one per line
    #[arg(short, long, value_name = "TEXT")]
    pub text: Option<String>,

    /// Output file path (a directory when the input is a directory)
    ///
    /// Defaults to `general.output`, or `general.report_dir` in directory mode.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, csv)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Include per-review classifications in JSON output
    #[arg(long)]
    pub include_reviews: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sentiscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Classifier to use
    #[arg(long, value_name = "KIND", env = "SENTISCOPE_CLASSIFIER")]
    pub classifier: Option<ClassifierChoice>,

    /// Polarity at or below which a review is negative (-1.0 - 1.0)
    #[arg(long, value_name = "SCORE", allow_hyphen_values = true)]
    pub neg_threshold: Option<f64>,

    /// Polarity at or above which a review is positive (-1.0 - 1.0)
    #[arg(long, value_name = "SCORE", allow_hyphen_values = true)]
    pub pos_threshold: Option<f64>,

    /// Minimum reviews before insights are derived
    #[arg(long, value_name = "COUNT")]
    pub min_reviews: Option<usize>,

    /// Maximum strengths, weaknesses, and suggestions (1 - 5)
    #[arg(long, value_name = "COUNT")]
    pub max_insights: Option<usize>,

    /// Separator between reviews in text input (`\n` and `\t` are understood)
    #[arg(long, value_name = "SEP")]
    pub delimiter: Option<String>,

    /// Table column holding the review text
    #[arg(long, value_name = "NAME")]
    pub text_column: Option<String>,

    /// Number of files processed at once in directory mode
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Fail if the positive share is below this percentage
    ///
    /// Useful for CI pipelines. Exit code 2 when any batch falls below it.
    #[arg(long, value_name = "PCT")]
    pub fail_below: Option<u32>,

    /// Dry run: parse the input and report how many reviews it holds
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .sentiscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// One CSV row per review
    Csv,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Classifier selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ClassifierChoice {
    Lexicon,
    Keyword,
}

impl From<ClassifierChoice> for ClassifierKind {
    fn from(choice: ClassifierChoice) -> Self {
        match choice {
            ClassifierChoice::Lexicon => ClassifierKind::Lexicon,
            ClassifierChoice::Keyword => ClassifierKind::Keyword,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && self.text.is_none() {
            return Err("Either --input or --text is required".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Input does not exist: {}", input.display()));
            }
        }

        for (name, value) in [
            ("--neg-threshold", self.neg_threshold),
            ("--pos-threshold", self.pos_threshold),
        ] {
            if let Some(v) = value {
                if !(-1.0..=1.0).contains(&v) {
                    return Err(format!("{} must be between -1.0 and 1.0", name));
                }
            }
        }

        if let Some(max) = self.max_insights {
            if !(1..=5).contains(&max) {
                return Err("--max-insights must be between 1 and 5".to_string());
            }
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if let Some(pct) = self.fail_below {
            if pct > 100 {
                return Err("--fail-below must be a percentage between 0 and 100".to_string());
            }
        }

        if self.delimiter.as_deref() == Some("") {
            return Err("--delimiter must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Whether the input is a directory of review files.
    pub fn is_directory_input(&self) -> bool {
        self.input.as_ref().map(|p| p.is_dir()).unwrap_or(false)
    }

    /// Returns the log level based on verbosity flags and the configured default.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Apply command-line values on top of file configuration.
    ///
    /// Only flags given explicitly override the configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(choice) = self.classifier {
            config.classifier.kind = choice.into();
        }
        if let Some(neg) = self.neg_threshold {
            config.classifier.negative_threshold = neg;
        }
        if let Some(pos) = self.pos_threshold {
            config.classifier.positive_threshold = pos;
        }

        if let Some(min) = self.min_reviews {
            config.insights.min_reviews = min;
        }
        if let Some(max) = self.max_insights {
            config.insights.max_items = max;
        }

        if let Some(ref delimiter) = self.delimiter {
            config.normalizer.delimiter = unescape(delimiter);
        }
        if let Some(ref column) = self.text_column {
            config.normalizer.text_column = Some(column.clone());
        }

        if let Some(concurrency) = self.concurrency {
            config.general.concurrency = concurrency;
        }
        if let Some(ref output) = self.output {
            let output = output.to_string_lossy().to_string();
            if self.is_directory_input() {
                config.general.report_dir = output;
            } else {
                config.general.output = output;
            }
        }

        // Flags always override
        if self.verbose {
            config.general.verbose = true;
        }
    }
}

/// Expand `\n` and `\t` escapes typed on the command line.
fn unescape(value: &str) -> String {
    value.replace("\\n", "\n").replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            text: Some("Great lamp".to_string()),
            output: None,
            format: OutputFormat::Markdown,
            include_reviews: false,
            config: None,
            verbose: false,
            quiet: false,
            classifier: None,
            neg_threshold: None,
            pos_threshold: None,
            min_reviews: None,
            max_insights: None,
            delimiter: None,
            text_column: None,
            concurrency: None,
            fail_below: None,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "sentiscope",
            "--text",
            "Great lamp",
            "--neg-threshold",
            "-0.3",
            "--classifier",
            "keyword",
            "--format",
            "csv",
        ])
        .unwrap();

        assert_eq!(args.neg_threshold, Some(-0.3));
        assert_eq!(args.classifier, Some(ClassifierChoice::Keyword));
        assert_eq!(args.format, OutputFormat::Csv);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_input_and_text_conflict() {
        let parsed = Args::try_parse_from([
            "sentiscope",
            "--text",
            "Great lamp",
            "--input",
            "reviews.csv",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.text = None;
        assert!(args.validate().is_err());

        args.input = Some(PathBuf::from("/definitely/not/here.csv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let mut args = make_args();
        args.pos_threshold = Some(1.5);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.max_insights = Some(6);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.fail_below = Some(101);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_output_override_targets_mode() {
        let mut args = make_args();
        args.output = Some(PathBuf::from("lamp.md"));
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.general.output, "lamp.md");
        assert_eq!(config.general.report_dir, "reports");

        let dir = tempfile::TempDir::new().unwrap();
        let mut args = make_args();
        args.text = None;
        args.input = Some(dir.path().to_path_buf());
        args.output = Some(PathBuf::from("out"));
        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.general.report_dir, "out");
        assert_eq!(config.general.output, "sentiment_report.md");
    }

    #[test]
    fn test_apply_overrides() {
        let mut args = make_args();
        args.classifier = Some(ClassifierChoice::Keyword);
        args.pos_threshold = Some(0.4);
        args.delimiter = Some("\\n\\n".to_string());
        args.text_column = Some("body".to_string());

        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.classifier.kind, ClassifierKind::Keyword);
        assert_eq!(config.classifier.positive_threshold, 0.4);
        assert_eq!(config.classifier.negative_threshold, -0.2);
        assert_eq!(config.normalizer.delimiter, "\n\n");
        assert_eq!(config.normalizer.text_column.as_deref(), Some("body"));
        assert_eq!(config.insights.min_reviews, 5);
    }

    #[test]
    fn test_output_extension() {
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Csv.extension(), "csv");
    }
}
