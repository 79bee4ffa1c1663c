//! SentiScope - sentiment analysis for customer reviews
//!
//! A CLI tool that classifies batches of customer reviews, aggregates
//! the sentiment distribution, and reports strengths, weaknesses, and
//! suggestions in Markdown, JSON, or CSV.
//!
//! Exit codes:
//!   0 - Success (positive share at or above --fail-below, or no --fail-below set)
//!   1 - Runtime error (unreadable input, invalid config, failed batch, etc.)
//!   2 - Positive share below the --fail-below threshold

mod cli;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use sentiscope::config::{Config, CONFIG_FILE_NAME};
use sentiscope::models::{BatchResult, Sentiment, INLINE_SOURCE};
use sentiscope::normalizer::{normalize, RawInput};
use sentiscope::pipeline::{BatchProcessor, BatchRun};
use sentiscope::report;
use sentiscope::scanner::{self, FileScanner, ScanConfig, ScannedFile};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Resolve configuration before logging so `general.verbose` applies
    let (mut config, config_source) =
        match Config::resolve(args.config.as_deref(), Path::new(".")) {
            Ok(resolved) => resolved,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        };
    args.apply_overrides(&mut config);

    init_logging(&args, &config);

    info!("SentiScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .sentiscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize thresholds, insight rules, columns, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the analysis workflow. Returns exit code (0, 1 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    if args.dry_run {
        return handle_dry_run(&args, &config).await;
    }

    let batch_config = config.batch_config()?;
    let processor = Arc::new(BatchProcessor::new(batch_config));

    println!("🔬 Classifier: {}", processor.classifier_name());

    let exit_code = if args.is_directory_input() {
        run_directory(&args, &config, processor).await?
    } else {
        run_single(&args, &config, processor).await?
    };

    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    Ok(exit_code)
}

/// Analyze one file or inline text and write a single report.
async fn run_single(args: &Args, config: &Config, processor: Arc<BatchProcessor>) -> Result<i32> {
    let (raw, source_name) = read_input(args).await?;

    println!("📥 Analyzing {}...", source_name);
    let run = process(processor, raw, source_name).await?;

    let output = single_output_path(args, config);
    let content = render(&run, args.format, args.include_reviews)?;
    tokio::fs::write(&output, content)
        .await
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    print_summary(&run.result);
    println!("\n✅ Analysis complete! Report saved to: {}", output.display());

    Ok(fail_below_exit_code(args, std::slice::from_ref(&run.result)))
}

/// Analyze every review file in a directory, one batch per file.
async fn run_directory(args: &Args, config: &Config, processor: Arc<BatchProcessor>) -> Result<i32> {
    let root = args.input.clone().context("No input directory given")?;
    let files = FileScanner::new(root.clone(), ScanConfig::from(&config.scanner)).scan()?;

    if files.is_empty() {
        println!("   No review files found in {}.", root.display());
        return Ok(0);
    }

    let out_dir = PathBuf::from(&config.general.report_dir);
    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    println!("📂 Found {} review files in {}", files.len(), root.display());

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(files.len() as u64)
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let format = args.format;
    let include_reviews = args.include_reviews;
    let mut outcomes: Vec<(ScannedFile, Result<(BatchResult, PathBuf)>)> = stream::iter(files)
        .map(|file| {
            let processor = processor.clone();
            let out_dir = out_dir.clone();
            let pb = pb.clone();

            async move {
                let outcome =
                    process_file(processor, &file, &out_dir, format, include_reviews).await;
                if let Err(ref e) = outcome {
                    error!("{}: {:#}", file.relative, e);
                }
                pb.set_message(file.relative.clone());
                pb.inc(1);
                (file, outcome)
            }
        })
        .buffer_unordered(config.general.concurrency.max(1))
        .collect()
        .await;

    pb.finish_and_clear();
    outcomes.sort_by(|a, b| a.0.relative.cmp(&b.0.relative));

    println!("\n📊 Batch Summary:");
    let mut results = Vec::new();
    let mut failed = 0;
    for (file, outcome) in outcomes {
        match outcome {
            Ok((result, path)) => {
                println!(
                    "   ✅ {}: {} reviews, {}% positive → {}",
                    file.relative,
                    result.review_count,
                    result.positive_percentage(),
                    path.display()
                );
                results.push(result);
            }
            Err(e) => {
                println!("   ❌ {}: {:#}", file.relative, e);
                failed += 1;
            }
        }
    }

    println!(
        "\n✅ Processed {} files ({} failed). Reports saved to: {}",
        results.len() + failed,
        failed,
        out_dir.display()
    );

    if failed > 0 {
        warn!("{} of {} batches failed", failed, results.len() + failed);
        return Ok(1);
    }

    Ok(fail_below_exit_code(args, &results))
}

/// Read, analyze, and report on one scanned file.
async fn process_file(
    processor: Arc<BatchProcessor>,
    file: &ScannedFile,
    out_dir: &Path,
    format: OutputFormat,
    include_reviews: bool,
) -> Result<(BatchResult, PathBuf)> {
    let data = tokio::fs::read(&file.path)
        .await
        .with_context(|| format!("Failed to read {}", file.path.display()))?;
    let raw = RawInput::from_file(&file.path, data);

    let run = process(processor, raw, file.relative.clone()).await?;

    let output = scanner::report_path(out_dir, file, format.extension());
    let content = render(&run, format, include_reviews)?;
    tokio::fs::write(&output, content)
        .await
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    Ok((run.result, output))
}

/// Run one batch on the blocking pool.
async fn process(processor: Arc<BatchProcessor>, raw: RawInput, source_name: String) -> Result<BatchRun> {
    let run = tokio::task::spawn_blocking(move || processor.run(&raw, &source_name))
        .await
        .context("Batch task panicked")??;
    Ok(run)
}

/// Read the single input: inline text or a file.
async fn read_input(args: &Args) -> Result<(RawInput, String)> {
    if let Some(ref text) = args.text {
        return Ok((RawInput::text(text.clone()), INLINE_SOURCE.to_string()));
    }

    let path = args.input.as_ref().context("Either --input or --text is required")?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read input: {}", path.display()))?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok((RawInput::from_file(path, data), source_name))
}

/// Render a finished batch in the requested format.
fn render(run: &BatchRun, format: OutputFormat, include_reviews: bool) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(report::generate_markdown_report(&run.result, &run.reviews)),
        OutputFormat::Json => report::generate_json_report(
            &run.result,
            include_reviews.then_some(run.reviews.as_slice()),
        ),
        OutputFormat::Csv => report::generate_csv_export(&run.reviews),
    }
}

/// Report path for single-batch mode.
///
/// An explicit --output is used as given; the configured name takes the
/// format's extension.
fn single_output_path(args: &Args, config: &Config) -> PathBuf {
    let output = PathBuf::from(&config.general.output);
    if args.output.is_some() {
        output
    } else {
        output.with_extension(args.format.extension())
    }
}

/// Print the distribution and insight summary of a batch.
fn print_summary(result: &BatchResult) {
    println!("\n📊 Sentiment Summary:");
    println!("   Source: {}", result.source_name);
    println!("   Reviews: {}", result.review_count);

    let counts = result.distribution.counts;
    let line: Vec<String> = Sentiment::ALL
        .iter()
        .map(|&label| {
            let pct = result.percentages.map(|p| p.get(label)).unwrap_or(0);
            format!("{} {}: {} ({}%)", label.emoji(), label, counts.get(label), pct)
        })
        .collect();
    println!("   {}", line.join(" | "));
    println!(
        "   Average polarity: {:+.3}",
        result.distribution.average_polarity
    );
    if let Some(rating) = result.average_rating {
        println!("   Average rating: {:.2}", rating);
    }

    match result.insights {
        Some(ref insights) => println!("   {}", insights.summary),
        None => println!("   Not enough reviews for insights."),
    }
}

/// Exit code 2 when any batch's positive share is below --fail-below.
fn fail_below_exit_code(args: &Args, results: &[BatchResult]) -> i32 {
    let Some(threshold) = args.fail_below else {
        return 0;
    };

    let below: Vec<&BatchResult> = results
        .iter()
        .filter(|r| r.positive_percentage() < threshold)
        .collect();

    if below.is_empty() {
        return 0;
    }

    for result in &below {
        eprintln!(
            "\n⛔ {}: {}% positive is below {}%. Failing (exit code 2).",
            result.source_name,
            result.positive_percentage(),
            threshold
        );
    }
    2
}

/// Handle --dry-run: parse the input without classifying it.
async fn handle_dry_run(args: &Args, config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: parsing input (no classification)...\n");

    if args.is_directory_input() {
        let root = args.input.clone().context("No input directory given")?;
        let files = FileScanner::new(root, ScanConfig::from(&config.scanner)).scan()?;

        if files.is_empty() {
            println!("   No review files found.");
        } else {
            println!("   Found {} files that would be analyzed:\n", files.len());
            for file in &files {
                println!("     📄 {} ({} bytes)", file.relative, file.size);
            }
        }
    } else {
        let (raw, source_name) = read_input(args).await?;
        match normalize(&raw, &config.normalizer) {
            Ok(records) => {
                let rated = records.iter().filter(|r| r.source_rating.is_some()).count();
                println!(
                    "   {}: {} input, {} reviews ({} with ratings)",
                    source_name,
                    raw.kind(),
                    records.len(),
                    rated
                );
            }
            Err(e) => {
                eprintln!("   ❌ {}: {}", source_name, e);
                return Ok(1);
            }
        }
    }

    println!("\n✅ Dry run complete. No reviews were classified.");
    Ok(0)
}
