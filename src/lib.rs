//! SentiScope - batch sentiment analysis for customer reviews
//!
//! Normalizes an uploaded batch of reviews, labels each review positive,
//! neutral, or negative, aggregates the distribution, and derives
//! strengths, weaknesses, and suggestions from the grouped text.
//!
//! ```no_run
//! use sentiscope::{run_batch, BatchConfig, RawInput};
//!
//! let raw = RawInput::text("Great quality\nArrived broken");
//! let result = run_batch(&raw, "inline text", &BatchConfig::default()).unwrap();
//! println!("{}% positive", result.positive_percentage());
//! ```

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod scanner;

pub use classifier::{Classifier, ClassifierKind, Thresholds};
pub use error::{BatchError, BatchStep, ErrorKind};
pub use models::{BatchResult, ClassifiedReview, Insights, ReviewRecord, Sentiment};
pub use normalizer::RawInput;
pub use pipeline::{run_batch, BatchConfig, BatchProcessor, BatchRun, BatchState};
