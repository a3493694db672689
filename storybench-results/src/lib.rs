#![warn(missing_docs)]
//! Storybench Results - Results Sink
//!
//! Accumulates the outcome of every story iteration a runner executes:
//! - One `will_run_story` / `did_run_story` bracket per (story, repeat) pair
//! - Values, failures and skips attributed to the story whose bracket is open
//! - Run counts and per-story value sequences, queryable after the run
//! - A serializable summary with JSON output

mod json;
mod results;
mod summary;
mod value;

pub use json::generate_json_summary;
pub use results::{Results, ResultsError, RunOutcome, StoryRun};
pub use summary::{MetricSummary, ResultsSummary, RunCounts, StorySeries, SummaryMeta};
pub use value::{FailureValue, StoryKey, Value, ValueData};

/// Version of the serialized summary layout
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;
