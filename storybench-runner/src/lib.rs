#![warn(missing_docs)]
//! Storybench Runner Library
//!
//! This crate drives story sets: it groups stories by shared state, runs the
//! pageset and page repeat loops, applies the failure policy, and tears every
//! shared state down exactly once.
//! Use `storybench::run()` (or `storybench_runner::run()`) for a one-shot run
//! with default settings, or build a [`Runner`] to inject a reporter, thermal
//! policy or progress bar.
//!
//! # Example
//!
//! ```ignore
//! use storybench::prelude::*;
//!
//! let mut results = Results::new();
//! storybench_runner::run(&mut test, &story_set, &Expectations::new(), &RunOptions::default(), &mut results)?;
//! println!("{} successful runs", results.successful_run_count());
//! ```

mod config;
mod filter;
mod logging;
mod reporter;
mod runner;
mod thermal;

pub use config::*;
pub use filter::StoryFilter;
pub use logging::init_logging;
pub use reporter::{FailureReporter, SilentFailureReporter, TracingFailureReporter};
pub use runner::Runner;
pub use thermal::ThermalPolicy;

use storybench_core::{Expectations, Results, RunOptions, StoryError, StorySet, StoryTest};

/// Run `story_set` once with `options`, logging failures through `tracing`.
///
/// Invalid options (a zero repeat count, a malformed filter) are returned as
/// an unhandled [`StoryError`] before any story runs.
pub fn run(
    test: &mut dyn StoryTest,
    story_set: &StorySet,
    expectations: &Expectations,
    options: &RunOptions,
    results: &mut Results,
) -> Result<(), StoryError> {
    let runner = Runner::new(options.clone()).map_err(StoryError::unhandled)?;
    runner.run(test, story_set, expectations, results)
}

/// Run `story_set` with the settings of a discovered `storybench.toml`, or
/// defaults when there is none
pub fn run_with_discovered_config(
    test: &mut dyn StoryTest,
    story_set: &StorySet,
    expectations: &Expectations,
    results: &mut Results,
) -> Result<(), StoryError> {
    let config = StorybenchConfig::discover().unwrap_or_default();
    let runner = Runner::from_config(&config).map_err(StoryError::unhandled)?;
    runner.run(test, story_set, expectations, results)
}
