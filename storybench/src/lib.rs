#![warn(missing_docs)]
//! # Storybench
//!
//! User-story benchmark runner with shared-state grouping and layered failure handling.
//!
//! Storybench runs an ordered set of stories against a benchmark:
//! - **Shared-State Grouping**: Consecutive stories needing the same shared state reuse one instance
//! - **Repeat Loops**: `pageset_repeat` passes over each group, `page_repeat` runs per story
//! - **Exact Teardown**: Every constructed shared state is torn down exactly once
//! - **Layered Failures**: Skips, recoverable failures and fatal errors are told apart
//! - **Discarded Warmups**: `discard_first_result` drops the first successful value per story
//! - **Archive Validation**: Missing recordings are reported, never fatal
//!
//! ## Quick Start
//!
//! ```ignore
//! use storybench::prelude::*;
//!
//! struct LoadTime;
//!
//! impl StoryTest for LoadTime {
//!     fn run_story(&mut self, story: &Story, results: &mut Results) -> Result<(), StoryError> {
//!         results.add_value(Value::scalar(story.key(), "load_time", "ms", 12.5))?;
//!         Ok(())
//!     }
//! }
//!
//! let page = SimpleSharedState::class("page");
//! let mut set = StorySet::new();
//! set.add_story(Story::new(&page, "blank").local());
//!
//! let mut results = Results::new();
//! storybench::run(&mut LoadTime, &set, &Expectations::new(), &RunOptions::default(), &mut results)?;
//! ```

// Re-export the story model
pub use storybench_core::{
    ArchiveError, ArchiveInfo, ErrorClass, Expectation, Expectations, OptionsError, Platform,
    RunOptions, SharedState, SharedStateClass, SharedStateFactory, SimpleSharedState, Story,
    StoryError, StoryGroup, StorySet, StoryTest, check_archives, error_chain,
    group_stories_by_shared_state,
};

// Re-export results
pub use storybench_results::{
    FailureValue, MetricSummary, Results, ResultsError, ResultsSummary, RunCounts, RunOutcome,
    StoryKey, StoryRun, Value, ValueData, generate_json_summary,
};

// Re-export the runner
pub use storybench_runner::{
    ConfigError, FailureReporter, Runner, SilentFailureReporter, StorybenchConfig, ThermalPolicy,
    TracingFailureReporter, init_logging, run, run_with_discovered_config,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Expectations, Results, RunOptions, Runner, SharedState, SharedStateClass,
        SimpleSharedState, Story, StoryError, StorySet, StoryTest, Value,
    };
}
