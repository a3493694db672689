//! Story Runner
//!
//! Runs a story set against a story test and records every iteration in a
//! results sink.
//!
//! ## Pipeline Overview
//!
//! ```text
//! StorySet
//!       │
//!       ▼
//! ┌─────────────┐
//! │  archives   │  Advisory check; warns, never aborts
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   filter    │  Include/exclude regexes
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  grouping   │  Consecutive stories sharing a shared state class
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ iterations  │  group × pageset_repeat × story × page_repeat
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  tear down  │  Once per constructed shared state
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`iteration`] - One story iteration and the failure policy

mod iteration;

use crate::config::{ConfigError, StorybenchConfig};
use crate::filter::StoryFilter;
use crate::reporter::{FailureReporter, TracingFailureReporter};
use crate::thermal::ThermalPolicy;
use fxhash::FxHashSet;
use indicatif::{ProgressBar, ProgressStyle};
use iteration::IterationOutcome;
use storybench_core::{
    Expectations, Results, RunOptions, SharedState, SharedStateClass, StoryError,
    StoryGroup, StorySet, StoryTest, check_archives, group_stories_by_shared_state,
};

/// Whether the run goes on after a group
enum GroupFlow {
    Continue,
    Stop,
}

/// Borrowed inputs of one `Runner::run` call plus its per-run bookkeeping
struct RunContext<'a> {
    test: &'a mut dyn StoryTest,
    story_set: &'a StorySet,
    expectations: &'a Expectations,
    results: &'a mut Results,
    discard_first: bool,
    /// Stories whose first successful run was already discarded
    discarded: FxHashSet<usize>,
}

/// Holds the live shared state of one group
struct StateSlot<'g> {
    class: &'g SharedStateClass,
    state: Option<Box<dyn SharedState>>,
    constructed: usize,
}

impl<'g> StateSlot<'g> {
    fn new(class: &'g SharedStateClass) -> Self {
        Self {
            class,
            state: None,
            constructed: 0,
        }
    }

    /// The live state, constructing one if there is none
    fn get_or_create(
        &mut self,
        test: &dyn StoryTest,
        options: &RunOptions,
        story_set: &StorySet,
    ) -> Result<&mut dyn SharedState, StoryError> {
        let state = match self.state.take() {
            Some(state) => state,
            None => {
                tracing::debug!("Constructing shared state {}", self.class.name());
                let state = self.class.create(test, options, story_set)?;
                self.constructed += 1;
                state
            }
        };
        Ok(&mut **self.state.insert(state))
    }

    /// Tear down the live state, if any. The state is released first, so it
    /// is never torn down twice.
    fn tear_down(
        &mut self,
        test: &mut dyn StoryTest,
        results: &mut Results,
    ) -> Result<(), StoryError> {
        match self.state.take() {
            Some(mut state) => {
                tracing::debug!("Tearing down shared state {}", self.class.name());
                state.tear_down(test, results)
            }
            None => Ok(()),
        }
    }
}

/// Runs story sets
pub struct Runner {
    options: RunOptions,
    filter: StoryFilter,
    thermal: ThermalPolicy,
    progress: bool,
    reporter: Box<dyn FailureReporter>,
}

impl Runner {
    /// Runner with validated options, tracing failure output, default thermal
    /// policy and no progress bar
    pub fn new(options: RunOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let filter = StoryFilter::from_options(&options)?;
        Ok(Self {
            options,
            filter,
            thermal: ThermalPolicy::default(),
            progress: false,
            reporter: Box::new(TracingFailureReporter),
        })
    }

    /// Runner described by a configuration file
    pub fn from_config(config: &StorybenchConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.run_options()?)?
            .with_thermal_policy(config.thermal_policy()?)
            .with_progress(config.runner.progress))
    }

    /// Replace the failure reporter
    pub fn with_reporter(mut self, reporter: impl FailureReporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Replace the thermal policy
    pub fn with_thermal_policy(mut self, thermal: ThermalPolicy) -> Self {
        self.thermal = thermal;
        self
    }

    /// Show or hide the progress bar
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    /// Options this runner uses
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run every selected story of `story_set`.
    ///
    /// Returns `Err` only for fatal errors: an unhandled error from a story,
    /// a failed shared state construction, or a failed tear down. Recoverable
    /// failures are recorded in `results` and the run goes on.
    pub fn run(
        &self,
        test: &mut dyn StoryTest,
        story_set: &StorySet,
        expectations: &Expectations,
        results: &mut Results,
    ) -> Result<(), StoryError> {
        self.validate_archives(story_set);

        let selected = self.filter.select(story_set);
        if selected.len() < story_set.len() {
            tracing::info!(
                "{} of {} stories selected by filter",
                selected.len(),
                story_set.len()
            );
        }

        let groups = group_stories_by_shared_state(selected);
        let total: u64 = groups
            .iter()
            .map(|g| self.options.iterations_per_group(g.stories().len()))
            .sum();
        let pb = self.progress_bar(total);

        let mut ctx = RunContext {
            discard_first: test.discard_first_result(),
            test,
            story_set,
            expectations,
            results,
            discarded: FxHashSet::default(),
        };

        for (index, group) in groups.iter().enumerate() {
            tracing::info!(
                group = index,
                shared_state = group.shared_state().name(),
                stories = group.stories().len(),
                "Running story group"
            );

            let mut slot = StateSlot::new(group.shared_state());
            let flow = self.run_group(&mut slot, group, &mut ctx, &pb);
            let teardown = slot.tear_down(&mut *ctx.test, ctx.results);
            tracing::debug!(
                group = index,
                constructed = slot.constructed,
                "Story group finished"
            );

            match (flow, teardown) {
                (Ok(GroupFlow::Continue), Ok(())) => {}
                (Ok(GroupFlow::Stop), Ok(())) => {
                    pb.abandon_with_message("Aborted: too many failures");
                    return Ok(());
                }
                (Err(original), Err(teardown_err)) => {
                    self.reporter
                        .report("Error superseded by a tear down failure", &original);
                    pb.abandon_with_message("Aborted");
                    return Err(teardown_err);
                }
                (Err(e), Ok(())) | (Ok(_), Err(e)) => {
                    pb.abandon_with_message("Aborted");
                    return Err(e);
                }
            }
        }

        pb.finish_with_message("Complete");
        Ok(())
    }

    fn run_group(
        &self,
        slot: &mut StateSlot<'_>,
        group: &StoryGroup<'_>,
        ctx: &mut RunContext<'_>,
        pb: &ProgressBar,
    ) -> Result<GroupFlow, StoryError> {
        for pageset_repeat in 0..self.options.pageset_repeat {
            for &story in group.stories() {
                for page_repeat in 0..self.options.page_repeat {
                    pb.set_message(story.key().display_name());
                    tracing::debug!(
                        story = %story.key(),
                        pageset_repeat,
                        page_repeat,
                        "Running story"
                    );

                    let outcome = self.run_iteration(slot, story, ctx);
                    pb.inc(1);

                    if let IterationOutcome::Fatal(e) = outcome {
                        return Err(e);
                    }
                    if self.too_many_failures(ctx.results) {
                        return Ok(GroupFlow::Stop);
                    }
                }
            }
        }
        Ok(GroupFlow::Continue)
    }

    fn validate_archives(&self, story_set: &StorySet) {
        if self.options.use_live_sites || story_set.all_local() {
            return;
        }
        if !check_archives(
            story_set.archive_data_file(),
            story_set.archive_info(),
            story_set.stories(),
        ) {
            tracing::warn!("Archive validation failed; continuing without complete archives");
        }
    }

    fn too_many_failures(&self, results: &Results) -> bool {
        match self.options.max_failures {
            Some(max) if results.failures().len() > max => {
                tracing::error!(
                    "Too many failures ({} > {}). Aborting.",
                    results.failures().len(),
                    max
                );
                true
            }
            _ => false,
        }
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}
