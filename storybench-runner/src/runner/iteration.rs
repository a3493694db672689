//! Story Iteration
//!
//! One (story, repeat) iteration: open the results bracket, drive the shared
//! state hooks, classify whatever they raise, close the bracket.

use super::{RunContext, Runner, StateSlot};
use storybench_core::{
    ErrorClass, Expectation, Results, SharedState, Story, StoryError, StoryTest, error_chain,
};
use storybench_results::FailureValue;

/// How one iteration ended
#[derive(Debug)]
pub(super) enum IterationOutcome {
    /// Ran without error
    Completed,
    /// Skipped by expectation or a benign interruption
    Skipped,
    /// Recoverable failure; the run goes on
    Failed {
        /// The shared state was torn down and must be rebuilt
        state_lost: bool,
    },
    /// Aborts the run
    Fatal(StoryError),
}

impl IterationOutcome {
    fn is_fatal(&self) -> bool {
        matches!(self, IterationOutcome::Fatal(_))
    }
}

/// `will_run_story` followed by `run_story`
fn drive(
    state: &mut dyn SharedState,
    story: &Story,
    test: &mut dyn StoryTest,
    results: &mut Results,
) -> Result<(), StoryError> {
    state.will_run_story(story)?;
    state.run_story(test, results)
}

fn failure_value(story: &Story, error: &StoryError) -> FailureValue {
    FailureValue::new(story.key(), error.kind_name(), error_chain(error))
}

impl Runner {
    pub(super) fn run_iteration(
        &self,
        slot: &mut StateSlot<'_>,
        story: &Story,
        ctx: &mut RunContext<'_>,
    ) -> IterationOutcome {
        let key = story.key();
        let class = slot.class;

        let state = match slot.get_or_create(&*ctx.test, &self.options, ctx.story_set) {
            Ok(state) => state,
            Err(e) => {
                self.reporter.report(
                    &format!("Failed to construct shared state {}", class.name()),
                    &e,
                );
                return IterationOutcome::Fatal(e);
            }
        };

        self.thermal.wait_if_throttled(state.platform());

        if let Err(e) = ctx.results.will_run_story(key.clone()) {
            return IterationOutcome::Fatal(e.into());
        }

        let expected_fail;
        let mut had_error = false;
        let mut outcome = match state.expectation(story, ctx.expectations) {
            Expectation::Skip(reason) => {
                expected_fail = false;
                tracing::info!(story = %key, "Skipping story: {}", reason);
                match ctx.results.add_skip(reason) {
                    Ok(()) => IterationOutcome::Skipped,
                    Err(e) => IterationOutcome::Fatal(e.into()),
                }
            }
            expectation => {
                expected_fail = expectation == Expectation::Fail;
                match drive(state, story, &mut *ctx.test, ctx.results) {
                    Ok(()) => IterationOutcome::Completed,
                    Err(e) => {
                        had_error = true;
                        self.classify(e, story, expected_fail, ctx.results)
                    }
                }
            }
        };

        if !outcome.is_fatal() {
            if let Err(e) = state.did_run_story(ctx.results) {
                if had_error {
                    self.reporter
                        .report(&format!("Cleanup after story {} also failed", key), &e);
                } else {
                    outcome = self.classify(e, story, expected_fail, ctx.results);
                }
            }
        }

        if expected_fail && matches!(outcome, IterationOutcome::Completed) {
            tracing::warn!(story = %key, "Story was expected to fail but passed");
        }

        self.thermal.check_after(state.platform(), key);

        if let IterationOutcome::Failed { state_lost: true } = outcome {
            tracing::warn!(
                story = %key,
                "Shared state {} lost; it will be rebuilt for the next iteration",
                class.name()
            );
            if let Err(e) = slot.tear_down(&mut *ctx.test, ctx.results) {
                self.reporter.report(
                    &format!("Failed to tear down shared state {}", class.name()),
                    &e,
                );
                outcome = IterationOutcome::Fatal(e);
            }
        }

        let discard = ctx.discard_first
            && matches!(outcome, IterationOutcome::Completed)
            && ctx.discarded.insert(key.index);

        if let Err(e) = ctx.results.did_run_story(discard) {
            if outcome.is_fatal() {
                self.reporter
                    .report(&format!("Failed to close run of {}", key), &e.into());
            } else {
                outcome = IterationOutcome::Fatal(e.into());
            }
        }

        outcome
    }

    /// Apply the failure policy to an error raised by a story hook
    fn classify(
        &self,
        error: StoryError,
        story: &Story,
        expected_fail: bool,
        results: &mut Results,
    ) -> IterationOutcome {
        let key = story.key();
        match error.classify() {
            ErrorClass::Skip => {
                tracing::info!(story = %key, "Story skipped: {}", error);
                match results.add_skip(error.to_string()) {
                    Ok(()) => IterationOutcome::Skipped,
                    Err(e) => IterationOutcome::Fatal(e.into()),
                }
            }
            ErrorClass::Recoverable { state_lost } => {
                if expected_fail {
                    tracing::warn!(story = %key, "Expected failure: {}", error_chain(&error));
                } else {
                    self.reporter
                        .report(&format!("Story {} failed", key), &error);
                    if let Err(e) = results.add_failure(failure_value(story, &error)) {
                        return IterationOutcome::Fatal(e.into());
                    }
                }
                IterationOutcome::Failed { state_lost }
            }
            ErrorClass::Fatal => {
                self.reporter
                    .report(&format!("Unhandled error in story {}", key), &error);
                if let Err(e) = results.add_failure(failure_value(story, &error)) {
                    tracing::debug!("Could not record fatal failure: {}", e);
                }
                IterationOutcome::Fatal(error)
            }
        }
    }
}
