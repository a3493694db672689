//! Results Sink
//!
//! The runner brackets every story iteration with [`Results::will_run_story`]
//! and [`Results::did_run_story`]. Anything added while a bracket is open is
//! attributed to that story, so partial results stay attributable even when
//! the iteration fails.

use crate::summary::ResultsSummary;
use crate::value::{FailureValue, StoryKey, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;

/// Errors from misuse of the run brackets
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResultsError {
    /// A value or bracket close arrived with no bracket open
    #[error("No story run in progress")]
    NoRunInProgress,

    /// A bracket was opened while another is still open
    #[error("Story run already in progress: {0}")]
    RunInProgress(StoryKey),

    /// A value names a story other than the running one
    #[error("Value for story {got} recorded while {expected} is running")]
    StoryMismatch {
        /// Story whose bracket is open
        expected: StoryKey,
        /// Story the value names
        got: StoryKey,
    },
}

/// Outcome of one story iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    /// Completed without failure
    Ok,
    /// Skipped by expectation or benign interruption
    Skipped {
        /// Why the iteration was skipped
        reason: String,
    },
    /// At least one failure was recorded
    Failed,
}

/// One closed (story, repeat) bracket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRun {
    /// Story that ran
    pub story: StoryKey,
    /// Terminal state of the iteration
    pub outcome: RunOutcome,
    /// Values recorded during the iteration (empty when discarded)
    pub values: Vec<Value>,
    /// Whether the run was excluded from aggregation
    pub discarded: bool,
    /// Wall-clock start of the bracket
    pub started_at: DateTime<Utc>,
    /// Bracket duration in milliseconds
    pub duration_ms: f64,
}

impl StoryRun {
    /// Completed without failure
    pub fn ok(&self) -> bool {
        self.outcome == RunOutcome::Ok
    }

    /// Skipped
    pub fn skipped(&self) -> bool {
        matches!(self.outcome, RunOutcome::Skipped { .. })
    }

    /// Failed
    pub fn failed(&self) -> bool {
        self.outcome == RunOutcome::Failed
    }
}

#[derive(Debug)]
struct OpenRun {
    run: StoryRun,
    start: Instant,
}

/// Accumulates story runs, values and failures for one runner invocation
#[derive(Debug, Default)]
pub struct Results {
    current: Option<OpenRun>,
    runs: Vec<StoryRun>,
    failures: Vec<FailureValue>,
}

impl Results {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the bracket for one story iteration
    pub fn will_run_story(&mut self, story: StoryKey) -> Result<(), ResultsError> {
        if let Some(open) = &self.current {
            return Err(ResultsError::RunInProgress(open.run.story.clone()));
        }
        self.current = Some(OpenRun {
            run: StoryRun {
                story,
                outcome: RunOutcome::Ok,
                values: Vec::new(),
                discarded: false,
                started_at: Utc::now(),
                duration_ms: 0.0,
            },
            start: Instant::now(),
        });
        Ok(())
    }

    /// Story whose bracket is open, if any
    pub fn current_story(&self) -> Option<&StoryKey> {
        self.current.as_ref().map(|open| &open.run.story)
    }

    /// Record a value for the running story
    pub fn add_value(&mut self, value: Value) -> Result<(), ResultsError> {
        let open = self.current.as_mut().ok_or(ResultsError::NoRunInProgress)?;
        if value.story != open.run.story {
            return Err(ResultsError::StoryMismatch {
                expected: open.run.story.clone(),
                got: value.story,
            });
        }
        open.run.values.push(value);
        Ok(())
    }

    /// Record a failure for the running story
    pub fn add_failure(&mut self, failure: FailureValue) -> Result<(), ResultsError> {
        let open = self.current.as_mut().ok_or(ResultsError::NoRunInProgress)?;
        if failure.story != open.run.story {
            return Err(ResultsError::StoryMismatch {
                expected: open.run.story.clone(),
                got: failure.story,
            });
        }
        open.run.outcome = RunOutcome::Failed;
        self.failures.push(failure);
        Ok(())
    }

    /// Mark the running story as skipped. A recorded failure takes precedence.
    pub fn add_skip(&mut self, reason: impl Into<String>) -> Result<(), ResultsError> {
        let open = self.current.as_mut().ok_or(ResultsError::NoRunInProgress)?;
        if open.run.outcome != RunOutcome::Failed {
            open.run.outcome = RunOutcome::Skipped {
                reason: reason.into(),
            };
        }
        Ok(())
    }

    /// Close the bracket. A discarded run still counts as completed but keeps
    /// no values.
    pub fn did_run_story(&mut self, discard: bool) -> Result<&StoryRun, ResultsError> {
        let OpenRun { mut run, start } =
            self.current.take().ok_or(ResultsError::NoRunInProgress)?;
        run.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        if discard {
            run.discarded = true;
            run.values.clear();
        }
        tracing::trace!(story = %run.story, outcome = ?run.outcome, discard, "story run closed");
        self.runs.push(run);
        Ok(&self.runs[self.runs.len() - 1])
    }

    /// Every closed run, in execution order
    pub fn all_story_runs(&self) -> &[StoryRun] {
        &self.runs
    }

    /// Number of closed brackets, discarded runs included
    pub fn completed_run_count(&self) -> usize {
        self.runs.len()
    }

    /// Non-discarded runs that completed or were skipped
    pub fn successful_run_count(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| !r.discarded && (r.ok() || r.skipped()))
            .count()
    }

    /// Runs that ended in a failure
    pub fn failed_run_count(&self) -> usize {
        self.runs.iter().filter(|r| r.failed()).count()
    }

    /// Runs that ended skipped
    pub fn skipped_run_count(&self) -> usize {
        self.runs.iter().filter(|r| r.skipped()).count()
    }

    /// Every recorded failure, in order
    pub fn failures(&self) -> &[FailureValue] {
        &self.failures
    }

    /// Values of all non-discarded runs, in run order
    pub fn all_story_values(&self) -> impl Iterator<Item = &Value> {
        self.runs
            .iter()
            .filter(|r| !r.discarded)
            .flat_map(|r| r.values.iter())
    }

    /// Values recorded for one story, in run order
    pub fn values_for<'a>(&'a self, story: &'a StoryKey) -> impl Iterator<Item = &'a Value> {
        self.all_story_values().filter(move |v| &v.story == story)
    }

    /// Build the serializable summary
    pub fn summary(&self) -> ResultsSummary {
        ResultsSummary::from_results(self)
    }
}
