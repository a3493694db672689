//! Failure Reporting
//!
//! The runner hands every failure it handles to a [`FailureReporter`]. The
//! reporter is injected when the runner is built, so tests can silence or
//! capture failure output without touching global state.

use storybench_core::{StoryError, error_chain};

/// Receives failures the runner handles
pub trait FailureReporter {
    /// Report `error`, raised while doing what `context` describes
    fn report(&self, context: &str, error: &StoryError);
}

/// Logs failures through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureReporter;

impl FailureReporter for TracingFailureReporter {
    fn report(&self, context: &str, error: &StoryError) {
        tracing::error!(kind = error.kind_name(), "{}: {}", context, error_chain(error));
    }
}

/// Discards failures
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFailureReporter;

impl FailureReporter for SilentFailureReporter {
    fn report(&self, _context: &str, _error: &StoryError) {}
}
