//! Story Errors
//!
//! Every error a shared state or story test can raise, and the class the
//! runner assigns it. The class decides whether an iteration is skipped,
//! recorded as a failure, or aborts the run.

use storybench_results::ResultsError;
use thiserror::Error;

/// How the runner treats an error raised during a story iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Not a failure; the iteration ends skipped
    Skip,
    /// Recorded as a failure; the run continues
    Recoverable {
        /// The shared state can no longer be used and must be replaced
        state_lost: bool,
    },
    /// Recorded, then aborts the run
    Fatal,
}

/// Error raised by a shared state hook or a story test
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoryError {
    /// Cooperative timeout used as control flow
    #[error("Timed out: {0}")]
    Timeout(String),

    /// The story requires an action the target does not support
    #[error("Unsupported action: {0}")]
    Unsupported(String),

    /// Measurement or validation failed; the target is still usable
    #[error("Story failed: {0}")]
    Failure(String),

    /// The application under test crashed
    #[error("Application crashed: {0}")]
    AppCrash(String),

    /// The browser or target process went away
    #[error("Browser gone: {0}")]
    BrowserGone(String),

    /// Results sink misuse
    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    /// Anything else; always fatal
    #[error("Unhandled error: {0}")]
    Unhandled(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StoryError {
    /// Wrap an arbitrary error as unhandled
    pub fn unhandled(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoryError::Unhandled(Box::new(err))
    }

    /// Classify this error for the runner's failure policy
    pub fn classify(&self) -> ErrorClass {
        match self {
            StoryError::Timeout(_) | StoryError::Unsupported(_) => ErrorClass::Skip,
            StoryError::Failure(_) => ErrorClass::Recoverable { state_lost: false },
            StoryError::AppCrash(_) | StoryError::BrowserGone(_) => {
                ErrorClass::Recoverable { state_lost: true }
            }
            StoryError::Results(_) | StoryError::Unhandled(_) => ErrorClass::Fatal,
        }
    }

    /// Short name recorded with failure values
    pub fn kind_name(&self) -> &'static str {
        match self {
            StoryError::Timeout(_) => "timeout",
            StoryError::Unsupported(_) => "unsupported",
            StoryError::Failure(_) => "failure",
            StoryError::AppCrash(_) => "app_crash",
            StoryError::BrowserGone(_) => "browser_gone",
            StoryError::Results(_) => "results",
            StoryError::Unhandled(_) => "unhandled",
        }
    }

    /// Borrow the wrapped error of an `Unhandled` as its concrete type
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            StoryError::Unhandled(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Render an error and its source chain as `outer: inner: root`
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        // Variants that format their source inline would repeat it
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[test]
    fn test_classification() {
        assert_eq!(StoryError::Timeout("t".into()).classify(), ErrorClass::Skip);
        assert_eq!(
            StoryError::Unsupported("pinch".into()).classify(),
            ErrorClass::Skip
        );
        assert_eq!(
            StoryError::Failure("bad".into()).classify(),
            ErrorClass::Recoverable { state_lost: false }
        );
        assert_eq!(
            StoryError::AppCrash("boom".into()).classify(),
            ErrorClass::Recoverable { state_lost: true }
        );
        assert_eq!(
            StoryError::BrowserGone("gone".into()).classify(),
            ErrorClass::Recoverable { state_lost: true }
        );
        assert_eq!(StoryError::unhandled(DiskOnFire).classify(), ErrorClass::Fatal);
        assert_eq!(
            StoryError::from(ResultsError::NoRunInProgress).classify(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn test_unhandled_keeps_original_type() {
        let err = StoryError::unhandled(DiskOnFire);
        assert!(err.downcast_ref::<DiskOnFire>().is_some());
        assert!(StoryError::Failure("x".into())
            .downcast_ref::<DiskOnFire>()
            .is_none());
    }

    #[test]
    fn test_chain_does_not_repeat_inline_source() {
        let err = StoryError::unhandled(DiskOnFire);
        assert_eq!(error_chain(&err), "Unhandled error: disk on fire");
    }
}
