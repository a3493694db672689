//! Run Options

use thiserror::Error;

/// Invalid run options
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// A repeat count is zero
    #[error("{name} must be at least 1, got {value}")]
    RepeatOutOfRange {
        /// Option name
        name: &'static str,
        /// Rejected value
        value: u32,
    },
}

/// Options shared by the runner and every shared state it constructs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Passes over each story group
    pub pageset_repeat: u32,
    /// Consecutive runs of each story within one pass
    pub page_repeat: u32,
    /// Abort the run once more failures than this have been recorded
    pub max_failures: Option<usize>,
    /// Run against live sites; archive validation is skipped
    pub use_live_sites: bool,
    /// Only run stories whose name matches this regex
    pub story_filter: Option<String>,
    /// Skip stories whose name matches this regex
    pub story_filter_exclude: Option<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            pageset_repeat: 1,
            page_repeat: 1,
            max_failures: None,
            use_live_sites: false,
            story_filter: None,
            story_filter_exclude: None,
        }
    }
}

impl RunOptions {
    /// Check that both repeat counts are positive
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.pageset_repeat < 1 {
            return Err(OptionsError::RepeatOutOfRange {
                name: "pageset_repeat",
                value: self.pageset_repeat,
            });
        }
        if self.page_repeat < 1 {
            return Err(OptionsError::RepeatOutOfRange {
                name: "page_repeat",
                value: self.page_repeat,
            });
        }
        Ok(())
    }

    /// Number of iterations a group of `stories` stories will run
    pub fn iterations_per_group(&self, stories: usize) -> u64 {
        stories as u64 * self.pageset_repeat as u64 * self.page_repeat as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_run_once() {
        let options = RunOptions::default();
        assert_eq!(options.pageset_repeat, 1);
        assert_eq!(options.page_repeat, 1);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_repeat_rejected() {
        let options = RunOptions {
            page_repeat: 0,
            ..Default::default()
        };
        assert_eq!(
            options.validate(),
            Err(OptionsError::RepeatOutOfRange {
                name: "page_repeat",
                value: 0
            })
        );
    }

    #[test]
    fn test_iteration_count() {
        let options = RunOptions {
            pageset_repeat: 3,
            page_repeat: 2,
            ..Default::default()
        };
        assert_eq!(options.iterations_per_group(4), 24);
    }
}
