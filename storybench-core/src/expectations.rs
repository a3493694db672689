//! Test Expectations
//!
//! Per-story expectations: stories known to fail are not reported as
//! failures, and stories known to be unrunnable are skipped outright.

use crate::story::Story;
use regex::Regex;

/// What a story is expected to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Expected to pass
    Pass,
    /// Expected to fail; recoverable failures are logged, not recorded
    Fail,
    /// Must not run
    Skip(String),
}

/// Ordered expectation rules; the first pattern matching a story's name or
/// URL wins
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    rules: Vec<(Regex, Expectation)>,
}

impl Expectations {
    /// No rules: every story is expected to pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect stories matching `pattern` to fail
    pub fn fail(&mut self, pattern: &str) -> Result<&mut Self, regex::Error> {
        self.rules.push((Regex::new(pattern)?, Expectation::Fail));
        Ok(self)
    }

    /// Skip stories matching `pattern`
    pub fn skip(
        &mut self,
        pattern: &str,
        reason: impl Into<String>,
    ) -> Result<&mut Self, regex::Error> {
        self.rules
            .push((Regex::new(pattern)?, Expectation::Skip(reason.into())));
        Ok(self)
    }

    /// Expectation for one story
    pub fn expectation_for(&self, story: &Story) -> Expectation {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(story.name()) || story.url().is_some_and(|u| re.is_match(u)))
            .map(|(_, expectation)| expectation.clone())
            .unwrap_or(Expectation::Pass)
    }

    /// Whether any rule is defined
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
