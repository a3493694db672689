//! Story Filter
//!
//! Selects the stories a run executes.
//!
//! Filtering options:
//! - Include regex matched against story name or URL
//! - Exclude regex matched against story name or URL
//!
//! Ordering: selected stories keep their story set order.

use crate::config::ConfigError;
use regex::Regex;
use storybench_core::{RunOptions, Story, StorySet};

/// Include/exclude filter over story names and URLs
#[derive(Debug, Clone, Default)]
pub struct StoryFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|source| ConfigError::Filter {
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()
}

fn matches(re: &Regex, story: &Story) -> bool {
    re.is_match(story.name()) || story.url().is_some_and(|u| re.is_match(u))
}

impl StoryFilter {
    /// Compile include and exclude patterns
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Filter described by run options
    pub fn from_options(options: &RunOptions) -> Result<Self, ConfigError> {
        Self::new(
            options.story_filter.as_deref(),
            options.story_filter_exclude.as_deref(),
        )
    }

    /// Whether `story` should run
    pub fn is_selected(&self, story: &Story) -> bool {
        // Apply inclusion filter
        if let Some(re) = &self.include {
            if !matches(re, story) {
                return false;
            }
        }

        // Apply exclusion filter
        if let Some(re) = &self.exclude {
            if matches(re, story) {
                return false;
            }
        }

        true
    }

    /// Selected stories in story set order
    pub fn select<'a>(&self, story_set: &'a StorySet) -> Vec<&'a Story> {
        story_set
            .stories()
            .iter()
            .filter(|s| self.is_selected(s))
            .collect()
    }
}
