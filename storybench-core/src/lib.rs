#![warn(missing_docs)]
//! Storybench Core - Story Model
//!
//! This crate provides the data model the runner drives:
//! - `Story` and `StorySet`, the ordered units of benchmark work
//! - `SharedState` / `SharedStateClass`, the per-group resource and its type tag
//! - `StoryTest`, the benchmark's per-story hook
//! - `StoryError`, the error taxonomy the runner classifies
//! - Story grouping, test expectations and archive validation

mod archive;
mod error;
mod expectations;
mod group;
mod options;
mod state;
mod story;

pub use archive::{ArchiveError, ArchiveInfo, check_archives};
pub use error::{ErrorClass, StoryError, error_chain};
pub use expectations::{Expectation, Expectations};
pub use group::{StoryGroup, group_stories_by_shared_state};
pub use options::{OptionsError, RunOptions};
pub use state::{
    Platform, SharedState, SharedStateClass, SharedStateFactory, SimpleSharedState, StoryTest,
};
pub use story::{Story, StorySet};

pub use storybench_results::{Results, StoryKey};
