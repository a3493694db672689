//! Stories and Story Sets

use crate::archive::ArchiveInfo;
use crate::state::SharedStateClass;
use std::path::{Path, PathBuf};
use storybench_results::StoryKey;

/// One named unit of benchmark work
#[derive(Debug, Clone)]
pub struct Story {
    key: StoryKey,
    shared_state: SharedStateClass,
    is_local: bool,
    url: Option<String>,
}

impl Story {
    /// A story requiring `shared_state`. Stories are remote until marked local.
    pub fn new(shared_state: &SharedStateClass, name: impl Into<String>) -> Self {
        Self {
            key: StoryKey::new(0, name),
            shared_state: shared_state.clone(),
            is_local: false,
            url: None,
        }
    }

    /// Mark the story as runnable without network fetch
    pub fn local(mut self) -> Self {
        self.is_local = true;
        self
    }

    /// Set the URL the story loads; it keys the story in archive metadata
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Identity within the owning story set
    pub fn key(&self) -> &StoryKey {
        &self.key
    }

    /// Display name (may be empty)
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Shared state type this story requires
    pub fn shared_state(&self) -> &SharedStateClass {
        &self.shared_state
    }

    /// Runs without network fetch
    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// URL, if any
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Key used to look the story up in archive metadata
    pub fn archive_key(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.key.name)
    }
}

/// Ordered collection of stories plus archive metadata
#[derive(Debug, Default)]
pub struct StorySet {
    stories: Vec<Story>,
    archive_data_file: Option<PathBuf>,
    archive_info: Option<ArchiveInfo>,
}

impl StorySet {
    /// Empty set without archive metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty set whose archives are described by `path`.
    ///
    /// A missing or malformed file leaves the archive info unset; the runner
    /// reports it when validating archives.
    pub fn with_archive_data_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let archive_info = match ArchiveInfo::from_file(&path) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!("archive info unavailable: {}", e);
                None
            }
        };
        Self {
            stories: Vec::new(),
            archive_data_file: Some(path),
            archive_info,
        }
    }

    /// Append a story; its index in the set becomes part of its key
    pub fn add_story(&mut self, mut story: Story) -> &StoryKey {
        story.key.index = self.stories.len();
        self.stories.push(story);
        &self.stories[self.stories.len() - 1].key
    }

    /// Stories in run order
    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    /// Number of stories
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Whether the set has no stories
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Whether every story runs without network fetch
    pub fn all_local(&self) -> bool {
        self.stories.iter().all(Story::is_local)
    }

    /// Archive data file, if configured
    pub fn archive_data_file(&self) -> Option<&Path> {
        self.archive_data_file.as_deref()
    }

    /// Loaded archive metadata
    pub fn archive_info(&self) -> Option<&ArchiveInfo> {
        self.archive_info.as_ref()
    }
}

impl<'a> IntoIterator for &'a StorySet {
    type Item = &'a Story;
    type IntoIter = std::slice::Iter<'a, Story>;

    fn into_iter(self) -> Self::IntoIter {
        self.stories.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SimpleSharedState;

    #[test]
    fn test_add_story_assigns_indices() {
        let class = SimpleSharedState::class("s");
        let mut set = StorySet::new();
        set.add_story(Story::new(&class, ""));
        let key = set.add_story(Story::new(&class, "")).clone();
        assert_eq!(key.index, 1);
        assert_ne!(set.stories()[0].key(), set.stories()[1].key());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_all_local() {
        let class = SimpleSharedState::class("s");
        let mut set = StorySet::new();
        assert!(set.all_local());
        set.add_story(Story::new(&class, "a").local());
        assert!(set.all_local());
        set.add_story(Story::new(&class, "b").with_url("http://www.testurl.com"));
        assert!(!set.all_local());
    }

    #[test]
    fn test_archive_key_prefers_url() {
        let class = SimpleSharedState::class("s");
        let story = Story::new(&class, "name").with_url("http://example.com");
        assert_eq!(story.archive_key(), "http://example.com");
        assert_eq!(Story::new(&class, "name").archive_key(), "name");
    }

    #[test]
    fn test_missing_archive_file_leaves_info_unset() {
        let set = StorySet::with_archive_data_file("/nonexistent/archive.json");
        assert!(set.archive_data_file().is_some());
        assert!(set.archive_info().is_none());
    }
}
