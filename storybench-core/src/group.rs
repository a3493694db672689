//! Story Grouping
//!
//! Splits an ordered story list into runs of consecutive stories that need
//! the same shared state. The runner constructs one shared state per group.

use crate::state::SharedStateClass;
use crate::story::Story;

/// Maximal run of consecutive stories requiring the same shared state
#[derive(Debug, Clone)]
pub struct StoryGroup<'a> {
    shared_state: SharedStateClass,
    stories: Vec<&'a Story>,
}

impl<'a> StoryGroup<'a> {
    /// Shared state type every member requires
    pub fn shared_state(&self) -> &SharedStateClass {
        &self.shared_state
    }

    /// Members in run order
    pub fn stories(&self) -> &[&'a Story] {
        &self.stories
    }
}

/// Group stories by shared state in a single left-to-right scan.
///
/// A new group starts whenever a story's shared state differs from the
/// previous story's. Stories are not clustered globally: `Foo, Foo, Bar, Foo`
/// yields three groups, two of them for `Foo`. Concatenating the groups
/// gives back the input order.
pub fn group_stories_by_shared_state<'a>(
    stories: impl IntoIterator<Item = &'a Story>,
) -> Vec<StoryGroup<'a>> {
    let mut groups: Vec<StoryGroup<'a>> = Vec::new();

    for story in stories {
        match groups.last_mut() {
            Some(group) if group.shared_state == *story.shared_state() => {
                group.stories.push(story);
            }
            _ => groups.push(StoryGroup {
                shared_state: story.shared_state().clone(),
                stories: vec![story],
            }),
        }
    }

    groups
}
