//! Shared State
//!
//! A shared state is the stateful resource (a browser instance, a device
//! connection) that consecutive stories reuse. The runner constructs one
//! instance per story group through the group's [`SharedStateClass`], drives
//! its per-story hooks, and tears it down once the group is finished.

use crate::error::StoryError;
use crate::expectations::{Expectation, Expectations};
use crate::options::RunOptions;
use crate::story::{Story, StorySet};
use std::fmt;
use std::rc::Rc;
use storybench_results::Results;

/// The benchmark's per-story hooks
pub trait StoryTest {
    /// Exclude the first successful run of every story from aggregation
    fn discard_first_result(&self) -> bool {
        false
    }

    /// Drive one story and record its values
    fn run_story(&mut self, story: &Story, results: &mut Results) -> Result<(), StoryError>;

    /// Validate the story outcome and record measurements
    fn validate_and_measure(
        &mut self,
        _story: &Story,
        _results: &mut Results,
    ) -> Result<(), StoryError> {
        Ok(())
    }

    /// Called by shared states that finish the test when they tear down
    fn did_run_test(&mut self, _results: &mut Results) -> Result<(), StoryError> {
        Ok(())
    }
}

/// Platform the shared state runs on
pub trait Platform {
    /// Whether thermal throttling can be observed at all
    fn can_monitor_thermal_throttling(&self) -> bool {
        false
    }

    /// Currently throttled
    fn is_thermally_throttled(&self) -> bool {
        false
    }

    /// Throttled at any point since the last check
    fn has_been_thermally_throttled(&self) -> bool {
        false
    }
}

/// Per-group resource with an explicit construct / iterate / tear down lifecycle
pub trait SharedState {
    /// Platform used for thermal monitoring, if any
    fn platform(&self) -> Option<&dyn Platform> {
        None
    }

    /// Expectation for the story about to run
    fn expectation(&self, story: &Story, expectations: &Expectations) -> Expectation {
        expectations.expectation_for(story)
    }

    /// Prepare for `story`
    fn will_run_story(&mut self, story: &Story) -> Result<(), StoryError>;

    /// Run the prepared story through the test
    fn run_story(
        &mut self,
        test: &mut dyn StoryTest,
        results: &mut Results,
    ) -> Result<(), StoryError>;

    /// Per-story cleanup
    fn did_run_story(&mut self, _results: &mut Results) -> Result<(), StoryError> {
        Ok(())
    }

    /// Release the resource. Called exactly once per constructed instance.
    fn tear_down(
        &mut self,
        test: &mut dyn StoryTest,
        results: &mut Results,
    ) -> Result<(), StoryError>;
}

/// Constructor behind a [`SharedStateClass`]
pub trait SharedStateFactory {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Construct a new shared state instance
    fn create(
        &self,
        test: &dyn StoryTest,
        options: &RunOptions,
        story_set: &StorySet,
    ) -> Result<Box<dyn SharedState>, StoryError>;
}

struct FnFactory<F> {
    name: String,
    create: F,
}

impl<F> SharedStateFactory for FnFactory<F>
where
    F: Fn(&dyn StoryTest, &RunOptions, &StorySet) -> Result<Box<dyn SharedState>, StoryError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn create(
        &self,
        test: &dyn StoryTest,
        options: &RunOptions,
        story_set: &StorySet,
    ) -> Result<Box<dyn SharedState>, StoryError> {
        (self.create)(test, options, story_set)
    }
}

/// Type tag naming the shared state a story requires.
///
/// Tags compare by identity: two stories need the same shared state only if
/// they hold clones of the same `SharedStateClass`.
#[derive(Clone)]
pub struct SharedStateClass(Rc<dyn SharedStateFactory>);

impl SharedStateClass {
    /// Wrap a factory
    pub fn new(factory: impl SharedStateFactory + 'static) -> Self {
        Self(Rc::new(factory))
    }

    /// Build a class from a constructor closure
    pub fn from_fn<F>(name: impl Into<String>, create: F) -> Self
    where
        F: Fn(&dyn StoryTest, &RunOptions, &StorySet) -> Result<Box<dyn SharedState>, StoryError>
            + 'static,
    {
        Self::new(FnFactory {
            name: name.into(),
            create,
        })
    }

    /// Factory name
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Construct a new instance
    pub fn create(
        &self,
        test: &dyn StoryTest,
        options: &RunOptions,
        story_set: &StorySet,
    ) -> Result<Box<dyn SharedState>, StoryError> {
        self.0.create(test, options, story_set)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0) as *const ()
    }
}

impl PartialEq for SharedStateClass {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for SharedStateClass {}

impl fmt::Debug for SharedStateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedStateClass").field(&self.name()).finish()
    }
}

/// Shared state with no resource of its own: it remembers the current story
/// and hands it to the test.
#[derive(Debug, Default)]
pub struct SimpleSharedState {
    current: Option<Story>,
}

impl SimpleSharedState {
    /// A fresh class constructing `SimpleSharedState`s
    pub fn class(name: impl Into<String>) -> SharedStateClass {
        SharedStateClass::from_fn(name, |_, _, _| Ok(Box::new(SimpleSharedState::default())))
    }
}

impl SharedState for SimpleSharedState {
    fn will_run_story(&mut self, story: &Story) -> Result<(), StoryError> {
        self.current = Some(story.clone());
        Ok(())
    }

    fn run_story(
        &mut self,
        test: &mut dyn StoryTest,
        results: &mut Results,
    ) -> Result<(), StoryError> {
        let story = self
            .current
            .as_ref()
            .ok_or_else(|| StoryError::Failure("run_story called before will_run_story".into()))?;
        test.run_story(story, results)?;
        test.validate_and_measure(story, results)
    }

    fn did_run_story(&mut self, _results: &mut Results) -> Result<(), StoryError> {
        self.current = None;
        Ok(())
    }

    fn tear_down(
        &mut self,
        _test: &mut dyn StoryTest,
        _results: &mut Results,
    ) -> Result<(), StoryError> {
        Ok(())
    }
}
