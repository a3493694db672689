//! Result Values
//!
//! Values recorded by story tests plus the failure records the runner attaches
//! to failed iterations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a story inside one story set.
///
/// The index is the story's insertion position, so stories with equal or
/// empty names remain distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryKey {
    /// Position of the story in its story set
    pub index: usize,
    /// Display name (may be empty)
    pub name: String,
}

impl StoryKey {
    /// Create a key for the story at `index`
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    /// Name used in logs and summaries; falls back to the index for unnamed stories
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("story_{}", self.index)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for StoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Payload of a recorded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ValueData {
    /// Single number
    Scalar(f64),
    /// Free-form text
    Text(String),
    /// Several numbers from one iteration
    List(Vec<f64>),
}

/// A value produced by a story test during one iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    /// Story the value belongs to
    pub story: StoryKey,
    /// Metric name
    pub name: String,
    /// Units of the metric
    pub units: String,
    /// Recorded payload
    pub data: ValueData,
}

impl Value {
    /// Scalar value
    pub fn scalar(
        story: &StoryKey,
        name: impl Into<String>,
        units: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            story: story.clone(),
            name: name.into(),
            units: units.into(),
            data: ValueData::Scalar(value),
        }
    }

    /// Text value
    pub fn text(
        story: &StoryKey,
        name: impl Into<String>,
        units: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            story: story.clone(),
            name: name.into(),
            units: units.into(),
            data: ValueData::Text(value.into()),
        }
    }

    /// List value
    pub fn list(
        story: &StoryKey,
        name: impl Into<String>,
        units: impl Into<String>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            story: story.clone(),
            name: name.into(),
            units: units.into(),
            data: ValueData::List(values),
        }
    }

    /// Numeric samples carried by this value; empty for text
    pub fn numbers(&self) -> &[f64] {
        match &self.data {
            ValueData::Scalar(v) => std::slice::from_ref(v),
            ValueData::List(vs) => vs,
            ValueData::Text(_) => &[],
        }
    }
}

/// Failure recorded against a story iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureValue {
    /// Story that failed
    pub story: StoryKey,
    /// Short classification, e.g. "app_crash"
    pub kind: String,
    /// Error detail, including its source chain
    pub message: String,
}

impl FailureValue {
    /// Create a failure record
    pub fn new(story: &StoryKey, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            story: story.clone(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}
