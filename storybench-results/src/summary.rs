//! Results Summary
//!
//! Serializable view of a finished run: run counts, failures and, for each
//! metric, the value sequence of every story in run order plus the sequence
//! across all stories.

use crate::SUMMARY_SCHEMA_VERSION;
use crate::results::Results;
use crate::value::{FailureValue, StoryKey};
use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Complete results summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Schema version and generation time
    pub meta: SummaryMeta,
    /// Run counters
    pub runs: RunCounts,
    /// Numeric metrics in first-seen order
    pub metrics: Vec<MetricSummary>,
    /// Every recorded failure, in order
    pub failures: Vec<FailureValue>,
}

/// Summary metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMeta {
    /// Layout version of this summary
    pub schema_version: u32,
    /// When the summary was built
    pub generated_at: DateTime<Utc>,
}

/// Run counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    /// Closed brackets, discarded runs included
    pub completed: usize,
    /// Non-discarded runs that completed or were skipped
    pub successful: usize,
    /// Runs that ended skipped
    pub skipped: usize,
    /// Runs with at least one recorded failure
    pub failed: usize,
    /// Runs excluded from aggregation
    pub discarded: usize,
}

/// Numeric values of one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Metric name
    pub name: String,
    /// Units of the first value seen
    pub units: String,
    /// Per-story sequences, stories in first-seen order
    pub per_story: Vec<StorySeries>,
    /// Every value of the metric across stories, in run order
    pub all: Vec<f64>,
}

/// Values of one metric for one story, in run order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySeries {
    /// Story the values belong to
    pub story: StoryKey,
    /// Values in run order
    pub values: Vec<f64>,
}

impl MetricSummary {
    /// Sequence recorded for the story with the given display name
    pub fn series_for(&self, name: &str) -> Option<&[f64]> {
        self.per_story
            .iter()
            .find(|s| s.story.display_name() == name)
            .map(|s| s.values.as_slice())
    }
}

impl ResultsSummary {
    /// Summarize a results sink
    pub fn from_results(results: &Results) -> Self {
        let runs = RunCounts {
            completed: results.completed_run_count(),
            successful: results.successful_run_count(),
            skipped: results.skipped_run_count(),
            failed: results.failed_run_count(),
            discarded: results
                .all_story_runs()
                .iter()
                .filter(|r| r.discarded)
                .count(),
        };

        let mut metrics: Vec<MetricSummary> = Vec::new();
        let mut metric_index: FxHashMap<String, usize> = FxHashMap::default();
        let mut series_index: FxHashMap<(usize, StoryKey), usize> = FxHashMap::default();

        for value in results.all_story_values() {
            let numbers = value.numbers();
            if numbers.is_empty() {
                continue;
            }

            let m = *metric_index.entry(value.name.clone()).or_insert_with(|| {
                metrics.push(MetricSummary {
                    name: value.name.clone(),
                    units: value.units.clone(),
                    per_story: Vec::new(),
                    all: Vec::new(),
                });
                metrics.len() - 1
            });
            let metric = &mut metrics[m];

            let s = *series_index
                .entry((m, value.story.clone()))
                .or_insert_with(|| {
                    metric.per_story.push(StorySeries {
                        story: value.story.clone(),
                        values: Vec::new(),
                    });
                    metric.per_story.len() - 1
                });

            metric.per_story[s].values.extend_from_slice(numbers);
            metric.all.extend_from_slice(numbers);
        }

        Self {
            meta: SummaryMeta {
                schema_version: SUMMARY_SCHEMA_VERSION,
                generated_at: Utc::now(),
            },
            runs,
            metrics,
            failures: results.failures().to_vec(),
        }
    }

    /// Summary of one metric by name
    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.name == name)
    }
}
