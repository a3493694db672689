//! JSON Output

use crate::summary::ResultsSummary;

/// Generate a prettified JSON summary.
///
/// Serializes run counts, failures and per-story value sequences into
/// machine-readable JSON.
pub fn generate_json_summary(summary: &ResultsSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
