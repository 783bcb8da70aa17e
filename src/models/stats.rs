//! Review load statistics.

use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Aggregate pull request counts and per-reviewer assignment counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_pr: i64,
    pub open_pr: i64,
    pub merged_pr: i64,
    /// Username → number of reviewer slots held across all pull requests.
    /// Serialized busiest reviewer first.
    #[serde(serialize_with = "serialize_ranked")]
    pub review_assignments: HashMap<String, i64>,
}

/// Reviewers by descending assignment count, ties broken by username.
fn rank(counts: &HashMap<String, i64>) -> Vec<(&str, i64)> {
    let mut ranked: Vec<(&str, i64)> = counts
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
}

fn serialize_ranked<S: Serializer>(
    counts: &HashMap<String, i64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(rank(counts))
}
