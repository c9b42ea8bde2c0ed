//! Effort estimation
//!
//! The estimator is an external oracle consumed as a pure function: task
//! descriptors in, `{id, hours, reasoning}` out, matched by id. It is called
//! at most once per planning run (batched) to bound latency and cost. When
//! it is unavailable or fails, the deterministic [`heuristic`] fallback is
//! used so planning always completes.

pub mod client;
pub mod heuristic;

pub use client::{create_estimator, HttpEstimatorClient};
pub use heuristic::HeuristicEstimator;

use crate::error::Result;
use crate::types::{PriorityRank, WorkItem, WorkflowState};
use serde::{Deserialize, Serialize};

/// The fixed effort choices an estimate may take, in hours. Manual overrides
/// are exempt and may be any positive value.
pub const ESTIMATE_CHOICES: [f64; 5] = [0.5, 1.0, 2.0, 4.0, 8.0];

const MAX_DESCRIPTION_CHARS: usize = 2_000;
const MAX_COMMENT_CHARS: usize = 500;
const MAX_COMMENTS: usize = 3;

/// Task context handed to the estimator, truncated to bounded lengths to
/// respect context-size limits.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDescriptor {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Total changed lines for PR-backed items
    pub changed_lines: Option<u32>,
    pub story_points: Option<u32>,
    pub priority: PriorityRank,
    pub workflow_state: WorkflowState,
    pub recent_comments: Vec<String>,
}

impl TaskDescriptor {
    pub fn from_item(item: &WorkItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.as_deref().map(|d| truncate(d, MAX_DESCRIPTION_CHARS)),
            changed_lines: item.changed_lines,
            story_points: item.story_points,
            priority: item.priority_rank,
            workflow_state: item.workflow_state,
            recent_comments: item
                .recent_comments
                .iter()
                .take(MAX_COMMENTS)
                .map(|c| truncate(c, MAX_COMMENT_CHARS))
                .collect(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// One estimate returned by the oracle, matched to its task by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffortEstimate {
    pub id: String,
    pub hours: f64,
    pub reasoning: String,
}

/// Effort oracle interface. Implementations must return one estimate per
/// input id; missing or extra ids are tolerated by the caller.
pub trait EffortEstimator: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Estimate a whole batch in one call.
    fn estimate_batch(&self, tasks: &[TaskDescriptor]) -> Result<Vec<EffortEstimate>>;
}

/// Snap an oracle-returned value to the nearest fixed choice.
pub fn snap_to_choice(hours: f64) -> f64 {
    let mut best = ESTIMATE_CHOICES[0];
    for &choice in &ESTIMATE_CHOICES[1..] {
        if (hours - choice).abs() < (hours - best).abs() {
            best = choice;
        }
    }
    best
}

/// Merge an oracle estimate with an optional manual override.
///
/// A valid override (positive, finite) wins unconditionally and replaces the
/// reasoning with a custom-estimate note.
pub fn resolve_effort(
    estimate_hours: f64,
    estimate_reasoning: &str,
    override_hours: Option<f64>,
) -> (f64, String) {
    match override_hours {
        Some(hours) if hours.is_finite() && hours > 0.0 => {
            (hours, format!("Custom estimate: {}h", format_hours(hours)))
        }
        _ => (estimate_hours, estimate_reasoning.to_string()),
    }
}

/// Render hours without a trailing `.0` for integral values.
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{}", hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, WorkItemKind};

    #[test]
    fn snap_picks_nearest_choice() {
        assert_eq!(snap_to_choice(0.5), 0.5);
        assert_eq!(snap_to_choice(0.6), 0.5);
        assert_eq!(snap_to_choice(1.4), 1.0);
        assert_eq!(snap_to_choice(3.0), 2.0);
        assert_eq!(snap_to_choice(5.0), 4.0);
        assert_eq!(snap_to_choice(100.0), 8.0);
        assert_eq!(snap_to_choice(0.0), 0.5);
    }

    #[test]
    fn override_wins_and_rewrites_reasoning() {
        let (hours, reasoning) = resolve_effort(1.0, "oracle says small", Some(3.0));
        assert_eq!(hours, 3.0);
        assert_eq!(reasoning, "Custom estimate: 3h");

        let (hours, reasoning) = resolve_effort(1.0, "oracle says small", Some(2.5));
        assert_eq!(hours, 2.5);
        assert_eq!(reasoning, "Custom estimate: 2.5h");
    }

    #[test]
    fn invalid_override_falls_back_to_estimate() {
        let (hours, reasoning) = resolve_effort(2.0, "medium change", Some(0.0));
        assert_eq!(hours, 2.0);
        assert_eq!(reasoning, "medium change");

        let (hours, _) = resolve_effort(2.0, "medium change", Some(-1.0));
        assert_eq!(hours, 2.0);

        let (hours, _) = resolve_effort(2.0, "medium change", None);
        assert_eq!(hours, 2.0);
    }

    #[test]
    fn descriptor_truncates_long_context() {
        let item = WorkItem {
            id: "ENG-1".to_string(),
            kind: WorkItemKind::IssueOnly,
            title: "title".to_string(),
            url: None,
            priority_rank: PriorityRank::High,
            workflow_state: WorkflowState::NotStarted,
            category: Category::TodoHigh,
            legacy_sort_priority: 401,
            effort_hours: None,
            effort_reasoning: None,
            is_overflow: false,
            description: Some("x".repeat(5_000)),
            changed_lines: None,
            story_points: Some(2),
            recent_comments: (0..10).map(|i| format!("comment {}", i)).collect(),
        };

        let descriptor = TaskDescriptor::from_item(&item);
        let description = descriptor.description.unwrap();
        assert!(description.chars().count() <= MAX_DESCRIPTION_CHARS + 3);
        assert!(description.ends_with("..."));
        assert_eq!(descriptor.recent_comments.len(), MAX_COMMENTS);
    }
}
