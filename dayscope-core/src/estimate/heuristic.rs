//! Deterministic effort heuristic
//!
//! Rule-based fallback used when the LLM estimator is unconfigured,
//! unreachable, or returns an unusable response. Rules are evaluated in
//! order of signal strength: diff size, tracker story points, urgent
//! priority, work already underway, then a default.

use super::{EffortEstimate, EffortEstimator, TaskDescriptor};
use crate::error::Result;
use crate::types::PriorityRank;

/// Deterministic rule-based estimator. Same input always yields the same
/// output, which keeps planning idempotent when the oracle is offline.
pub struct HeuristicEstimator;

impl HeuristicEstimator {
    pub fn new() -> Self {
        Self
    }

    fn estimate_one(task: &TaskDescriptor) -> EffortEstimate {
        let (hours, reasoning) = if let Some(lines) = task.changed_lines {
            match lines {
                0..=50 => (0.5, format!("Small diff ({} changed lines)", lines)),
                51..=200 => (1.0, format!("Moderate diff ({} changed lines)", lines)),
                201..=600 => (2.0, format!("Substantial diff ({} changed lines)", lines)),
                _ => (4.0, format!("Large diff ({} changed lines)", lines)),
            }
        } else if let Some(points) = task.story_points {
            let hours = match points {
                0 | 1 => 1.0,
                2 => 2.0,
                3 => 4.0,
                _ => 8.0,
            };
            (hours, format!("Tracker estimate of {} points", points))
        } else if task.priority == PriorityRank::Urgent {
            (4.0, "Urgent priority issue".to_string())
        } else if task.workflow_state.is_active() {
            (2.0, "Work already underway".to_string())
        } else {
            (2.0, "No sizing signals available".to_string())
        };

        EffortEstimate {
            id: task.id.clone(),
            hours,
            reasoning,
        }
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl EffortEstimator for HeuristicEstimator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn estimate_batch(&self, tasks: &[TaskDescriptor]) -> Result<Vec<EffortEstimate>> {
        Ok(tasks.iter().map(Self::estimate_one).collect())
    }
}
