//! Daily plan scoping engine
//!
//! The pipeline runs leaf-first over a single input snapshot:
//!
//! ```text
//! raw records -> normalize -> categorize -> order -> resolve effort
//!             -> budget scope -> assemble DailyPlan
//! ```
//!
//! Planning is a pure function of (work items, preferences, overrides,
//! budget) and deterministic given deterministic estimator responses. It is
//! stateless between invocations and never returns an error to the caller:
//! every degraded state produces a valid, possibly-empty plan plus a
//! diagnostic string for display.

pub mod category;
pub mod order;
pub mod scope;

use crate::estimate::{
    create_estimator, resolve_effort, EffortEstimator, HeuristicEstimator, TaskDescriptor,
};
use crate::types::{CalendarEvent, DailyPlan, PlanPreferences, WorkItem};
use chrono::Utc;
use std::collections::HashMap;

/// Floor for the scoping budget after subtracting meeting load; a day never
/// shrinks below half an hour of plannable time.
const MIN_AVAILABLE_HOURS: f64 = 0.5;

/// The planning engine. Holds the effort estimator; all other inputs arrive
/// per call.
pub struct Planner {
    estimator: Option<Box<dyn EffortEstimator>>,
    heuristic: HeuristicEstimator,
}

impl Planner {
    /// Planner with no external oracle; every estimate comes from the
    /// deterministic heuristic.
    pub fn new() -> Self {
        Self {
            estimator: None,
            heuristic: HeuristicEstimator::new(),
        }
    }

    /// Planner with a caller-supplied estimator (HTTP client, mock, ...).
    pub fn with_estimator(estimator: Box<dyn EffortEstimator>) -> Self {
        Self {
            estimator: Some(estimator),
            heuristic: HeuristicEstimator::new(),
        }
    }

    /// Build a planner from configuration: the HTTP estimator when one is
    /// configured and constructible, otherwise heuristic-only.
    pub fn from_config(config: &crate::config::Config) -> Self {
        match &config.estimator {
            Some(estimator_config) => match create_estimator(estimator_config) {
                Ok(client) => Self::with_estimator(client),
                Err(e) => {
                    tracing::warn!(error = %e, "Estimator unavailable, using heuristic fallback");
                    Self::new()
                }
            },
            None => Self::new(),
        }
    }

    /// Produce the daily plan for one input snapshot.
    ///
    /// `items` is the candidate list (normalized work items), `events` the
    /// caller-selected calendar events, `requested_hours` the nominal time
    /// budget, and `prefs` the caller's ordering/pin/exclusion/override
    /// preferences, read entirely before the run starts.
    pub fn build_plan(
        &self,
        items: Vec<WorkItem>,
        events: Vec<CalendarEvent>,
        requested_hours: f64,
        prefs: &PlanPreferences,
    ) -> DailyPlan {
        let span = tracing::info_span!(
            "plan_run",
            candidates = items.len(),
            events = events.len(),
            requested_hours
        );
        let _span = span.enter();

        let mut diagnostics = Vec::new();

        let requested_hours = if requested_hours.is_finite() && requested_hours > 0.0 {
            requested_hours
        } else {
            diagnostics.push(format!(
                "invalid requested hours ({}), planning with the {}h minimum",
                requested_hours, MIN_AVAILABLE_HOURS
            ));
            MIN_AVAILABLE_HOURS
        };

        // Stale items are display-only; exclusions are caller preference.
        let candidates: Vec<WorkItem> = items
            .into_iter()
            .filter(|item| item.is_plannable() && !prefs.excluded.contains(&item.id))
            .collect();

        let ordered = order::order_items(candidates, prefs);
        let resolved = self.resolve_batch(ordered, prefs, &mut diagnostics);

        // a malformed negative duration must not grow the budget
        let meeting_hours = events
            .iter()
            .map(|event| event.duration_minutes.max(0))
            .sum::<i64>() as f64
            / 60.0;
        let available_hours = (requested_hours - meeting_hours).max(MIN_AVAILABLE_HOURS);

        let outcome = scope::scope(resolved, available_hours);

        tracing::info!(
            items = outcome.items.len(),
            total_task_hours = outcome.total_hours,
            available_hours,
            meeting_hours,
            overflow = outcome.overflow_index.is_some(),
            "Assembled daily plan"
        );

        DailyPlan {
            id: uuid::Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            has_overflow: outcome.overflow_index.is_some(),
            items: outcome.items,
            total_task_hours: outcome.total_hours,
            requested_hours,
            available_hours,
            meeting_hours,
            events,
            diagnostics,
        }
    }

    /// Attach final effort to every item: one batched oracle call, heuristic
    /// per-item backfill for ids the oracle missed, overrides applied last.
    fn resolve_batch(
        &self,
        items: Vec<WorkItem>,
        prefs: &PlanPreferences,
        diagnostics: &mut Vec<String>,
    ) -> Vec<WorkItem> {
        let descriptors: Vec<TaskDescriptor> =
            items.iter().map(TaskDescriptor::from_item).collect();

        let estimates = self.fetch_estimates(&descriptors, diagnostics);

        items
            .into_iter()
            .map(|mut item| {
                let (hours, reasoning) = match estimates.get(&item.id) {
                    Some((hours, reasoning)) => (*hours, reasoning.clone()),
                    None => {
                        let fallback = self
                            .heuristic
                            .estimate_batch(std::slice::from_ref(
                                &TaskDescriptor::from_item(&item),
                            ))
                            .ok()
                            .and_then(|mut v| v.pop());
                        match fallback {
                            Some(estimate) => (estimate.hours, estimate.reasoning),
                            // heuristic is infallible; kept for shape
                            None => (2.0, "No sizing signals available".to_string()),
                        }
                    }
                };

                let (final_hours, final_reasoning) =
                    resolve_effort(hours, &reasoning, prefs.override_for(&item.id));
                item.effort_hours = Some(final_hours);
                item.effort_reasoning = Some(final_reasoning);
                item
            })
            .collect()
    }

    fn fetch_estimates(
        &self,
        descriptors: &[TaskDescriptor],
        diagnostics: &mut Vec<String>,
    ) -> HashMap<String, (f64, String)> {
        let estimator: &dyn EffortEstimator = match &self.estimator {
            Some(estimator) => estimator.as_ref(),
            None => &self.heuristic,
        };

        let estimates = match estimator.estimate_batch(descriptors) {
            Ok(estimates) => estimates,
            Err(e) => {
                tracing::warn!(
                    estimator = estimator.name(),
                    error = %e,
                    "Estimator failed, falling back to heuristic"
                );
                diagnostics.push(format!(
                    "effort estimator unavailable, used heuristic estimates: {}",
                    e
                ));
                // infallible
                self.heuristic.estimate_batch(descriptors).unwrap_or_default()
            }
        };

        estimates
            .into_iter()
            .map(|e| (e.id, (e.hours, e.reasoning)))
            .collect()
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}
