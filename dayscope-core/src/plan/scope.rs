//! Budget scoper
//!
//! Single forward greedy pass over the fully ordered item list: items are
//! included in order while the running total stays within budget, exactly
//! one item may overflow the budget (marked), and everything after the first
//! overflow is excluded. No backtracking or reordering.
//!
//! Guarantee: non-empty input always yields at least one selected item, even
//! when the first item's effort alone exceeds the budget.

use crate::types::WorkItem;

/// Result of scoping an ordered item list against a budget.
#[derive(Debug)]
pub struct ScopeOutcome {
    /// Selected prefix, in order; at most the last item has `is_overflow`
    pub items: Vec<WorkItem>,
    /// Sum of effort hours over the selected items
    pub total_hours: f64,
    /// Index of the overflow item within `items`, if any
    pub overflow_index: Option<usize>,
}

/// Walk the ordered list, accumulating hours against `max_hours`.
///
/// Every item must already have `effort_hours` resolved; an unresolved item
/// is treated as zero hours.
pub fn scope(items: Vec<WorkItem>, max_hours: f64) -> ScopeOutcome {
    let mut running_total = 0.0;
    let mut cutoff = items.len();
    let mut overflow_index = None;

    for (i, item) in items.iter().enumerate() {
        // Already at or past budget before this item: it and everything
        // after are excluded.
        if running_total >= max_hours {
            cutoff = i;
            break;
        }

        running_total += item.effort_hours.unwrap_or(0.0);

        if running_total > max_hours && overflow_index.is_none() {
            // Included despite exceeding the budget; guarantees progress
            // even when a single estimate is larger than the whole budget.
            overflow_index = Some(i);
        }
    }

    if let Some(overflow) = overflow_index {
        cutoff = overflow + 1;
    }

    let mut selected = items;
    selected.truncate(cutoff);

    let total_hours: f64 = selected
        .iter()
        .map(|item| item.effort_hours.unwrap_or(0.0))
        .sum();

    if let Some(overflow) = overflow_index {
        selected[overflow].is_overflow = true;
    }

    tracing::debug!(
        selected = selected.len(),
        total_hours,
        max_hours,
        overflow = overflow_index.is_some(),
        "Scoped plan against budget"
    );

    ScopeOutcome {
        items: selected,
        total_hours,
        overflow_index,
    }
}
