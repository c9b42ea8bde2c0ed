//! Categorizer
//!
//! Pure mapping from an item's legacy sort band and priority rank to its
//! planning category. Both planning and display call this one function, so
//! the classification cannot drift between contexts.

use crate::types::{Category, PriorityRank};

/// Assign the planning category for a legacy sort priority and rank.
///
/// Band 1 (urgent-linked) and band 2 (PR action) ignore the rank; bands 3
/// and 4 map the rank into the `InProgress*` / `Todo*` variants. Urgent and
/// high both collapse into the `*High` bucket.
pub fn categorize(legacy_sort_priority: u32, rank: PriorityRank) -> Category {
    match legacy_sort_priority / 100 {
        1 => Category::Urgent,
        2 => Category::PullRequestAction,
        3 => match rank {
            PriorityRank::Urgent | PriorityRank::High => Category::InProgressHigh,
            PriorityRank::Medium => Category::InProgressMedium,
            PriorityRank::Low => Category::InProgressLow,
            PriorityRank::None => Category::InProgressNone,
        },
        // todo/backlog, including unknown bands
        _ => match rank {
            PriorityRank::Urgent | PriorityRank::High => Category::TodoHigh,
            PriorityRank::Medium => Category::TodoMedium,
            PriorityRank::Low => Category::TodoLow,
            PriorityRank::None => Category::TodoNone,
        },
    }
}
