//! Orderer
//!
//! Produces the single total order spanning all categories. The category
//! index is always the primary key; within a category the hierarchy is
//! pin > custom-order list position > legacy sort priority, with input order
//! breaking remaining ties (stable sort).
//!
//! Custom-order lists cannot move an item across category boundaries: an id
//! listed under a category other than the item's own is ignored.

use crate::types::{PlanPreferences, WorkItem};

/// Within-category ordering tier. Pinned items always come first; listed
/// items order among themselves by list index; everything else falls back to
/// the legacy key.
const TIER_PINNED: u32 = 0;
const TIER_LISTED: u32 = 1;
const TIER_FALLBACK: u32 = 2;

/// Order items by `(category index, tier, key)` with a stable sort.
pub fn order_items(items: Vec<WorkItem>, prefs: &PlanPreferences) -> Vec<WorkItem> {
    let mut decorated: Vec<((usize, u32, u32), WorkItem)> = items
        .into_iter()
        .map(|item| (sort_key(&item, prefs), item))
        .collect();
    decorated.sort_by_key(|(key, _)| *key);
    decorated.into_iter().map(|(_, item)| item).collect()
}

fn sort_key(item: &WorkItem, prefs: &PlanPreferences) -> (usize, u32, u32) {
    let category_index = item.category.index();

    // Pin wins over list membership
    if prefs.pinned.contains(&item.id) {
        return (category_index, TIER_PINNED, 0);
    }

    if let Some(list) = prefs.custom_order.get(&item.category) {
        if let Some(pos) = list.iter().position(|id| id == &item.id) {
            return (category_index, TIER_LISTED, pos as u32);
        }
    }

    (category_index, TIER_FALLBACK, item.legacy_sort_priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, PriorityRank, WorkItemKind, WorkflowState};

    fn item(id: &str, category: Category, legacy: u32) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            kind: WorkItemKind::IssueOnly,
            title: id.to_string(),
            url: None,
            priority_rank: PriorityRank::None,
            workflow_state: WorkflowState::NotStarted,
            category,
            legacy_sort_priority: legacy,
            effort_hours: None,
            effort_reasoning: None,
            is_overflow: false,
            description: None,
            changed_lines: None,
            story_points: None,
            recent_comments: vec![],
        }
    }

    fn ids(items: &[WorkItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn category_index_is_primary_key() {
        let items = vec![
            item("todo", Category::TodoNone, 404),
            item("urgent", Category::Urgent, 100),
            item("pr", Category::PullRequestAction, 204),
            item("wip", Category::InProgressMedium, 302),
        ];
        let ordered = order_items(items, &PlanPreferences::default());
        assert_eq!(ids(&ordered), vec!["urgent", "pr", "wip", "todo"]);
    }

    #[test]
    fn legacy_priority_orders_within_category() {
        let items = vec![
            item("low", Category::TodoLow, 403),
            item("high", Category::TodoHigh, 401),
            item("high2", Category::TodoHigh, 400),
        ];
        let ordered = order_items(items, &PlanPreferences::default());
        assert_eq!(ids(&ordered), vec!["high2", "high", "low"]);
    }

    #[test]
    fn custom_order_list_beats_legacy_priority() {
        let mut prefs = PlanPreferences::default();
        prefs.custom_order.insert(
            Category::TodoMedium,
            vec!["b".to_string(), "a".to_string()],
        );

        let items = vec![
            item("a", Category::TodoMedium, 402),
            item("b", Category::TodoMedium, 402),
            item("c", Category::TodoMedium, 400),
        ];
        // listed items come first in list order; unlisted fall back after
        let ordered = order_items(items, &prefs);
        assert_eq!(ids(&ordered), vec!["b", "a", "c"]);
    }

    #[test]
    fn pin_wins_over_custom_list() {
        let mut prefs = PlanPreferences::default();
        prefs.custom_order.insert(
            Category::TodoMedium,
            vec!["a".to_string(), "b".to_string()],
        );
        prefs.pinned.insert("b".to_string());

        let items = vec![
            item("a", Category::TodoMedium, 402),
            item("b", Category::TodoMedium, 402),
        ];
        let ordered = order_items(items, &prefs);
        assert_eq!(ids(&ordered), vec!["b", "a"]);
    }

    #[test]
    fn pin_never_crosses_category_boundary() {
        let mut prefs = PlanPreferences::default();
        prefs.pinned.insert("todo".to_string());

        let items = vec![
            item("urgent", Category::Urgent, 100),
            item("todo", Category::TodoNone, 404),
        ];
        let ordered = order_items(items, &prefs);
        assert_eq!(ids(&ordered), vec!["urgent", "todo"]);
    }

    #[test]
    fn cross_category_list_entry_is_ignored() {
        let mut prefs = PlanPreferences::default();
        // "wip" actually lives in InProgressMedium; listing it under
        // TodoMedium must be a no-op
        prefs
            .custom_order
            .insert(Category::TodoMedium, vec!["wip".to_string()]);

        let items = vec![
            item("wip", Category::InProgressMedium, 302),
            item("a", Category::TodoMedium, 402),
        ];
        let ordered = order_items(items, &prefs);
        assert_eq!(ids(&ordered), vec!["wip", "a"]);
    }

    #[test]
    fn stable_for_equal_keys() {
        let items = vec![
            item("first", Category::TodoNone, 404),
            item("second", Category::TodoNone, 404),
            item("third", Category::TodoNone, 404),
        ];
        let ordered = order_items(items, &PlanPreferences::default());
        assert_eq!(ids(&ordered), vec!["first", "second", "third"]);
    }
}
