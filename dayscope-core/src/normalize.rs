//! Item normalizer
//!
//! Converts heterogeneous source records (pull requests, tracker issues)
//! into the single [`WorkItem`] shape, joining cross-linked PR/issue pairs
//! into one item and computing the workflow state, legacy sort band, and
//! planning category for each.
//!
//! Join rule: the first attachment URL on an issue containing a recognizable
//! PR path segment, matched against normalized PR URLs within the same run.
//! A matched issue leaves the standalone pool; the merged item takes the
//! issue's identifier and title.
//!
//! Filtering: issues whose workflow state type is "canceled" are dropped
//! entirely unless the state name indicates "stale" - stale items are
//! retained for display but excluded from active planning by workflow state.

use crate::plan::category::categorize;
use crate::types::{
    band, legacy_sort_priority, IssueRecord, PriorityRank, PullRequestRecord, WorkItem,
    WorkItemKind, WorkflowState,
};
use std::collections::{HashMap, HashSet};

/// Normalize raw source records into work items.
///
/// Output items have `kind`, `id`, `title`, `priority_rank`,
/// `workflow_state`, `legacy_sort_priority`, and `category` populated;
/// effort fields are left for the resolver.
pub fn normalize(pull_requests: &[PullRequestRecord], issues: &[IssueRecord]) -> Vec<WorkItem> {
    // Same-run join index: normalized PR URL -> position
    let mut pr_by_url: HashMap<String, usize> = HashMap::new();
    for (i, pr) in pull_requests.iter().enumerate() {
        pr_by_url.insert(normalize_url(&pr.url), i);
    }

    let mut consumed_prs: HashSet<usize> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut items = Vec::new();

    for issue in issues {
        let state = match derive_issue_state(issue) {
            Some(state) => state,
            None => {
                tracing::debug!(issue = %issue.identifier, "Dropping canceled issue");
                continue;
            }
        };

        let linked_pr = issue
            .attachments
            .iter()
            .find(|url| is_pull_request_url(url))
            .and_then(|url| pr_by_url.get(&normalize_url(url)))
            .copied();

        let item = match linked_pr {
            Some(pr_idx) => {
                consumed_prs.insert(pr_idx);
                merge_linked_pair(issue, &pull_requests[pr_idx], state)
            }
            None => standalone_issue(issue, state),
        };

        push_unique(&mut items, &mut seen_ids, item);
    }

    for (i, pr) in pull_requests.iter().enumerate() {
        if consumed_prs.contains(&i) {
            continue;
        }
        push_unique(&mut items, &mut seen_ids, standalone_pull_request(pr));
    }

    tracing::debug!(
        items = items.len(),
        joined = consumed_prs.len(),
        "Normalized source records"
    );

    items
}

fn push_unique(items: &mut Vec<WorkItem>, seen: &mut HashSet<String>, item: WorkItem) {
    if !seen.insert(item.id.clone()) {
        tracing::warn!(id = %item.id, "Duplicate work item id, keeping first occurrence");
        return;
    }
    items.push(item);
}

/// Derive the workflow state for an issue; `None` means drop it.
fn derive_issue_state(issue: &IssueRecord) -> Option<WorkflowState> {
    let state_type = issue.state.state_type.to_ascii_lowercase();
    let state_name = issue.state.name.to_ascii_lowercase();

    if state_type == "canceled" || state_type == "cancelled" {
        if state_name.contains("stale") {
            return Some(WorkflowState::Stale);
        }
        return None;
    }

    if issue.blocked_by_count > 0 {
        return Some(WorkflowState::Blocked);
    }

    if state_type == "started" {
        if state_name.contains("review") {
            return Some(WorkflowState::InReview);
        }
        return Some(WorkflowState::InProgress);
    }

    // triage, backlog, unstarted, and anything unknown
    Some(WorkflowState::NotStarted)
}

fn merge_linked_pair(
    issue: &IssueRecord,
    pr: &PullRequestRecord,
    issue_state: WorkflowState,
) -> WorkItem {
    let rank = PriorityRank::from_tracker(issue.priority);

    // The PR is the actionable surface: a draft stays a draft, an issue not
    // yet started is in review once a PR exists.
    let workflow_state = if pr.draft {
        WorkflowState::Draft
    } else if issue_state.is_active() || issue_state == WorkflowState::Stale {
        issue_state
    } else {
        WorkflowState::InReview
    };

    let item_band = if rank == PriorityRank::Urgent {
        band::URGENT_LINKED
    } else {
        band::PR_ONLY
    };
    let legacy = legacy_sort_priority(item_band, rank);

    WorkItem {
        id: issue.identifier.clone(),
        kind: WorkItemKind::PullRequestWithLinkedIssue,
        title: issue.title.clone(),
        url: Some(pr.url.clone()),
        priority_rank: rank,
        workflow_state,
        category: categorize(legacy, rank),
        legacy_sort_priority: legacy,
        effort_hours: None,
        effort_reasoning: None,
        is_overflow: false,
        description: issue.description.clone(),
        changed_lines: Some(pr.changed_lines()),
        story_points: issue.estimate,
        recent_comments: issue.recent_comments.clone(),
    }
}

fn standalone_issue(issue: &IssueRecord, state: WorkflowState) -> WorkItem {
    let rank = PriorityRank::from_tracker(issue.priority);
    let item_band = if state.is_active() {
        band::IN_PROGRESS
    } else {
        band::BACKLOG
    };
    let legacy = legacy_sort_priority(item_band, rank);

    WorkItem {
        id: issue.identifier.clone(),
        kind: WorkItemKind::IssueOnly,
        title: issue.title.clone(),
        url: issue.url.clone(),
        priority_rank: rank,
        workflow_state: state,
        category: categorize(legacy, rank),
        legacy_sort_priority: legacy,
        effort_hours: None,
        effort_reasoning: None,
        is_overflow: false,
        description: issue.description.clone(),
        changed_lines: None,
        story_points: issue.estimate,
        recent_comments: issue.recent_comments.clone(),
    }
}

fn standalone_pull_request(pr: &PullRequestRecord) -> WorkItem {
    let rank = PriorityRank::None;
    let legacy = legacy_sort_priority(band::PR_ONLY, rank);

    WorkItem {
        id: pr.id.clone(),
        kind: WorkItemKind::PullRequestOnly,
        title: pr.title.clone(),
        url: Some(pr.url.clone()),
        priority_rank: rank,
        workflow_state: if pr.draft {
            WorkflowState::Draft
        } else {
            WorkflowState::InReview
        },
        category: categorize(legacy, rank),
        legacy_sort_priority: legacy,
        effort_hours: None,
        effort_reasoning: None,
        is_overflow: false,
        description: None,
        changed_lines: Some(pr.changed_lines()),
        story_points: None,
        recent_comments: Vec::new(),
    }
}

/// Whether a URL looks like a pull/merge request link.
fn is_pull_request_url(url: &str) -> bool {
    url.contains("/pull/") || url.contains("/merge_requests/")
}

/// Canonicalize a URL for join matching: drop query, fragment, and any
/// trailing slash.
fn normalize_url(url: &str) -> String {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    url.trim_end_matches('/').to_string()
}
