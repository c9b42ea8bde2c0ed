//! Core domain types for dayscope
//!
//! These types form the canonical data model that normalizes actionable work
//! from all supported upstream services into a single planning shape.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **WorkItem** | A unit of actionable work (PR action or tracker issue) fed into planning |
//! | **Category** | One of 10 fixed planning buckets that define macro ordering |
//! | **Legacy sort priority** | Numeric fallback key preserving band+rank outside the category enum |
//! | **Overflow item** | The single item whose inclusion pushes committed hours past budget |
//! | **Estimator** | The external effort oracle (or its deterministic fallback) |
//! | **Pin** | Caller-supplied per-item flag forcing top-of-category placement |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================
// Priority
// ============================================

/// Source-tracker priority, ordered from most to least urgent.
///
/// Rank 0 is the highest (urgent); absent or unknown tracker data maps to
/// [`PriorityRank::None`], the lowest rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityRank {
    Urgent,
    High,
    Medium,
    Low,
    None,
}

impl PriorityRank {
    /// Numeric rank, 0 (urgent) through 4 (none).
    pub fn rank(&self) -> u32 {
        match self {
            PriorityRank::Urgent => 0,
            PriorityRank::High => 1,
            PriorityRank::Medium => 2,
            PriorityRank::Low => 3,
            PriorityRank::None => 4,
        }
    }

    /// Map the tracker's native priority encoding (0 = none, 1 = urgent,
    /// 2 = high, 3 = medium, 4 = low). Anything else is treated as no priority.
    pub fn from_tracker(value: Option<u8>) -> Self {
        match value {
            Some(1) => PriorityRank::Urgent,
            Some(2) => PriorityRank::High,
            Some(3) => PriorityRank::Medium,
            Some(4) => PriorityRank::Low,
            _ => PriorityRank::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityRank::Urgent => "urgent",
            PriorityRank::High => "high",
            PriorityRank::Medium => "medium",
            PriorityRank::Low => "low",
            PriorityRank::None => "none",
        }
    }
}

impl std::fmt::Display for PriorityRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PriorityRank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "urgent" => Ok(PriorityRank::Urgent),
            "high" => Ok(PriorityRank::High),
            "medium" => Ok(PriorityRank::Medium),
            "low" => Ok(PriorityRank::Low),
            "none" => Ok(PriorityRank::None),
            _ => Err(format!("unknown priority rank: {}", s)),
        }
    }
}

// ============================================
// Work item kind and workflow state
// ============================================

/// Origin shape of a work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    /// Tracker issue with no associated pull request
    IssueOnly,
    /// Pull request with no cross-linked issue
    PullRequestOnly,
    /// Pull request cross-linked to a tracker issue (merged into one item)
    PullRequestWithLinkedIssue,
}

impl WorkItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemKind::IssueOnly => "issue_only",
            WorkItemKind::PullRequestOnly => "pull_request_only",
            WorkItemKind::PullRequestWithLinkedIssue => "pull_request_with_linked_issue",
        }
    }
}

impl std::str::FromStr for WorkItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue_only" => Ok(WorkItemKind::IssueOnly),
            "pull_request_only" => Ok(WorkItemKind::PullRequestOnly),
            "pull_request_with_linked_issue" => Ok(WorkItemKind::PullRequestWithLinkedIssue),
            _ => Err(format!("unknown work item kind: {}", s)),
        }
    }
}

/// Mutually exclusive workflow classification derived from source state and
/// labels. Used for filtering, not for the planning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    NotStarted,
    InProgress,
    InReview,
    Blocked,
    /// Canceled upstream with a "stale" state name; retained for display but
    /// excluded from the active planning pool.
    Stale,
    Draft,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::NotStarted => "not_started",
            WorkflowState::InProgress => "in_progress",
            WorkflowState::InReview => "in_review",
            WorkflowState::Blocked => "blocked",
            WorkflowState::Stale => "stale",
            WorkflowState::Draft => "draft",
        }
    }

    /// Whether this state counts as work already underway.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            WorkflowState::InProgress | WorkflowState::InReview | WorkflowState::Blocked
        )
    }
}

impl std::str::FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(WorkflowState::NotStarted),
            "in_progress" => Ok(WorkflowState::InProgress),
            "in_review" => Ok(WorkflowState::InReview),
            "blocked" => Ok(WorkflowState::Blocked),
            "stale" => Ok(WorkflowState::Stale),
            "draft" => Ok(WorkflowState::Draft),
            _ => Err(format!("unknown workflow state: {}", s)),
        }
    }
}

// ============================================
// Categories
// ============================================

/// The ten fixed planning buckets, in evaluation order.
///
/// This ordering is the primary sort key for an entire planning run. It is
/// never reversed or reconfigured at runtime: urgent-linked PRs and bare PR
/// actions always outrank backlog issues regardless of their nominal
/// priority label, because throughput depends on clearing blocking review
/// work first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Urgent,
    PullRequestAction,
    InProgressHigh,
    InProgressMedium,
    InProgressLow,
    InProgressNone,
    TodoHigh,
    TodoMedium,
    TodoLow,
    TodoNone,
}

impl Category {
    /// All categories in planning order.
    pub const ALL: [Category; 10] = [
        Category::Urgent,
        Category::PullRequestAction,
        Category::InProgressHigh,
        Category::InProgressMedium,
        Category::InProgressLow,
        Category::InProgressNone,
        Category::TodoHigh,
        Category::TodoMedium,
        Category::TodoLow,
        Category::TodoNone,
    ];

    /// Fixed position in the planning order, 0 (first) through 9.
    pub fn index(&self) -> usize {
        match self {
            Category::Urgent => 0,
            Category::PullRequestAction => 1,
            Category::InProgressHigh => 2,
            Category::InProgressMedium => 3,
            Category::InProgressLow => 4,
            Category::InProgressNone => 5,
            Category::TodoHigh => 6,
            Category::TodoMedium => 7,
            Category::TodoLow => 8,
            Category::TodoNone => 9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Urgent => "urgent",
            Category::PullRequestAction => "pull_request_action",
            Category::InProgressHigh => "in_progress_high",
            Category::InProgressMedium => "in_progress_medium",
            Category::InProgressLow => "in_progress_low",
            Category::InProgressNone => "in_progress_none",
            Category::TodoHigh => "todo_high",
            Category::TodoMedium => "todo_medium",
            Category::TodoLow => "todo_low",
            Category::TodoNone => "todo_none",
        }
    }

    /// Human-friendly label for display surfaces.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Urgent => "Urgent",
            Category::PullRequestAction => "PR Actions",
            Category::InProgressHigh => "In Progress (High)",
            Category::InProgressMedium => "In Progress (Medium)",
            Category::InProgressLow => "In Progress (Low)",
            Category::InProgressNone => "In Progress",
            Category::TodoHigh => "Todo (High)",
            Category::TodoMedium => "Todo (Medium)",
            Category::TodoLow => "Todo (Low)",
            Category::TodoNone => "Todo",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

// ============================================
// Legacy sort priority bands
// ============================================

/// Band of the legacy numeric sort key (hundreds digit).
///
/// Retained because the category alone does not total-order items from
/// different origins deterministically.
pub mod band {
    /// Pull request cross-linked to an urgent issue
    pub const URGENT_LINKED: u32 = 1;
    /// Pull request awaiting action (no urgent linked issue)
    pub const PR_ONLY: u32 = 2;
    /// Tracker issue already underway
    pub const IN_PROGRESS: u32 = 3;
    /// Backlog / todo tracker issue (including unknown states)
    pub const BACKLOG: u32 = 4;
}

/// Compose a legacy sort priority from a band and a priority rank.
pub fn legacy_sort_priority(band: u32, rank: PriorityRank) -> u32 {
    band * 100 + rank.rank()
}

// ============================================
// Work items
// ============================================

/// A unit of actionable work, normalized from heterogeneous source records.
///
/// `category` and `legacy_sort_priority` are computed by the normalizer;
/// `effort_hours`/`effort_reasoning` are attached by effort resolution;
/// `is_overflow` is set only by the budget scoper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stable unique identifier; cross-linked pairs prefer the linked
    /// issue's identifier
    pub id: String,
    /// Origin shape
    pub kind: WorkItemKind,
    /// Display text
    pub title: String,
    /// Link to the source record (PR URL for PR-backed items)
    pub url: Option<String>,
    /// Tracker priority, rank 0 (urgent) through 4 (none)
    pub priority_rank: PriorityRank,
    /// Filtering classification (not the planning category)
    pub workflow_state: WorkflowState,
    /// Planning bucket, always one of the 10 fixed values
    pub category: Category,
    /// Fallback ordering key: band*100 + rank
    pub legacy_sort_priority: u32,
    /// Final effort in hours; `None` until resolved
    pub effort_hours: Option<f64>,
    /// Human-readable justification for the effort value
    pub effort_reasoning: Option<String>,
    /// Set by the budget scoper on at most one item per plan
    #[serde(default)]
    pub is_overflow: bool,

    // Estimator context (kind-specific, optional)
    /// Issue description or PR body
    pub description: Option<String>,
    /// Total changed lines for PR-backed items (additions + deletions)
    pub changed_lines: Option<u32>,
    /// Tracker story-point estimate, if any
    pub story_points: Option<u32>,
    /// Recent comment bodies, newest first
    #[serde(default)]
    pub recent_comments: Vec<String>,
}

impl WorkItem {
    /// Whether this item belongs in the active planning pool.
    ///
    /// Stale items are carried for display only.
    pub fn is_plannable(&self) -> bool {
        self.workflow_state != WorkflowState::Stale
    }
}

// ============================================
// Calendar events
// ============================================

/// A calendar event used as planning input for the available-hours
/// computation. Never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Computed duration; trusted as supplied by the source
    pub duration_minutes: i64,
    #[serde(default)]
    pub all_day: bool,
    /// The caller's response status ("accepted", "declined", ...)
    pub response_status: Option<String>,
}

// ============================================
// Caller preferences
// ============================================

/// Caller-supplied ordering, pinning, exclusion, and override preferences.
///
/// The engine holds no state between runs; persistence and keying-by-user is
/// the caller's concern. All fields are optional and partial.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanPreferences {
    /// Per-category custom ordering: item ids listed first, in list order.
    /// Entries under a category other than the item's own are ignored.
    #[serde(default)]
    pub custom_order: HashMap<Category, Vec<String>>,
    /// Items forced to the top of their category
    #[serde(default)]
    pub pinned: HashSet<String>,
    /// Items removed from planning entirely
    #[serde(default)]
    pub excluded: HashSet<String>,
    /// Manual per-item effort overrides in hours; non-positive values are
    /// treated as absent
    #[serde(default)]
    pub hour_overrides: HashMap<String, f64>,
}

impl PlanPreferences {
    /// Manual override for an item, if present and valid (> 0, finite).
    pub fn override_for(&self, item_id: &str) -> Option<f64> {
        self.hour_overrides
            .get(item_id)
            .copied()
            .filter(|h| h.is_finite() && *h > 0.0)
    }
}

// ============================================
// Daily plan (output)
// ============================================

/// The assembled daily plan: a scoped, ordered item sequence plus calendar
/// context and aggregate totals.
///
/// Created fresh on each planning invocation and owned by the caller;
/// regeneration replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPlan {
    /// Identifier for this planning run
    pub id: String,
    pub generated_at: DateTime<Utc>,
    /// Scoped items in final order; at most the last one has `is_overflow`
    pub items: Vec<WorkItem>,
    /// Sum of effort over the scoped items
    pub total_task_hours: f64,
    /// The nominal budget the caller asked for
    pub requested_hours: f64,
    /// Budget actually used for scoping: max(0.5, requested - meetings)
    pub available_hours: f64,
    /// Aggregate duration of the selected calendar events
    pub meeting_hours: f64,
    /// Whether the last scoped item overflows the available budget
    pub has_overflow: bool,
    /// Calendar events the plan was built around
    pub events: Vec<CalendarEvent>,
    /// Non-fatal degradations surfaced for display (source failures,
    /// estimator fallback, ...)
    #[serde(default)]
    pub diagnostics: Vec<String>,
}

// ============================================
// Raw source records (collaborator contracts)
// ============================================

/// A pull request as returned by the work-item source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub draft: bool,
    pub author: Option<String>,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl PullRequestRecord {
    pub fn changed_lines(&self) -> u32 {
        self.additions + self.deletions
    }
}

/// Tracker workflow state: a display name plus a coarse type.
///
/// Known types follow the tracker's taxonomy: "triage", "backlog",
/// "unstarted", "started", "completed", "canceled".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueState {
    pub name: String,
    #[serde(rename = "type")]
    pub state_type: String,
}

/// A tracker issue as returned by the work-item source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    pub id: String,
    /// Human-facing identifier, e.g. "ENG-142"
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Native tracker priority: 0 = none, 1 = urgent, 2 = high, 3 = medium,
    /// 4 = low
    pub priority: Option<u8>,
    pub priority_label: Option<String>,
    pub state: IssueState,
    /// Attachment URLs; the first recognizable PR URL drives the join
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Story-point estimate
    pub estimate: Option<u32>,
    /// Recent comment bodies, newest first
    #[serde(default)]
    pub recent_comments: Vec<String>,
    /// Count of unresolved blocking relations
    #[serde(default)]
    pub blocked_by_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_is_fixed() {
        for (i, cat) in Category::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
        assert_eq!(Category::ALL[0], Category::Urgent);
        assert_eq!(Category::ALL[1], Category::PullRequestAction);
        assert_eq!(Category::ALL[9], Category::TodoNone);
    }

    #[test]
    fn category_round_trips_through_str() {
        for cat in Category::ALL {
            let parsed: Category = cat.as_str().parse().unwrap();
            assert_eq!(parsed, cat);
        }
        assert!("not_a_category".parse::<Category>().is_err());
    }

    #[test]
    fn priority_rank_from_tracker_encoding() {
        assert_eq!(PriorityRank::from_tracker(Some(1)), PriorityRank::Urgent);
        assert_eq!(PriorityRank::from_tracker(Some(2)), PriorityRank::High);
        assert_eq!(PriorityRank::from_tracker(Some(3)), PriorityRank::Medium);
        assert_eq!(PriorityRank::from_tracker(Some(4)), PriorityRank::Low);
        assert_eq!(PriorityRank::from_tracker(Some(0)), PriorityRank::None);
        assert_eq!(PriorityRank::from_tracker(Some(9)), PriorityRank::None);
        assert_eq!(PriorityRank::from_tracker(None), PriorityRank::None);
    }

    #[test]
    fn legacy_sort_priority_combines_band_and_rank() {
        assert_eq!(
            legacy_sort_priority(band::URGENT_LINKED, PriorityRank::Urgent),
            100
        );
        assert_eq!(legacy_sort_priority(band::PR_ONLY, PriorityRank::None), 204);
        assert_eq!(
            legacy_sort_priority(band::IN_PROGRESS, PriorityRank::Medium),
            302
        );
        assert_eq!(legacy_sort_priority(band::BACKLOG, PriorityRank::High), 401);
    }

    #[test]
    fn override_for_rejects_invalid_values() {
        let mut prefs = PlanPreferences::default();
        prefs.hour_overrides.insert("a".to_string(), 3.0);
        prefs.hour_overrides.insert("b".to_string(), 0.0);
        prefs.hour_overrides.insert("c".to_string(), -2.0);
        prefs.hour_overrides.insert("d".to_string(), f64::NAN);

        assert_eq!(prefs.override_for("a"), Some(3.0));
        assert_eq!(prefs.override_for("b"), None);
        assert_eq!(prefs.override_for("c"), None);
        assert_eq!(prefs.override_for("d"), None);
        assert_eq!(prefs.override_for("missing"), None);
    }

    #[test]
    fn preferences_deserialize_from_json() {
        let json = r#"{
            "custom_order": { "todo_high": ["ENG-1", "ENG-2"] },
            "pinned": ["ENG-2"],
            "excluded": ["ENG-9"],
            "hour_overrides": { "ENG-1": 3.0 }
        }"#;
        let prefs: PlanPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(
            prefs.custom_order.get(&Category::TodoHigh).unwrap().len(),
            2
        );
        assert!(prefs.pinned.contains("ENG-2"));
        assert!(prefs.excluded.contains("ENG-9"));
        assert_eq!(prefs.override_for("ENG-1"), Some(3.0));
    }
}
