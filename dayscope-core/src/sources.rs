//! Input sources and snapshot gathering
//!
//! Planning consumes a [`SourceSnapshot`]: every raw record fetched up front
//! in one pass, so the pipeline itself never touches the network. Sources
//! fail independently; a broken calendar still yields a plan from tracker
//! data, with the failure surfaced as a source-scoped error string.

use crate::error::Result;
use crate::types::{CalendarEvent, IssueRecord, PullRequestRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A provider of work-tracker records (issues and pull requests).
pub trait WorkItemSource: Send + Sync {
    /// Short name used in error strings and logs
    fn name(&self) -> &'static str;

    fn fetch_pull_requests(&self) -> Result<Vec<PullRequestRecord>>;

    fn fetch_issues(&self) -> Result<Vec<IssueRecord>>;
}

/// A provider of calendar events for the planning day.
pub trait CalendarSource: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch_events(&self) -> Result<Vec<CalendarEvent>>;
}

/// Everything the planner reads, captured before planning starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub pull_requests: Vec<PullRequestRecord>,
    #[serde(default)]
    pub issues: Vec<IssueRecord>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    /// One entry per failed source, prefixed with the source name
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SourceSnapshot {
    /// Load a previously captured snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot = serde_json::from_str(&raw)?;
        Ok(snapshot)
    }
}

/// Fetch from every source, tolerating per-source failure. A failed fetch
/// contributes an empty slice and an error string instead of aborting the
/// gather.
pub fn gather(
    work_sources: &[Box<dyn WorkItemSource>],
    calendar_sources: &[Box<dyn CalendarSource>],
) -> SourceSnapshot {
    let mut snapshot = SourceSnapshot::default();

    for source in work_sources {
        match source.fetch_pull_requests() {
            Ok(mut prs) => snapshot.pull_requests.append(&mut prs),
            Err(e) => {
                tracing::warn!(source = source.name(), error = %e, "Pull request fetch failed");
                snapshot
                    .errors
                    .push(format!("{}: pull requests unavailable: {}", source.name(), e));
            }
        }
        match source.fetch_issues() {
            Ok(mut issues) => snapshot.issues.append(&mut issues),
            Err(e) => {
                tracing::warn!(source = source.name(), error = %e, "Issue fetch failed");
                snapshot
                    .errors
                    .push(format!("{}: issues unavailable: {}", source.name(), e));
            }
        }
    }

    for source in calendar_sources {
        match source.fetch_events() {
            Ok(mut events) => snapshot.events.append(&mut events),
            Err(e) => {
                tracing::warn!(source = source.name(), error = %e, "Calendar fetch failed");
                snapshot
                    .errors
                    .push(format!("{}: events unavailable: {}", source.name(), e));
            }
        }
    }

    tracing::debug!(
        pull_requests = snapshot.pull_requests.len(),
        issues = snapshot.issues.len(),
        events = snapshot.events.len(),
        errors = snapshot.errors.len(),
        "Gathered source snapshot"
    );

    snapshot
}
