//! # dayscope-core
//!
//! Core library for dayscope - a daily plan scoping engine.
//!
//! This library provides:
//! - Domain types for work items, categories, and daily plans
//! - Normalization of tracker pull requests and issues into work items
//! - Deterministic categorize / order / budget-scope pipeline
//! - Effort estimation via an LLM oracle with heuristic fallback
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Planning is a pure pipeline over a captured input snapshot:
//! - **Gather:** sources fetch raw records into a [`sources::SourceSnapshot`]
//! - **Normalize:** raw records join into [`WorkItem`]s
//! - **Plan:** categorize, order, estimate, and scope into a [`DailyPlan`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use dayscope_core::{normalize, Planner, PlanPreferences};
//!
//! let items = normalize(&[], &[]);
//! let planner = Planner::new();
//! let plan = planner.build_plan(items, vec![], 6.0, &PlanPreferences::default());
//! assert!(!plan.has_overflow);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use normalize::normalize;
pub use plan::Planner;
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod estimate;
pub mod logging;
pub mod normalize;
pub mod plan;
pub mod sources;
pub mod types;
