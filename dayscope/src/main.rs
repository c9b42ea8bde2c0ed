//! dayscope - scope a day's work into a prioritized, time-budgeted plan
//!
//! Reads a source snapshot (pull requests, issues, calendar events),
//! normalizes it into work items, and assembles a daily plan against the
//! requested hour budget.

use anyhow::{Context, Result};
use clap::Parser;
use dayscope_core::sources::SourceSnapshot;
use dayscope_core::{normalize, Category, Config, DailyPlan, PlanPreferences, Planner};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dayscope")]
#[command(about = "Scope a day's work into a prioritized, time-budgeted plan")]
#[command(version)]
struct Args {
    /// Path to a source snapshot JSON file
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Time budget in hours (defaults to planning.default_hours from config)
    #[arg(long)]
    hours: Option<f64>,

    /// Path to a preferences file (TOML or JSON)
    #[arg(short, long)]
    prefs: Option<PathBuf>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Skip the configured estimator and use heuristic estimates only
    #[arg(long)]
    offline: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    config
        .planning
        .validate()
        .context("invalid planning configuration")?;

    // Initialize logging
    let _log_guard = dayscope_core::logging::init(&config.logging)
        .context("failed to initialize logging")?;

    tracing::info!(snapshot = %args.snapshot.display(), "dayscope starting");

    let snapshot = SourceSnapshot::load(&args.snapshot)
        .with_context(|| format!("failed to load snapshot {}", args.snapshot.display()))?;

    let prefs = match &args.prefs {
        Some(path) => load_preferences(path)
            .with_context(|| format!("failed to load preferences {}", path.display()))?,
        None => PlanPreferences::default(),
    };

    let hours = args.hours.unwrap_or(config.planning.default_hours);

    let planner = if args.offline {
        Planner::new()
    } else {
        Planner::from_config(&config)
    };

    let items = normalize(&snapshot.pull_requests, &snapshot.issues);
    let mut plan = planner.build_plan(items, snapshot.events, hours, &prefs);
    plan.diagnostics.extend(snapshot.errors);

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        "text" => print_plan(&plan),
        other => anyhow::bail!("unknown format: {} (expected text or json)", other),
    }

    Ok(())
}

/// Load preferences from TOML or JSON, chosen by file extension.
fn load_preferences(path: &PathBuf) -> Result<PlanPreferences> {
    let raw = std::fs::read_to_string(path)?;
    let prefs = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&raw)?,
        _ => toml::from_str(&raw)?,
    };
    Ok(prefs)
}

fn print_plan(plan: &DailyPlan) {
    println!("Daily plan ({} generated {})", plan.id, plan.generated_at.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "Budget: {:.1}h requested, {:.1}h in meetings, {:.1}h available",
        plan.requested_hours, plan.meeting_hours, plan.available_hours
    );
    println!();

    if plan.items.is_empty() {
        println!("Nothing to plan.");
    }

    let mut current_category: Option<Category> = None;
    for item in &plan.items {
        if current_category != Some(item.category) {
            current_category = Some(item.category);
            println!("{}", item.category.display_name());
        }
        let hours = item
            .effort_hours
            .map(|h| format!("{:.1}h", h))
            .unwrap_or_else(|| "?".to_string());
        let overflow = if item.is_overflow { " (overflow)" } else { "" };
        println!("  [{}] {} - {}{}", item.id, item.title, hours, overflow);
        if let Some(reasoning) = &item.effort_reasoning {
            println!("        {}", reasoning);
        }
    }

    println!();
    println!(
        "Total: {:.1}h across {} item(s){}",
        plan.total_task_hours,
        plan.items.len(),
        if plan.has_overflow {
            ", last item overflows the budget"
        } else {
            ""
        }
    );

    if !plan.events.is_empty() {
        println!();
        println!("Meetings:");
        for event in &plan.events {
            println!(
                "  {} ({} min)",
                event.summary, event.duration_minutes
            );
        }
    }

    if !plan.diagnostics.is_empty() {
        println!();
        println!("Warnings:");
        for diagnostic in &plan.diagnostics {
            println!("  - {}", diagnostic);
        }
    }
}
