//! Forecast command: compute and print estimated times for a scenario.
//!
//! Loads the scenario, refreshes every estimate against the observation
//! instant, and prints either a text listing or the full JSON report.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use eta_core::Scheduler;
use eta_core::report::fmt_utc;

use crate::scenario;

/// Options resolved from the CLI.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Overrides the scenario's cycle date.
    pub cycle_date: Option<DateTime<Utc>>,
    /// Observation instant; defaults to the current wall clock.
    pub as_of: Option<DateTime<Utc>>,
    /// Force recalculation of cached enabler start times.
    pub force: bool,
    /// Emit the full JSON report instead of text.
    pub json: bool,
}

/// Run the forecast for a scenario file.
pub fn run<W: Write>(writer: &mut W, scenario_path: &Path, options: Options) -> Result<()> {
    let scenario = scenario::load(scenario_path)?;
    let cycle_date = options
        .cycle_date
        .or(scenario.cycle_date)
        .unwrap_or_else(Utc::now);
    let mut scheduler = scenario::build_scheduler(&scenario, cycle_date)?;

    let now = options.as_of.unwrap_or_else(Utc::now);
    let summary = scheduler.refresh_at(now, None, options.force);
    tracing::debug!(
        events = summary.events_computed,
        cyclic = summary.cyclic.len(),
        "forecast computed"
    );
    if summary.had_cycle() {
        let ids: Vec<_> = summary.cyclic.iter().map(ToString::to_string).collect();
        eprintln!("Warning: dependency cycle among events: {}", ids.join(", "));
    }

    if options.json {
        serde_json::to_writer_pretty(&mut *writer, &scheduler.report())
            .context("failed to serialize report")?;
        writeln!(writer)?;
        return Ok(());
    }

    write_text_report(writer, &scheduler)
}

fn write_text_report<W: Write>(writer: &mut W, scheduler: &Scheduler) -> Result<()> {
    writeln!(writer, "Cycle date:  {}", fmt_utc(scheduler.cycle_date()))?;
    writeln!(writer, "Observed at: {}", fmt_utc(scheduler.observed_at()))?;

    writeln!(writer, "\nEnablers:")?;
    for job in scheduler.enablers() {
        let start = job.estimated_start.map_or_else(|| "-".to_string(), fmt_utc);
        let offset = if job.day_offset > 0 {
            format!(" (+{}d)", job.day_offset)
        } else {
            String::new()
        };
        writeln!(
            writer,
            "  {}  avg {}  scheduled {:02}:00{}  start {}",
            job.id, job.average_start, job.scheduled_hour, offset, start
        )?;
    }

    writeln!(writer, "\nEvents:")?;
    for event in scheduler.events() {
        let span = match (event.estimated_start, event.estimated_end) {
            (Some(start), Some(end)) => format!("{} -> {}", fmt_utc(start), fmt_utc(end)),
            _ => "not computed".to_string(),
        };
        let source = if event.has_actuals() { "  (actual)" } else { "" };
        let after = if event.predecessors.is_empty() {
            String::new()
        } else {
            let preds: Vec<_> = event.predecessors.iter().map(ToString::to_string).collect();
            format!("  after {}", preds.join(", "))
        };
        writeln!(
            writer,
            "  {}  [{}]  {}  {}{}{}",
            event.id, event.enabler, event.duration, span, source, after
        )?;
    }

    Ok(())
}
