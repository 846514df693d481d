//! Scenario files: the external definition of a schedule.
//!
//! A scenario is a JSON document listing enabler jobs, events, and any
//! observed actual times. Time-of-day and duration fields use their canonical
//! string forms (`H:MM`, `"{h}h {m}m {s}s"`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eta_core::{DurationSpec, EnablerId, Event, EventId, Scheduler, TimeOfDay};

/// A complete scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Default cycle date; CLI flags take precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_date: Option<DateTime<Utc>>,

    /// Enabler job definitions.
    pub enablers: Vec<EnablerDef>,

    /// Event definitions.
    #[serde(default)]
    pub events: Vec<EventDef>,
}

/// One enabler job definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnablerDef {
    pub id: String,
    pub average_start: TimeOfDay,
    pub scheduled_hour: u32,
    #[serde(default)]
    pub day_offset: u32,
}

/// One event definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    pub enabler: String,
    pub average_start: TimeOfDay,
    pub average_end: TimeOfDay,
    pub duration: DurationSpec,
    #[serde(default)]
    pub predecessors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end: Option<DateTime<Utc>>,
}

/// Reads and parses a scenario file.
pub fn load(path: &Path) -> Result<Scenario> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse scenario {}", path.display()))
}

/// Registers every definition into a fresh scheduler for `cycle_date`.
///
/// Definitions are registered in file order; enablers first, so events may
/// reference any enabler in the file.
pub fn build_scheduler(scenario: &Scenario, cycle_date: DateTime<Utc>) -> Result<Scheduler> {
    let mut scheduler = Scheduler::new(cycle_date);

    for def in &scenario.enablers {
        let id = EnablerId::new(def.id.as_str())?;
        scheduler
            .register_enabler(id, def.average_start, def.scheduled_hour, def.day_offset)
            .with_context(|| format!("failed to register enabler {}", def.id))?;
    }

    for def in &scenario.events {
        let predecessors = def
            .predecessors
            .iter()
            .map(|p| EventId::new(p.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let event = Event::new(
            EventId::new(def.id.as_str())?,
            EnablerId::new(def.enabler.as_str())?,
            def.average_start,
            def.average_end,
            def.duration,
        )
        .with_predecessors(predecessors)
        .with_actual_times(def.actual_start, def.actual_end);

        scheduler
            .register_event(event)
            .with_context(|| format!("failed to register event {}", def.id))?;
    }

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"{
        "cycle_date": "2025-06-01T00:00:00Z",
        "enablers": [
            { "id": "nightly-load", "average_start": "10:27", "scheduled_hour": 9 }
        ],
        "events": [
            {
                "id": "extract",
                "enabler": "nightly-load",
                "average_start": "10:30",
                "average_end": "10:37",
                "duration": "0h 7m 0s"
            },
            {
                "id": "transform",
                "enabler": "nightly-load",
                "average_start": "11:00",
                "average_end": "11:15",
                "duration": "0h 15m 0s",
                "predecessors": ["extract"],
                "actual_start": "2025-06-01T11:02:00Z",
                "actual_end": "2025-06-01T11:16:00Z"
            }
        ]
    }"#;

    #[test]
    fn sample_scenario_parses() {
        let scenario: Scenario = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(
            scenario.cycle_date,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(scenario.enablers.len(), 1);
        assert_eq!(scenario.events.len(), 2);
        assert_eq!(scenario.events[1].predecessors, vec!["extract".to_string()]);
        assert!(scenario.events[1].actual_start.is_some());
    }

    #[test]
    fn build_scheduler_registers_everything() {
        let scenario: Scenario = serde_json::from_str(SAMPLE).unwrap();
        let cycle = scenario.cycle_date.unwrap();
        let scheduler = build_scheduler(&scenario, cycle).unwrap();

        let gate = scheduler
            .enabler(&EnablerId::new("nightly-load").unwrap())
            .unwrap();
        assert_eq!(gate.events.len(), 2);

        let transform = scheduler.event(&EventId::new("transform").unwrap()).unwrap();
        assert!(transform.has_actuals());
    }

    #[test]
    fn build_scheduler_rejects_unknown_enabler() {
        let raw = r#"{
            "enablers": [],
            "events": [
                {
                    "id": "orphan",
                    "enabler": "missing",
                    "average_start": "8:00",
                    "average_end": "8:10",
                    "duration": "0h 10m 0s"
                }
            ]
        }"#;
        let scenario: Scenario = serde_json::from_str(raw).unwrap();
        let result = build_scheduler(&scenario, Utc::now());
        assert!(result.is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let result = load(&temp.path().join("nope.json"));
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("schedule.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let scenario = load(&path).unwrap();
        assert_eq!(scenario.enablers[0].id, "nightly-load");
    }
}
