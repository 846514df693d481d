//! Check command: validate a scenario without computing estimates.
//!
//! Hard errors (unparseable file, invalid fields, unknown enablers) fail the
//! command; data-quality findings (unknown predecessors, dependency cycles)
//! are printed as warnings and leave the exit status clean.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use crate::scenario;

/// Run validation for a scenario file.
pub fn run<W: Write>(writer: &mut W, scenario_path: &Path) -> Result<()> {
    let scenario = scenario::load(scenario_path)?;
    let cycle_date = scenario.cycle_date.unwrap_or_else(Utc::now);
    let scheduler = scenario::build_scheduler(&scenario, cycle_date)?;

    let known: HashSet<&str> = scenario.events.iter().map(|e| e.id.as_str()).collect();
    let mut warnings = 0usize;

    for def in &scenario.events {
        for pred in &def.predecessors {
            if !known.contains(pred.as_str()) {
                writeln!(
                    writer,
                    "warning: event {} references unknown predecessor {pred}",
                    def.id
                )?;
                warnings += 1;
            }
        }
    }

    let cyclic = scheduler.dependency_cycles();
    if !cyclic.is_empty() {
        let ids: Vec<_> = cyclic.iter().map(ToString::to_string).collect();
        writeln!(writer, "warning: dependency cycle among events: {}", ids.join(", "))?;
        warnings += 1;
    }

    writeln!(
        writer,
        "{} enabler(s), {} event(s), {warnings} warning(s)",
        scenario.enablers.len(),
        scenario.events.len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_on(raw: &str) -> String {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("schedule.json");
        std::fs::write(&path, raw).unwrap();

        let mut output = Vec::new();
        run(&mut output, &path).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn clean_scenario_reports_no_warnings() {
        let output = run_on(
            r#"{
                "enablers": [
                    { "id": "job1", "average_start": "10:27", "scheduled_hour": 9 }
                ],
                "events": [
                    {
                        "id": "v1",
                        "enabler": "job1",
                        "average_start": "10:30",
                        "average_end": "10:37",
                        "duration": "0h 7m 0s"
                    }
                ]
            }"#,
        );
        assert!(output.contains("1 enabler(s), 1 event(s), 0 warning(s)"));
    }

    #[test]
    fn unknown_predecessor_is_a_warning() {
        let output = run_on(
            r#"{
                "enablers": [
                    { "id": "job1", "average_start": "10:27", "scheduled_hour": 9 }
                ],
                "events": [
                    {
                        "id": "v1",
                        "enabler": "job1",
                        "average_start": "10:30",
                        "average_end": "10:37",
                        "duration": "0h 7m 0s",
                        "predecessors": ["ghost"]
                    }
                ]
            }"#,
        );
        assert!(output.contains("unknown predecessor ghost"));
        assert!(output.contains("1 warning(s)"));
    }

    #[test]
    fn cycle_is_a_warning_not_an_error() {
        let output = run_on(
            r#"{
                "enablers": [
                    { "id": "job1", "average_start": "10:27", "scheduled_hour": 9 }
                ],
                "events": [
                    {
                        "id": "v1",
                        "enabler": "job1",
                        "average_start": "10:30",
                        "average_end": "10:37",
                        "duration": "0h 7m 0s",
                        "predecessors": ["v2"]
                    },
                    {
                        "id": "v2",
                        "enabler": "job1",
                        "average_start": "11:00",
                        "average_end": "11:15",
                        "duration": "0h 15m 0s",
                        "predecessors": ["v1"]
                    }
                ]
            }"#,
        );
        assert!(output.contains("dependency cycle among events: v1, v2"));
    }

    #[test]
    fn unknown_enabler_is_a_hard_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("schedule.json");
        std::fs::write(
            &path,
            r#"{
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
            }"#,
        )
        .unwrap();

        let mut output = Vec::new();
        assert!(run(&mut output, &path).is_err());
    }
}
