//! Structured schedule snapshots for host consumption.
//!
//! All timestamps serialize in canonical UTC round-trip form with millisecond
//! precision (`YYYY-MM-DDTHH:MM:SS.sssZ`); time-of-day and duration fields use
//! their `H:MM` / `"{h}h {m}m {s}s"` string forms.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Full snapshot of the scheduler: clock state, enabler configuration, and
/// every event's configured, actual, and estimated times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleReport {
    /// Wall-clock instant of the last recomputation.
    pub observed_at: String,
    /// The nominal scheduling day.
    pub cycle_date: String,
    /// Enabler id to configuration and cached start.
    pub enablers: BTreeMap<String, EnablerReport>,
    /// Event id to configuration, actuals, and estimates.
    pub events: BTreeMap<String, EventReport>,
}

/// One enabler job in a [`ScheduleReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnablerReport {
    /// Historical start as `H:MM`.
    pub average_start: String,
    /// Nominal firing hour (0-23).
    pub scheduled_hour: u32,
    /// Days added beyond the base cycle day.
    pub day_offset: u32,
    /// Cached estimated start, `null` until computed.
    pub estimated_start: Option<String>,
    /// Gated event ids in registration order.
    pub events: Vec<String>,
}

/// One event in a [`ScheduleReport`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventReport {
    /// The gating enabler's id.
    pub enabler: String,
    /// Historical start as `H:MM`.
    pub average_start: String,
    /// Historical end as `H:MM`.
    pub average_end: String,
    /// Run duration as `"{h}h {m}m {s}s"`.
    pub duration: String,
    /// Predecessor event ids as registered.
    pub predecessors: Vec<String>,
    /// Observed start, `null` when not recorded.
    pub actual_start: Option<String>,
    /// Observed end, `null` when not recorded.
    pub actual_end: Option<String>,
    /// Estimated start, `null` until computed.
    pub estimated_start: Option<String>,
    /// Estimated end, `null` until computed.
    pub estimated_end: Option<String>,
}

/// Formats a timestamp in the report's canonical UTC form.
#[must_use]
pub fn fmt_utc(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Formats an optional timestamp, `None` staying `None` (serialized `null`).
#[must_use]
pub fn fmt_utc_opt(t: Option<DateTime<Utc>>) -> Option<String> {
    t.map(fmt_utc)
}
