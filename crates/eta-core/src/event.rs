//! Events - units of work gated by an enabler job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{DurationSpec, EnablerId, EventId, TimeOfDay};

/// A unit of work with historical timing, optional observed actual timing,
/// and dependency links to other events.
///
/// `average_start`/`average_end` are historical reference values surfaced in
/// reports; estimate computation derives timing from the enabler, the
/// predecessors, and `duration` alone. `estimated_start`/`estimated_end` are
/// derived and written only by recomputation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,

    /// The enabler job gating this event. Must be registered first.
    pub enabler: EnablerId,

    /// Time of day the event has historically started.
    pub average_start: TimeOfDay,

    /// Time of day the event has historically ended.
    pub average_end: TimeOfDay,

    /// How long the event takes to run.
    pub duration: DurationSpec,

    /// Observed start, if the event has actually run this cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<DateTime<Utc>>,

    /// Observed end, if the event has actually finished this cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end: Option<DateTime<Utc>>,

    /// Events that must finish before this one starts. Unregistered IDs are
    /// treated as satisfied; duplicates are harmless.
    #[serde(default)]
    pub predecessors: Vec<EventId>,

    /// Derived estimated start, `None` until computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_start: Option<DateTime<Utc>>,

    /// Derived estimated end, `None` until computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_end: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates an event with no actuals, no predecessors, and no estimates.
    pub fn new(
        id: EventId,
        enabler: EnablerId,
        average_start: TimeOfDay,
        average_end: TimeOfDay,
        duration: DurationSpec,
    ) -> Self {
        Self {
            id,
            enabler,
            average_start,
            average_end,
            duration,
            actual_start: None,
            actual_end: None,
            predecessors: Vec::new(),
            estimated_start: None,
            estimated_end: None,
        }
    }

    /// Sets the predecessor list.
    #[must_use]
    pub fn with_predecessors(mut self, predecessors: Vec<EventId>) -> Self {
        self.predecessors = predecessors;
        self
    }

    /// Sets the observed actual times.
    #[must_use]
    pub fn with_actual_times(
        mut self,
        actual_start: Option<DateTime<Utc>>,
        actual_end: Option<DateTime<Utc>>,
    ) -> Self {
        self.actual_start = actual_start;
        self.actual_end = actual_end;
        self
    }

    /// `true` when both actual times are recorded; actuals then override any
    /// computed estimate.
    #[must_use]
    pub const fn has_actuals(&self) -> bool {
        self.actual_start.is_some() && self.actual_end.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Event {
        Event::new(
            EventId::new("warehouse-sync").unwrap(),
            EnablerId::new("nightly-load").unwrap(),
            TimeOfDay::new(22, 30).unwrap(),
            TimeOfDay::new(23, 0).unwrap(),
            DurationSpec::new(0, 30, 0).unwrap(),
        )
    }

    #[test]
    fn new_event_has_no_derived_state() {
        let event = sample();
        assert!(event.actual_start.is_none());
        assert!(event.predecessors.is_empty());
        assert!(event.estimated_start.is_none());
        assert!(!event.has_actuals());
    }

    #[test]
    fn has_actuals_requires_both() {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 22, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 6, 1, 23, 0, 0).unwrap();

        let only_start = sample().with_actual_times(Some(start), None);
        assert!(!only_start.has_actuals());

        let both = sample().with_actual_times(Some(start), Some(end));
        assert!(both.has_actuals());
    }

    #[test]
    fn event_serde_roundtrip() {
        let event = sample().with_predecessors(vec![EventId::new("extract").unwrap()]);
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn event_serde_omits_absent_options() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("actual_start"));
        assert!(!json.contains("estimated_start"));
    }
}
