//! Enabler jobs - periodic upstream jobs that gate groups of events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EnablerId, EventId, TimeOfDay, ValidationError};

/// A periodic upstream job whose historical timing gates downstream events.
///
/// The `estimated_start` field is derived and cached; it is cleared whenever
/// the scheduler marks enabler times stale and refilled on the next pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnablerJob {
    /// Unique identifier.
    pub id: EnablerId,

    /// Time of day the job has historically started.
    pub average_start: TimeOfDay,

    /// Hour of day (0-23) the job is nominally fired.
    pub scheduled_hour: u32,

    /// Days to shift the computed start beyond the base cycle day.
    #[serde(default)]
    pub day_offset: u32,

    /// Events gated by this job, in registration order.
    #[serde(default)]
    pub events: Vec<EventId>,

    /// Cached estimated start, `None` until computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_start: Option<DateTime<Utc>>,
}

impl EnablerJob {
    /// Creates a job with an empty event list, validating the scheduled hour.
    pub fn new(
        id: EnablerId,
        average_start: TimeOfDay,
        scheduled_hour: u32,
        day_offset: u32,
    ) -> Result<Self, ValidationError> {
        if scheduled_hour > 23 {
            return Err(ValidationError::ScheduledHourOutOfRange {
                value: scheduled_hour,
            });
        }
        Ok(Self {
            id,
            average_start,
            scheduled_hour,
            day_offset,
            events: Vec::new(),
            estimated_start: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_starts_uncomputed() {
        let job = EnablerJob::new(
            EnablerId::new("nightly-load").unwrap(),
            TimeOfDay::new(22, 15).unwrap(),
            21,
            0,
        )
        .unwrap();

        assert!(job.events.is_empty());
        assert!(job.estimated_start.is_none());
    }

    #[test]
    fn new_job_rejects_bad_scheduled_hour() {
        let result = EnablerJob::new(
            EnablerId::new("nightly-load").unwrap(),
            TimeOfDay::new(22, 15).unwrap(),
            24,
            0,
        );
        assert_eq!(
            result,
            Err(ValidationError::ScheduledHourOutOfRange { value: 24 })
        );
    }

    #[test]
    fn job_serde_roundtrip() {
        let job = EnablerJob::new(
            EnablerId::new("weekly-close").unwrap(),
            TimeOfDay::new(6, 0).unwrap(),
            5,
            2,
        )
        .unwrap();

        let json = serde_json::to_string(&job).unwrap();
        let parsed: EnablerJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, job);
    }
}
