//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Hours or minutes outside the clock range.
    #[error("time of day out of range: {hours}:{minutes:02}")]
    TimeOfDayOutOfRange { hours: u32, minutes: u32 },

    /// A time-of-day string that does not parse as `H:MM`.
    #[error("invalid time of day: {value} (expected H:MM)")]
    InvalidTimeOfDay { value: String },

    /// Scheduled hour outside the 24-hour clock.
    #[error("scheduled hour must be between 0 and 23, got {value}")]
    ScheduledHourOutOfRange { value: u32 },

    /// Duration minute/second components outside their ranges.
    #[error("duration out of range: {hours}h {minutes}m {seconds}s")]
    DurationOutOfRange {
        hours: u32,
        minutes: u32,
        seconds: u32,
    },

    /// A duration string that does not parse as `{h}h {m}m {s}s`.
    #[error("invalid duration: {value} (expected e.g. \"1h 30m 0s\")")]
    InvalidDuration { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated enabler job identifier.
    ///
    /// Enabler IDs must be non-empty strings and unique within one scheduler;
    /// re-registering an existing ID replaces its timing configuration.
    EnablerId, "enabler ID"
);

define_string_id!(
    /// A validated event identifier.
    ///
    /// Event IDs must be non-empty strings. Predecessor lists reference
    /// events by these IDs; references to unregistered IDs are tolerated.
    EventId, "event ID"
);

/// A wall-clock time of day (hour and minute).
///
/// Displays and parses as `H:MM` — unpadded hour, zero-padded minutes —
/// which is also its serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
}

impl TimeOfDay {
    /// Creates a time of day after validating the clock ranges.
    pub fn new(hours: u32, minutes: u32) -> Result<Self, ValidationError> {
        if hours > 23 || minutes > 59 {
            return Err(ValidationError::TimeOfDayOutOfRange { hours, minutes });
        }
        Ok(Self { hours, minutes })
    }

    /// The hour component (0-23).
    #[must_use]
    pub const fn hours(self) -> u32 {
        self.hours
    }

    /// The minute component (0-59).
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.minutes
    }

    /// Offset of this time of day from midnight.
    #[must_use]
    pub fn since_midnight(self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.hours) * 60 + i64::from(self.minutes))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hours, self.minutes)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay {
            value: s.to_string(),
        };
        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
        let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
        Self::new(hours, minutes).map_err(|_| invalid())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An event duration as an hours/minutes/seconds triple.
///
/// Displays and parses as `"{h}h {m}m {s}s"`, which is also its serialized
/// form. Hours are unbounded; minutes and seconds must be below 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationSpec {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl DurationSpec {
    /// Creates a duration after validating the minute/second ranges.
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, ValidationError> {
        if minutes > 59 || seconds > 59 {
            return Err(ValidationError::DurationOutOfRange {
                hours,
                minutes,
                seconds,
            });
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// The hour component.
    #[must_use]
    pub const fn hours(self) -> u32 {
        self.hours
    }

    /// The minute component (0-59).
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.minutes
    }

    /// The second component (0-59).
    #[must_use]
    pub const fn seconds(self) -> u32 {
        self.seconds
    }

    /// Converts to an exact `chrono::Duration`.
    #[must_use]
    pub fn to_duration(self) -> chrono::Duration {
        chrono::Duration::seconds(
            i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds),
        )
    }
}

impl fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

impl std::str::FromStr for DurationSpec {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDuration {
            value: s.to_string(),
        };
        let mut parts = s.split_whitespace();
        let mut component = |suffix: char| -> Result<u32, ValidationError> {
            parts
                .next()
                .and_then(|p| p.strip_suffix(suffix))
                .and_then(|p| p.parse().ok())
                .ok_or_else(invalid)
        };
        let hours = component('h')?;
        let minutes = component('m')?;
        let seconds = component('s')?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Self::new(hours, minutes, seconds).map_err(|_| invalid())
    }
}

impl Serialize for DurationSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DurationSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabler_id_rejects_empty() {
        assert!(EnablerId::new("").is_err());
        assert!(EnablerId::new("nightly-load").is_ok());
    }

    #[test]
    fn event_id_rejects_empty() {
        assert!(EventId::new("").is_err());
        assert!(EventId::new("warehouse-sync").is_ok());
    }

    #[test]
    fn event_id_serde_roundtrip() {
        let id = EventId::new("sync-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sync-1\"");
        let parsed: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn event_id_serde_rejects_empty() {
        let result: Result<EventId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn time_of_day_validates_range() {
        assert!(TimeOfDay::new(0, 0).is_ok());
        assert!(TimeOfDay::new(23, 59).is_ok());
        assert!(TimeOfDay::new(24, 0).is_err());
        assert!(TimeOfDay::new(10, 60).is_err());
    }

    #[test]
    fn time_of_day_displays_unpadded_hour() {
        let t = TimeOfDay::new(9, 5).unwrap();
        assert_eq!(t.to_string(), "9:05");
        let t = TimeOfDay::new(14, 30).unwrap();
        assert_eq!(t.to_string(), "14:30");
    }

    #[test]
    fn time_of_day_parses_display_form() {
        let t: TimeOfDay = "10:27".parse().unwrap();
        assert_eq!((t.hours(), t.minutes()), (10, 27));
        let t: TimeOfDay = "9:05".parse().unwrap();
        assert_eq!((t.hours(), t.minutes()), (9, 5));

        assert!("".parse::<TimeOfDay>().is_err());
        assert!("1027".parse::<TimeOfDay>().is_err());
        assert!("25:00".parse::<TimeOfDay>().is_err());
        assert!("10:ab".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_serde_uses_string_form() {
        let t = TimeOfDay::new(10, 27).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"10:27\"");
        let parsed: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn time_of_day_since_midnight() {
        let t = TimeOfDay::new(10, 27).unwrap();
        assert_eq!(t.since_midnight(), chrono::Duration::minutes(627));
    }

    #[test]
    fn duration_validates_components() {
        assert!(DurationSpec::new(0, 0, 0).is_ok());
        assert!(DurationSpec::new(100, 59, 59).is_ok());
        assert!(DurationSpec::new(0, 60, 0).is_err());
        assert!(DurationSpec::new(0, 0, 60).is_err());
    }

    #[test]
    fn duration_converts_exactly() {
        let d = DurationSpec::new(1, 30, 15).unwrap();
        assert_eq!(d.to_duration(), chrono::Duration::seconds(5415));
    }

    #[test]
    fn duration_parses_display_form() {
        let d: DurationSpec = "1h 30m 15s".parse().unwrap();
        assert_eq!((d.hours(), d.minutes(), d.seconds()), (1, 30, 15));
        assert_eq!(d.to_string(), "1h 30m 15s");

        assert!("1h 30m".parse::<DurationSpec>().is_err());
        assert!("1h 30m 15s extra".parse::<DurationSpec>().is_err());
        assert!("1x 30m 15s".parse::<DurationSpec>().is_err());
        assert!("0h 75m 0s".parse::<DurationSpec>().is_err());
    }

    #[test]
    fn duration_serde_uses_string_form() {
        let d = DurationSpec::new(0, 7, 0).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"0h 7m 0s\"");
        let parsed: DurationSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, d);
    }
}
