// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! The canonical event record exchanged by every calport component.

use std::fmt::Display;
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::datetime::LooseDateTime;

/// Placeholder title assigned when an event has none.
pub const DEFAULT_TITLE: &str = "Untitled Event";

/// A calendar event, the unit produced by parsing and consumed by
/// serialization, search, and import/export.
///
/// Records are ephemeral value objects: transformations produce new records
/// rather than mutating shared state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    /// Unique identifier within a collection. Generated when absent from input.
    pub id: String,

    /// Event title; defaults to [`DEFAULT_TITLE`] when absent.
    pub title: String,

    /// Free-form description, if available.
    pub description: Option<String>,

    /// Location, if available.
    pub location: Option<String>,

    /// Primary category, if available.
    pub category: Option<String>,

    /// Additional categories, consulted alongside `category` by filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Start of the event, a date or a date-time.
    pub start: Option<LooseDateTime>,

    /// End of the event; treated as equal to `start` when absent.
    /// Never validated against `start`.
    pub end: Option<LooseDateTime>,

    /// Whether the event covers whole calendar days without a time-of-day.
    pub all_day: bool,

    /// Scheduling status.
    pub status: EventStatus,

    /// Free/busy transparency.
    pub show_as: TimeTransparency,

    /// Organizer, if available.
    pub organizer: Option<Organizer>,

    /// Attendees in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,

    /// Recurrence expression, raw or structured.
    pub recurrence: Option<Recurrence>,

    /// Reminder offsets before `start`, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<Reminder>,

    /// Declared timezone name, used when serializing date-times.
    pub timezone: Option<String>,
}

impl EventRecord {
    /// The end of the event, falling back to its start for range math.
    #[must_use]
    pub fn effective_end(&self) -> Option<&LooseDateTime> {
        self.end.as_ref().or(self.start.as_ref())
    }

    /// Whether the event carries a recurrence expression.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// Generates a unique event id: a time-based component joined with a random
/// component and a fixed suffix, distinct across calls within the process.
#[must_use]
pub fn generate_uid() -> String {
    let millis = Local::now().timestamp_millis();
    format!("{millis}-{}@calport", Uuid::new_v4().simple())
}

/// The status of an event, which can be tentative, confirmed, or cancelled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The event is tentative.
    Tentative,

    /// The event is confirmed.
    #[default]
    Confirmed,

    /// The event is cancelled.
    Cancelled,
}

const STATUS_TENTATIVE: &str = "TENTATIVE";
const STATUS_CONFIRMED: &str = "CONFIRMED";
const STATUS_CANCELLED: &str = "CANCELLED";

impl AsRef<str> for EventStatus {
    fn as_ref(&self) -> &str {
        match self {
            EventStatus::Tentative => STATUS_TENTATIVE,
            EventStatus::Confirmed => STATUS_CONFIRMED,
            EventStatus::Cancelled => STATUS_CANCELLED,
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for EventStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            STATUS_TENTATIVE => Ok(EventStatus::Tentative),
            STATUS_CONFIRMED => Ok(EventStatus::Confirmed),
            STATUS_CANCELLED => Ok(EventStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// Free/busy transparency, the `TRANSP` property.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeTransparency {
    /// The event blocks time (`OPAQUE`).
    #[default]
    Busy,

    /// The event does not block time (`TRANSPARENT`).
    Free,
}

impl AsRef<str> for TimeTransparency {
    fn as_ref(&self) -> &str {
        match self {
            TimeTransparency::Busy => "OPAQUE",
            TimeTransparency::Free => "TRANSPARENT",
        }
    }
}

impl Display for TimeTransparency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// The event organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    /// Email address (or bare name when the source carried no address).
    pub email: String,

    /// Display name, if available.
    pub name: Option<String>,
}

/// A single attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Email address.
    pub email: String,

    /// Display name; derived from the address when the source carries none.
    pub name: Option<String>,
}

/// A reminder offset relative to the event start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Minutes before the event start.
    pub minutes: i64,
}

/// A recurrence expression, either kept as the raw encoded rule or as a
/// structured rule ready for re-encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recurrence {
    /// A structured rule.
    Rule(RecurrenceRule),

    /// The raw `RRULE` value as parsed, e.g. `FREQ=WEEKLY;BYDAY=MO`.
    Raw(String),
}

/// A structured recurrence rule. Only the present sub-fields are encoded,
/// in the fixed order FREQ, INTERVAL, COUNT, UNTIL, BYDAY, BYMONTH.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceRule {
    /// Frequency keyword, e.g. `DAILY`, `WEEKLY`, `MONTHLY`.
    pub freq: String,

    /// Interval between occurrences.
    pub interval: Option<u32>,

    /// Number of occurrences.
    pub count: Option<u32>,

    /// End of the recurrence, an encoded date or date-time.
    pub until: Option<String>,

    /// Day-of-week constraint, e.g. `MO,WE,FR`.
    pub by_day: Option<String>,

    /// Month constraint, e.g. `1,7`.
    pub by_month: Option<String>,
}

impl RecurrenceRule {
    /// Encodes the rule as an `RRULE` value.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.freq)];
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={interval}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(until) = &self.until {
            parts.push(format!("UNTIL={until}"));
        }
        if let Some(by_day) = &self.by_day {
            parts.push(format!("BYDAY={by_day}"));
        }
        if let Some(by_month) = &self.by_month {
            parts.push(format!("BYMONTH={by_month}"));
        }
        parts.join(";")
    }
}
