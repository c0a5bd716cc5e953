// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::event::EventRecord;

const STABLE_FORMAT_DATEONLY: &str = "%Y-%m-%d";
const STABLE_FORMAT_FLOATING: &str = "%Y-%m-%dT%H:%M:%S";
const STABLE_FORMAT_LOCAL: &str = "%Y-%m-%dT%H:%M:%S%z";

const ICS_FORMAT_DATEONLY: &str = "%Y%m%d";
const ICS_FORMAT_DATETIME: &str = "%Y%m%dT%H%M%S";

/// A date and time that may be in different formats, such as date only,
/// floating time, or local time with timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LooseDateTime {
    /// Date only without time.
    DateOnly(NaiveDate),

    /// Floating date and time without timezone.
    Floating(NaiveDateTime),

    /// Local date and time with timezone.
    /// NOTE: This is always in the local timezone of the system running the code.
    Local(DateTime<Local>),
}

impl LooseDateTime {
    /// Returns the date part.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        match self {
            LooseDateTime::DateOnly(d) => *d,
            LooseDateTime::Floating(dt) => dt.date(),
            LooseDateTime::Local(dt) => dt.date_naive(),
        }
    }

    /// Returns the time part, if available.
    #[must_use]
    pub fn time(&self) -> Option<NaiveTime> {
        match self {
            LooseDateTime::DateOnly(_) => None,
            LooseDateTime::Floating(dt) => Some(dt.time()),
            LooseDateTime::Local(dt) => Some(dt.time()),
        }
    }

    /// Converts to a datetime with default start time (00:00:00) if time is missing.
    #[must_use]
    pub fn with_start_of_day(&self) -> NaiveDateTime {
        NaiveDateTime::new(self.date(), self.time().unwrap_or(NaiveTime::MIN))
    }

    /// Converts to a datetime with default end time (23:59:59) if time is missing.
    #[must_use]
    pub fn with_end_of_day(&self) -> NaiveDateTime {
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        NaiveDateTime::new(self.date(), self.time().unwrap_or(end))
    }

    /// Parses an iCalendar date or date-time value.
    ///
    /// Date-only values are exactly 8 digits (`YYYYMMDD`). Date-time values
    /// follow `YYYYMMDDTHHMMSS`, optionally suffixed with `Z` for UTC clock
    /// fields (converted to the local zone). A leading `TZID=<name>:` prefix
    /// is stripped; named-timezone resolution is not attempted beyond that.
    #[must_use]
    pub fn parse_ics(value: &str, date_only: bool) -> Option<Self> {
        let value = match value.strip_prefix("TZID=") {
            Some(rest) => rest.split_once(':').map_or(rest, |(_, v)| v),
            None => value,
        };

        if date_only || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())) {
            return NaiveDate::parse_from_str(value, ICS_FORMAT_DATEONLY)
                .map(Self::DateOnly)
                .ok();
        }

        match value.strip_suffix('Z') {
            Some(utc) => NaiveDateTime::parse_from_str(utc, ICS_FORMAT_DATETIME)
                .map(|dt| Self::Local(Utc.from_utc_datetime(&dt).with_timezone(&Local)))
                .ok(),
            None => NaiveDateTime::parse_from_str(value, ICS_FORMAT_DATETIME)
                .map(Self::Floating)
                .ok(),
        }
    }

    /// Formats as an iCalendar value: `YYYYMMDD` for date-only variants,
    /// `YYYYMMDDTHHMMSS` in local clock fields otherwise (no `Z` suffix).
    #[must_use]
    pub fn format_ics(&self) -> String {
        match self {
            LooseDateTime::DateOnly(d) => d.format(ICS_FORMAT_DATEONLY).to_string(),
            LooseDateTime::Floating(dt) => dt.format(ICS_FORMAT_DATETIME).to_string(),
            LooseDateTime::Local(dt) => dt.naive_local().format(ICS_FORMAT_DATETIME).to_string(),
        }
    }

    /// Formats as an iCalendar `VALUE=DATE` value, dropping any time part.
    #[must_use]
    pub fn format_ics_date(&self) -> String {
        self.date().format(ICS_FORMAT_DATEONLY).to_string()
    }

    pub(crate) fn format_stable(&self) -> String {
        match self {
            LooseDateTime::DateOnly(d) => d.format(STABLE_FORMAT_DATEONLY).to_string(),
            LooseDateTime::Floating(dt) => dt.format(STABLE_FORMAT_FLOATING).to_string(),
            LooseDateTime::Local(dt) => dt.format(STABLE_FORMAT_LOCAL).to_string(),
        }
    }

    pub(crate) fn parse_stable(s: &str) -> Option<Self> {
        match s.len() {
            // 2006-01-02
            10 => NaiveDate::parse_from_str(s, STABLE_FORMAT_DATEONLY)
                .map(Self::DateOnly)
                .ok(),

            // 2006-01-02T15:04:05
            19 => NaiveDateTime::parse_from_str(s, STABLE_FORMAT_FLOATING)
                .map(Self::Floating)
                .ok(),

            // 2006-01-02T15:04:05+0000
            20.. => DateTime::parse_from_str(s, STABLE_FORMAT_LOCAL)
                .map(|a| Self::Local(a.with_timezone(&Local)))
                .ok(),

            _ => None,
        }
    }
}

impl From<NaiveDate> for LooseDateTime {
    fn from(d: NaiveDate) -> Self {
        LooseDateTime::DateOnly(d)
    }
}

impl From<NaiveDateTime> for LooseDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        LooseDateTime::Floating(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for LooseDateTime {
    fn from(dt: DateTime<Tz>) -> Self {
        LooseDateTime::Local(dt.with_timezone(&Local))
    }
}

impl Serialize for LooseDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format_stable())
    }
}

impl<'de> Deserialize<'de> for LooseDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_stable(&s)
            .ok_or_else(|| D::Error::custom(format!("unrecognized date/time: {s}")))
    }
}

/// An inclusive date/time range used by filters and import/export options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start of the range.
    pub start: LooseDateTime,

    /// End of the range.
    pub end: LooseDateTime,
}

impl DateRange {
    /// Whether the event's `[start, end]` interval overlaps this range.
    ///
    /// A missing event end is treated as equal to its start. The test is
    /// inclusive and also accepts an event interval that fully contains the
    /// range. Events without a start never overlap. Inverted intervals are
    /// compared as-is; ordering of `start`/`end` is not enforced anywhere.
    #[must_use]
    pub fn overlaps_event(&self, event: &EventRecord) -> bool {
        let Some(start) = &event.start else {
            return false;
        };
        let end = event.end.as_ref().unwrap_or(start);

        let event_start = start.with_start_of_day();
        let event_end = end.with_end_of_day();
        event_start <= self.end.with_end_of_day() && event_end >= self.start.with_start_of_day()
    }
}
