// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar document serializer.
//!
//! Emits a `VCALENDAR` envelope with one `VEVENT` block per record, applies
//! RFC 5545 text escaping and 75-character line folding, and joins physical
//! lines with CRLF.

use chrono::Local;

use crate::escape::escape_text;
use crate::event::{DEFAULT_TITLE, EventRecord, Recurrence, generate_uid};
use crate::line::fold_line;

const PRODID: &str = concat!("-//calport//calport-ical ", env!("CARGO_PKG_VERSION"), "//EN");

/// Serializes events into a complete iCalendar document.
///
/// Every event gets a `UID` (existing id or freshly generated) and a
/// `DTSTAMP` at the export instant. Start and end use the `VALUE=DATE` form
/// for all-day events and the `TZID=<zone>` form otherwise, where the zone is
/// the event's declared timezone or the ambient system timezone.
#[must_use]
pub fn export(events: &[EventRecord], calendar_name: &str) -> String {
    let mut lines: Vec<String> = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{PRODID}"),
        format!("X-WR-CALNAME:{calendar_name}"),
        "METHOD:PUBLISH".to_string(),
    ];

    let stamp = Local::now().naive_local().format("%Y%m%dT%H%M%S").to_string();
    for event in events {
        write_event(&mut lines, event, &stamp);
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = lines
        .iter()
        .map(|line| fold_line(line))
        .collect::<Vec<_>>()
        .join("\r\n");
    out.push_str("\r\n");
    out
}

fn write_event(lines: &mut Vec<String>, event: &EventRecord, stamp: &str) {
    lines.push("BEGIN:VEVENT".to_string());

    if event.id.is_empty() {
        lines.push(format!("UID:{}", generate_uid()));
    } else {
        lines.push(format!("UID:{}", event.id));
    }
    lines.push(format!("DTSTAMP:{stamp}"));

    if let Some(start) = &event.start {
        lines.push(format_date_property("DTSTART", start, event));
    }
    if let Some(end) = &event.end {
        lines.push(format_date_property("DTEND", end, event));
    }

    if !event.title.is_empty() {
        lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
    }
    if let Some(description) = &event.description {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    if let Some(location) = &event.location {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }

    lines.push(format!("STATUS:{}", event.status));
    lines.push(format!("TRANSP:{}", event.show_as));

    if let Some(category) = &event.category {
        lines.push(format!("CATEGORIES:{category}"));
    }
    if let Some(organizer) = &event.organizer {
        lines.push(format!("ORGANIZER:mailto:{}", organizer.email));
    }
    for attendee in &event.attendees {
        lines.push(format!("ATTENDEE:mailto:{}", attendee.email));
    }

    match &event.recurrence {
        Some(Recurrence::Raw(raw)) if raw.starts_with("RRULE:") => lines.push(raw.clone()),
        Some(Recurrence::Raw(raw)) => lines.push(format!("RRULE:{raw}")),
        Some(Recurrence::Rule(rule)) => lines.push(format!("RRULE:{}", rule.encode())),
        None => {}
    }

    for reminder in &event.reminders {
        let description = match event.title.as_str() {
            "" => DEFAULT_TITLE,
            title => title,
        };
        lines.push("BEGIN:VALARM".to_string());
        lines.push("ACTION:DISPLAY".to_string());
        lines.push(format!("TRIGGER:-PT{}M", reminder.minutes));
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        lines.push("END:VALARM".to_string());
    }

    lines.push("END:VEVENT".to_string());
}

fn format_date_property(
    name: &str,
    value: &crate::datetime::LooseDateTime,
    event: &EventRecord,
) -> String {
    if event.all_day {
        format!("{name};VALUE=DATE:{}", value.format_ics_date())
    } else {
        let zone = resolve_zone(event);
        format!("{name};TZID={zone}:{}", value.format_ics())
    }
}

fn resolve_zone(event: &EventRecord) -> String {
    if let Some(timezone) = &event.timezone {
        return timezone.clone();
    }
    iana_time_zone::get_timezone().unwrap_or_else(|_| {
        tracing::warn!("failed to resolve system timezone, using UTC");
        "UTC".to_string()
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::datetime::LooseDateTime;
    use crate::event::{Attendee, EventStatus, RecurrenceRule, Reminder, TimeTransparency};

    fn datetime(y: i32, m: u32, d: u32, h: u32, mm: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mm, s)
            .unwrap()
    }

    fn standup() -> EventRecord {
        EventRecord {
            id: "1".to_string(),
            title: "Standup".to_string(),
            start: Some(LooseDateTime::Floating(datetime(2024, 1, 15, 9, 0, 0))),
            end: Some(LooseDateTime::Floating(datetime(2024, 1, 15, 9, 30, 0))),
            timezone: Some("Europe/Berlin".to_string()),
            ..EventRecord::default()
        }
    }

    fn logical_lines(ics: &str) -> Vec<String> {
        crate::line::unfold(ics)
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn envelope_structure() {
        let ics = export(&[], "Team");
        let lines = logical_lines(&ics);

        assert_eq!(lines[0], "BEGIN:VCALENDAR");
        assert_eq!(lines[1], "VERSION:2.0");
        assert!(lines[2].starts_with("PRODID:"));
        assert_eq!(lines[3], "X-WR-CALNAME:Team");
        assert_eq!(lines[4], "METHOD:PUBLISH");
        assert_eq!(lines.last().unwrap(), "END:VCALENDAR");
        assert!(ics.ends_with("\r\n"));
    }

    #[test]
    fn event_block_with_zone() {
        let ics = export(&[standup()], "Cal");
        let lines = logical_lines(&ics);

        assert!(lines.contains(&"UID:1".to_string()));
        assert!(lines.contains(&"DTSTART;TZID=Europe/Berlin:20240115T090000".to_string()));
        assert!(lines.contains(&"DTEND;TZID=Europe/Berlin:20240115T093000".to_string()));
        assert!(lines.contains(&"SUMMARY:Standup".to_string()));
        assert!(lines.contains(&"STATUS:CONFIRMED".to_string()));
        assert!(lines.contains(&"TRANSP:OPAQUE".to_string()));
    }

    #[test]
    fn all_day_uses_value_date() {
        let event = EventRecord {
            id: "d".to_string(),
            title: "Holiday".to_string(),
            start: Some(LooseDateTime::DateOnly(
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            )),
            all_day: true,
            ..EventRecord::default()
        };
        let ics = export(&[event], "Cal");
        assert!(ics.contains("DTSTART;VALUE=DATE:20240701"));
    }

    #[test]
    fn status_and_transp_tokens() {
        let event = EventRecord {
            id: "s".to_string(),
            title: "X".to_string(),
            status: EventStatus::Cancelled,
            show_as: TimeTransparency::Free,
            ..EventRecord::default()
        };
        let ics = export(&[event], "Cal");
        assert!(ics.contains("STATUS:CANCELLED"));
        assert!(ics.contains("TRANSP:TRANSPARENT"));
    }

    #[test]
    fn attendees_and_organizer_as_mailto() {
        let mut event = standup();
        event.organizer = Some(crate::event::Organizer {
            email: "boss@example.com".to_string(),
            name: None,
        });
        event.attendees = vec![
            Attendee {
                email: "ana@example.com".to_string(),
                name: None,
            },
            Attendee {
                email: "bob@example.com".to_string(),
                name: None,
            },
        ];

        let ics = export(&[event], "Cal");
        assert!(ics.contains("ORGANIZER:mailto:boss@example.com"));
        assert!(ics.contains("ATTENDEE:mailto:ana@example.com"));
        assert!(ics.contains("ATTENDEE:mailto:bob@example.com"));
    }

    #[test]
    fn rrule_prefix_normalized() {
        let mut event = standup();
        event.recurrence = Some(Recurrence::Raw("FREQ=DAILY".to_string()));
        let ics = export(&[event.clone()], "Cal");
        assert!(ics.contains("RRULE:FREQ=DAILY"));

        event.recurrence = Some(Recurrence::Raw("RRULE:FREQ=DAILY".to_string()));
        let ics = export(&[event.clone()], "Cal");
        assert!(ics.contains("RRULE:FREQ=DAILY"));
        assert!(!ics.contains("RRULE:RRULE:"));

        event.recurrence = Some(Recurrence::Rule(RecurrenceRule {
            freq: "WEEKLY".to_string(),
            interval: Some(2),
            ..RecurrenceRule::default()
        }));
        let ics = export(&[event], "Cal");
        assert!(ics.contains("RRULE:FREQ=WEEKLY;INTERVAL=2"));
    }

    #[test]
    fn reminders_become_display_alarms() {
        let mut event = standup();
        event.reminders = vec![Reminder { minutes: 10 }, Reminder { minutes: 60 }];

        let ics = export(&[event], "Cal");
        let lines = logical_lines(&ics);

        let alarm_count = lines.iter().filter(|l| *l == "BEGIN:VALARM").count();
        assert_eq!(alarm_count, 2);
        assert!(lines.contains(&"TRIGGER:-PT10M".to_string()));
        assert!(lines.contains(&"TRIGGER:-PT60M".to_string()));
        assert!(lines.contains(&"DESCRIPTION:Standup".to_string()));
    }

    #[test]
    fn long_lines_are_folded() {
        let mut event = standup();
        event.title = "t".repeat(120);

        let ics = export(&[event], "Cal");
        for physical in ics.split("\r\n") {
            assert!(
                physical.chars().count() <= 75,
                "physical line exceeds 75 chars: {physical}"
            );
        }
    }
}
