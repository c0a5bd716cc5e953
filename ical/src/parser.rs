// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar document parser.
//!
//! The parser is total: malformed lines and unrecognized properties are
//! skipped, an unterminated `VEVENT` is dropped, and every finalized event
//! is normalized to carry an id and a title.

use crate::datetime::LooseDateTime;
use crate::escape::unescape_text;
use crate::event::{
    Attendee, DEFAULT_TITLE, EventRecord, Organizer, Recurrence, TimeTransparency, generate_uid,
};
use crate::line::{ContentLine, unfold};

/// Parses an iCalendar document into event records, in document order.
///
/// Accepts CRLF or LF line breaks and folded lines. Properties inside a
/// `VALARM` block are recognized structurally but not parsed into the record.
#[must_use]
pub fn parse(text: &str) -> Vec<EventRecord> {
    let unfolded = unfold(text);

    let mut events = Vec::new();
    let mut current: Option<EventRecord> = None;
    let mut in_alarm = false;

    for line in unfolded.lines() {
        match line {
            "BEGIN:VEVENT" => {
                current = Some(EventRecord::default());
                in_alarm = false;
            }
            "END:VEVENT" => {
                if let Some(mut event) = current.take() {
                    normalize(&mut event);
                    events.push(event);
                }
                in_alarm = false;
            }
            "BEGIN:VALARM" => {
                if current.is_some() {
                    in_alarm = true;
                }
            }
            "END:VALARM" => {
                in_alarm = false;
            }
            _ => {
                if in_alarm {
                    continue;
                }
                if let Some(event) = current.as_mut() {
                    apply_property(event, line);
                }
            }
        }
    }

    if current.is_some() {
        tracing::debug!("dropping unterminated VEVENT at end of document");
    }

    events
}

fn apply_property(event: &mut EventRecord, line: &str) {
    let Some(prop) = ContentLine::split(line) else {
        tracing::debug!(line, "skipping malformed content line");
        return;
    };

    match prop.name {
        "SUMMARY" => event.title = unescape_text(prop.value),
        "DESCRIPTION" => event.description = Some(unescape_text(prop.value)),
        "LOCATION" => event.location = Some(unescape_text(prop.value)),
        "DTSTART" => {
            if let Some(tzid) = prop.tzid() {
                event.timezone = Some(tzid.to_string());
            }
            match LooseDateTime::parse_ics(prop.value, prop.is_date_value()) {
                Some(dt) => {
                    event.all_day = matches!(dt, LooseDateTime::DateOnly(_));
                    event.start = Some(dt);
                }
                None => tracing::debug!(value = prop.value, "skipping unparseable DTSTART"),
            }
        }
        "DTEND" => match LooseDateTime::parse_ics(prop.value, prop.is_date_value()) {
            Some(dt) => event.end = Some(dt),
            None => tracing::debug!(value = prop.value, "skipping unparseable DTEND"),
        },
        "UID" => event.id = prop.value.to_string(),
        "CATEGORIES" => {
            // Only the first comma-separated value is kept
            if let Some(first) = prop.value.split(',').next()
                && !first.is_empty()
            {
                event.category = Some(first.to_string());
            }
        }
        "STATUS" => event.status = prop.value.parse().unwrap_or_default(),
        "TRANSP" => {
            event.show_as = match prop.value {
                "TRANSPARENT" => TimeTransparency::Free,
                _ => TimeTransparency::Busy,
            };
        }
        "ORGANIZER" => {
            event.organizer = Some(Organizer {
                email: strip_mailto(prop.value).to_string(),
                name: None,
            });
        }
        "ATTENDEE" => {
            let email = strip_mailto(prop.value);
            event.attendees.push(Attendee {
                email: email.to_string(),
                name: email.split('@').next().map(str::to_string),
            });
        }
        "RRULE" => event.recurrence = Some(Recurrence::Raw(prop.value.to_string())),
        _ => {} // unrecognized properties are ignored for forward compatibility
    }
}

fn strip_mailto(value: &str) -> &str {
    value.strip_prefix("mailto:").unwrap_or(value)
}

fn normalize(event: &mut EventRecord) {
    if event.id.is_empty() {
        event.id = generate_uid();
    }
    if event.title.is_empty() {
        event.title = DEFAULT_TITLE.to_string();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::event::EventStatus;

    fn datetime(y: i32, m: u32, d: u32, h: u32, mm: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mm, s)
            .unwrap()
    }

    #[test]
    fn parses_minimal_event() {
        let ics = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Standup\r\n\
                   DTSTART:20240115T090000\r\nDTEND:20240115T093000\r\nEND:VEVENT\r\nEND:VCALENDAR";
        let events = parse(ics);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "1");
        assert_eq!(event.title, "Standup");
        assert_eq!(
            event.start,
            Some(LooseDateTime::Floating(datetime(2024, 1, 15, 9, 0, 0)))
        );
        assert_eq!(
            event.end,
            Some(LooseDateTime::Floating(datetime(2024, 1, 15, 9, 30, 0)))
        );
        assert!(!event.all_day);
    }

    #[test]
    fn parses_date_only_as_all_day() {
        let ics = "BEGIN:VEVENT\nUID:d1\nSUMMARY:Holiday\nDTSTART;VALUE=DATE:20240701\nEND:VEVENT";
        let events = parse(ics);

        assert_eq!(events.len(), 1);
        assert!(events[0].all_day);
        assert_eq!(
            events[0].start,
            Some(LooseDateTime::DateOnly(
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
            ))
        );
    }

    #[test]
    fn assigns_generated_id_and_placeholder_title() {
        let ics = "BEGIN:VEVENT\nDTSTART:20240115T090000\nEND:VEVENT";
        let events = parse(ics);

        assert_eq!(events.len(), 1);
        assert!(!events[0].id.is_empty());
        assert_eq!(events[0].title, DEFAULT_TITLE);
    }

    #[test]
    fn maps_status_transp_categories() {
        let ics = "BEGIN:VEVENT\nUID:2\nSUMMARY:X\nSTATUS:TENTATIVE\nTRANSP:TRANSPARENT\n\
                   CATEGORIES:Work,Personal\nEND:VEVENT";
        let events = parse(ics);

        let event = &events[0];
        assert_eq!(event.status, EventStatus::Tentative);
        assert_eq!(event.show_as, TimeTransparency::Free);
        assert_eq!(event.category.as_deref(), Some("Work"));
    }

    #[test]
    fn unknown_status_defaults_to_confirmed() {
        let ics = "BEGIN:VEVENT\nUID:3\nSTATUS:POSTPONED\nEND:VEVENT";
        let events = parse(ics);
        assert_eq!(events[0].status, EventStatus::Confirmed);
    }

    #[test]
    fn organizer_and_attendees_strip_mailto() {
        let ics = "BEGIN:VEVENT\nUID:4\nORGANIZER:mailto:boss@example.com\n\
                   ATTENDEE:mailto:ana@example.com\nATTENDEE:bob@example.com\nEND:VEVENT";
        let events = parse(ics);

        let event = &events[0];
        assert_eq!(event.organizer.as_ref().unwrap().email, "boss@example.com");
        assert_eq!(event.attendees.len(), 2);
        assert_eq!(event.attendees[0].email, "ana@example.com");
        assert_eq!(event.attendees[0].name.as_deref(), Some("ana"));
        assert_eq!(event.attendees[1].name.as_deref(), Some("bob"));
    }

    #[test]
    fn alarm_contents_are_skipped() {
        let ics = "BEGIN:VEVENT\nUID:5\nSUMMARY:With alarm\nBEGIN:VALARM\nACTION:DISPLAY\n\
                   DESCRIPTION:Not the event description\nTRIGGER:-PT10M\nEND:VALARM\nEND:VEVENT";
        let events = parse(ics);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "With alarm");
        assert_eq!(events[0].description, None);
    }

    #[test]
    fn rrule_kept_raw() {
        let ics = "BEGIN:VEVENT\nUID:6\nRRULE:FREQ=WEEKLY;BYDAY=MO\nEND:VEVENT";
        let events = parse(ics);
        assert_eq!(
            events[0].recurrence,
            Some(Recurrence::Raw("FREQ=WEEKLY;BYDAY=MO".to_string()))
        );
    }

    #[test]
    fn folded_lines_are_unfolded() {
        let ics = "BEGIN:VEVENT\r\nUID:7\r\nSUMMARY:A ridiculously long ti\r\n tle that was folded\r\nEND:VEVENT";
        let events = parse(ics);
        assert_eq!(
            events[0].title,
            "A ridiculously long title that was folded"
        );
    }

    #[test]
    fn unterminated_event_is_dropped() {
        let ics = "BEGIN:VEVENT\nUID:8\nSUMMARY:Half";
        assert!(parse(ics).is_empty());
    }

    #[test]
    fn malformed_lines_and_unknown_properties_skipped() {
        let ics = "BEGIN:VEVENT\nUID:9\nGARBAGE LINE WITHOUT SEPARATOR\nX-CUSTOM:ignored\nEND:VEVENT";
        let events = parse(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "9");
    }

    #[test]
    fn properties_outside_events_ignored() {
        let ics = "SUMMARY:Floating\nBEGIN:VEVENT\nUID:10\nEND:VEVENT";
        let events = parse(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, DEFAULT_TITLE);
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let ics = "BEGIN:VEVENT\nUID:11\nSUMMARY:Lunch\\, then sync\\; maybe\nEND:VEVENT";
        let events = parse(ics);
        assert_eq!(events[0].title, "Lunch, then sync; maybe");
    }
}
