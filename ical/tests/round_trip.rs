// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Round-trip tests for the iCalendar parser and serializer.
//!
//! These tests verify that exporting event records and parsing the output
//! reproduces the original field values.

use calport_ical::{
    EventRecord, LooseDateTime, escape_text, export, parse, unescape_text, unfold,
};
use chrono::{NaiveDate, NaiveDateTime};

fn datetime(y: i32, m: u32, d: u32, h: u32, mm: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, mm, s)
        .unwrap()
}

fn wall_clock(dt: &LooseDateTime) -> NaiveDateTime {
    dt.with_start_of_day()
}

#[test]
fn round_trip_datetime_event() {
    let event = EventRecord {
        id: "rt-1".to_string(),
        title: "Standup".to_string(),
        start: Some(LooseDateTime::Floating(datetime(2024, 1, 15, 9, 0, 0))),
        end: Some(LooseDateTime::Floating(datetime(2024, 1, 15, 9, 30, 0))),
        ..EventRecord::default()
    };

    let ics = export(std::slice::from_ref(&event), "Cal");
    let parsed = parse(&ics);

    assert_eq!(parsed.len(), 1);
    let back = &parsed[0];
    assert_eq!(back.id, event.id);
    assert_eq!(back.title, event.title);
    assert!(!back.all_day);
    assert_eq!(
        wall_clock(back.start.as_ref().unwrap()),
        wall_clock(event.start.as_ref().unwrap())
    );
    assert_eq!(
        wall_clock(back.end.as_ref().unwrap()),
        wall_clock(event.end.as_ref().unwrap())
    );
}

#[test]
fn round_trip_all_day_event() {
    let event = EventRecord {
        id: "rt-2".to_string(),
        title: "Holiday".to_string(),
        start: Some(LooseDateTime::DateOnly(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )),
        all_day: true,
        ..EventRecord::default()
    };

    let ics = export(std::slice::from_ref(&event), "Cal");
    assert!(ics.contains("DTSTART;VALUE=DATE:20240701"));

    let parsed = parse(&ics);
    assert_eq!(parsed.len(), 1);
    assert!(parsed[0].all_day);
    assert_eq!(parsed[0].start, event.start);
}

#[test]
fn round_trip_optional_fields() {
    let event = EventRecord {
        id: "rt-3".to_string(),
        title: "Review".to_string(),
        description: Some("Quarterly numbers; bring coffee".to_string()),
        location: Some("Room 4, west wing".to_string()),
        category: Some("Work".to_string()),
        start: Some(LooseDateTime::Floating(datetime(2024, 3, 1, 14, 0, 0))),
        ..EventRecord::default()
    };

    let parsed = parse(&export(std::slice::from_ref(&event), "Cal"));
    let back = &parsed[0];
    assert_eq!(back.description, event.description);
    assert_eq!(back.location, event.location);
    assert_eq!(back.category, event.category);
}

#[test]
fn round_trip_folded_long_title() {
    let title = "A planning session about the planning of future planning sessions, \
                 held quarterly and attended by everyone who plans"
        .to_string();
    assert!(title.len() > 75);

    let event = EventRecord {
        id: "rt-4".to_string(),
        title: title.clone(),
        start: Some(LooseDateTime::Floating(datetime(2024, 5, 5, 10, 0, 0))),
        ..EventRecord::default()
    };

    let ics = export(&[event], "Cal");

    // Folded continuations carry exactly one leading space
    let mut saw_continuation = false;
    for physical in ics.split("\r\n") {
        assert!(physical.chars().count() <= 75);
        if physical.starts_with(' ') {
            saw_continuation = true;
        }
    }
    assert!(saw_continuation, "expected at least one folded line");

    let parsed = parse(&ics);
    assert_eq!(parsed[0].title, title);
}

#[test]
fn folding_markers_removed_by_unfold() {
    let folded = "DESCRIPTION:abc\r\n def\r\n ghi";
    assert_eq!(unfold(folded), "DESCRIPTION:abcdefghi");
}

#[test]
fn escape_inverse_law() {
    let title = "a,b;c\\d\ne";
    assert_eq!(unescape_text(&escape_text(title)), title);
}

#[test]
fn round_trip_escaped_title() {
    let event = EventRecord {
        id: "rt-5".to_string(),
        title: "Lunch, then sync; maybe\nor not".to_string(),
        start: Some(LooseDateTime::Floating(datetime(2024, 6, 6, 12, 0, 0))),
        ..EventRecord::default()
    };

    let parsed = parse(&export(std::slice::from_ref(&event), "Cal"));
    assert_eq!(parsed[0].title, event.title);
}

#[test]
fn round_trip_crlf_document_order() {
    let make = |id: &str, title: &str| EventRecord {
        id: id.to_string(),
        title: title.to_string(),
        start: Some(LooseDateTime::Floating(datetime(2024, 2, 2, 8, 0, 0))),
        ..EventRecord::default()
    };
    let events = vec![make("a", "First"), make("b", "Second"), make("c", "Third")];

    let parsed = parse(&export(&events, "Cal"));
    let ids: Vec<&str> = parsed.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}
