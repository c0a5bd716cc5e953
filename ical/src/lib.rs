// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Parse and serialize calendar events in the iCalendar (RFC 5545) text format.
//!
//! This crate is the pure text layer of calport: it turns an `.ics` document
//! into a sequence of [`EventRecord`]s and back, handling line unfolding and
//! folding, property parameters, text escaping, and the date-only/date-time
//! value variants. It performs no I/O and tolerates unrecognized input by
//! skipping it.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod datetime;
mod escape;
mod event;
mod line;
mod parser;
mod serializer;

pub use crate::datetime::{DateRange, LooseDateTime};
pub use crate::escape::{escape_text, unescape_text};
pub use crate::event::{
    Attendee, DEFAULT_TITLE, EventRecord, EventStatus, Organizer, Recurrence, RecurrenceRule,
    Reminder, TimeTransparency, generate_uid,
};
pub use crate::line::{ContentLine, fold_line, unfold};
pub use crate::parser::parse;
pub use crate::serializer::export;
