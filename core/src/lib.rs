// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar import/export orchestration and in-memory event search.
//!
//! This crate sits on top of [`calport_ical`] and adds the policy layer: a
//! [`CalendarStore`] collaborator contract, an [`IcsHandler`] that reconciles
//! parsed events against a store with merge/update/skip policies, a
//! [`SearchEngine`] for query/filter/group operations, and a [`Subscription`]
//! that polls a remote calendar URL on an interval.

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

mod error;
mod handler;
mod search;
mod store;
mod subscribe;

pub use calport_ical::{
    Attendee, DateRange, EventRecord, EventStatus, LooseDateTime, Organizer, Recurrence,
    RecurrenceRule, Reminder, TimeTransparency,
};

pub use crate::error::CoreError;
pub use crate::handler::{
    ExportOptions, FailedEvent, IcsHandler, ImportOptions, ImportOutcome, ImportSource,
    RecurrenceExpander, SingleInstance, SkipReason, SkippedEvent, Validation, validate,
};
pub use crate::search::{
    EventFilters, EventGroup, GroupOptions, SearchEngine, SearchField, SearchOptions, SortBy,
    SuggestOptions, levenshtein,
};
pub use crate::store::{CalendarStore, EventSource, MemoryStore};
pub use crate::subscribe::{Subscription, SubscriptionConfig, SubscriptionStatus};
