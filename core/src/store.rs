// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! Collaborator contracts for calendar state and read-only event access.

use calport_ical::EventRecord;

use crate::error::CoreError;

/// Read-only access to an event collection, the collaborator consumed by the
/// search engine.
pub trait EventSource {
    /// All events in the collection.
    fn all_events(&self) -> Vec<EventRecord>;
}

/// The calendar-state collaborator: the sole authority for persisted identity
/// and lifetime of events. The import/export handler reconciles parsed
/// documents against this contract.
///
/// Mutating operations are fallible so that stores backed by real persistence
/// can report failures; the handler records such failures per event without
/// aborting a batch.
pub trait CalendarStore {
    /// Looks up an event by id.
    fn get_event(&self, id: &str) -> Option<EventRecord>;

    /// All stored events, in insertion order.
    fn events(&self) -> Vec<EventRecord>;

    /// Adds an event, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the record.
    fn add_event(&mut self, event: EventRecord) -> Result<EventRecord, CoreError>;

    /// Replaces the event with the given id, returning the stored record, or
    /// `None` when no such event exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the update.
    fn update_event(&mut self, id: &str, event: EventRecord)
    -> Result<Option<EventRecord>, CoreError>;

    /// Removes an event by id. Returns whether anything was removed.
    fn remove_event(&mut self, id: &str) -> bool;
}

/// An in-memory [`CalendarStore`] keeping insertion order. The default
/// collaborator for tests and for embedders without their own state layer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<EventRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl CalendarStore for MemoryStore {
    fn get_event(&self, id: &str) -> Option<EventRecord> {
        self.events.iter().find(|e| e.id == id).cloned()
    }

    fn events(&self) -> Vec<EventRecord> {
        self.events.clone()
    }

    fn add_event(&mut self, event: EventRecord) -> Result<EventRecord, CoreError> {
        self.events.push(event.clone());
        Ok(event)
    }

    fn update_event(
        &mut self,
        id: &str,
        event: EventRecord,
    ) -> Result<Option<EventRecord>, CoreError> {
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(slot) => {
                let mut event = event;
                event.id = id.to_string();
                *slot = event.clone();
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    fn remove_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }
}

impl EventSource for MemoryStore {
    fn all_events(&self) -> Vec<EventRecord> {
        self.events.clone()
    }
}

impl EventSource for Vec<EventRecord> {
    fn all_events(&self) -> Vec<EventRecord> {
        self.clone()
    }
}
