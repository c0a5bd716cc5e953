// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! ICS import/export against a [`CalendarStore`], with merge, duplicate, and
//! filtering policies.

use std::fmt;
use std::path::PathBuf;

use calport_ical::{ContentLine, DateRange, EventRecord};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::CalendarStore;

/// Where the ICS text of an import comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Inline ICS text.
    Text(String),
    /// A file on disk, read with tokio.
    Path(PathBuf),
    /// A remote calendar URL, fetched over HTTP.
    Url(String),
}

/// Policies applied while reconciling parsed events against the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// When false, store events absent from the imported document are pruned
    /// after the import.
    pub merge: bool,

    /// When an incoming id already exists, replace the stored event instead
    /// of applying the duplicate policy.
    pub update_existing: bool,

    /// When an incoming id already exists and updates are off: skip it. With
    /// this also off, the incoming event is added under a cloned id.
    pub skip_duplicates: bool,

    /// Only import events overlapping this range.
    pub date_range: Option<DateRange>,

    /// Only import events carrying one of these categories.
    pub categories: Option<Vec<String>>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            merge: true,
            update_existing: false,
            skip_duplicates: true,
            date_range: None,
            categories: None,
        }
    }
}

/// Why an event was left out of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Outside the requested date range.
    OutOfRange,
    /// None of its categories were requested.
    CategoryFiltered,
    /// Its id already exists in the store.
    Duplicate,
}

impl SkipReason {
    /// The stable wire label for this reason.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::OutOfRange => "out_of_range",
            SkipReason::CategoryFiltered => "category_filtered",
            SkipReason::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event left out of an import, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEvent {
    /// The parsed event that was not imported.
    pub event: EventRecord,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// An event the store rejected during an import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedEvent {
    /// The parsed event the store rejected.
    pub event: EventRecord,
    /// The store's error message.
    pub message: String,
}

/// Per-event accounting of one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    /// Events newly added to the store.
    pub imported: Vec<EventRecord>,
    /// Stored events replaced in place.
    pub updated: Vec<EventRecord>,
    /// Events left out, with reasons.
    pub skipped: Vec<SkippedEvent>,
    /// Events the store rejected.
    pub errors: Vec<FailedEvent>,
}

/// Options applied when exporting store contents to ICS text.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Only export events overlapping this range.
    pub date_range: Option<DateRange>,

    /// Only export events carrying one of these categories.
    pub categories: Option<Vec<String>>,

    /// Calendar display name written into the document envelope.
    pub calendar_name: String,

    /// Whether recurring events appear in the export at all.
    pub include_recurring: bool,

    /// Whether recurring events are expanded into concrete instances instead
    /// of being emitted with their rule.
    pub expand_recurring: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            date_range: None,
            categories: None,
            calendar_name: "Calendar".to_string(),
            include_recurring: true,
            expand_recurring: false,
        }
    }
}

/// Strategy for turning a recurring event into concrete instances on export.
pub trait RecurrenceExpander {
    /// Instances of the event within the range, `None` meaning unbounded.
    fn expand(&self, event: &EventRecord, range: Option<&DateRange>) -> Vec<EventRecord>;
}

/// The default expander: every recurring event stands for itself, one
/// instance, rule dropped by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleInstance;

impl RecurrenceExpander for SingleInstance {
    fn expand(&self, event: &EventRecord, _range: Option<&DateRange>) -> Vec<EventRecord> {
        vec![event.clone()]
    }
}

/// Reconciles ICS documents against a [`CalendarStore`] and renders store
/// contents back out.
pub struct IcsHandler<S: CalendarStore> {
    store: S,
    expander: Box<dyn RecurrenceExpander + Send + Sync>,
}

impl<S: CalendarStore + fmt::Debug> fmt::Debug for IcsHandler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IcsHandler").field("store", &self.store).finish_non_exhaustive()
    }
}

impl<S: CalendarStore> IcsHandler<S> {
    /// Creates a handler with the default [`SingleInstance`] expander.
    pub fn new(store: S) -> Self {
        Self::with_expander(store, Box::new(SingleInstance))
    }

    /// Creates a handler with a caller-supplied recurrence expander.
    pub fn with_expander(store: S, expander: Box<dyn RecurrenceExpander + Send + Sync>) -> Self {
        Self { store, expander }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Imports ICS text from the given source into the store.
    ///
    /// Parsing is total, so per-event problems land in the outcome's buckets;
    /// the only fatal errors are failures to acquire the input.
    ///
    /// # Errors
    ///
    /// Returns an error when reading a file or fetching a URL fails.
    pub async fn import(
        &mut self,
        source: ImportSource,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, CoreError> {
        let text = match source {
            ImportSource::Text(text) => text,
            ImportSource::Path(path) => tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| CoreError::Import(format!("{}: {e}", path.display())))?,
            ImportSource::Url(url) => fetch_ics(&url).await?,
        };
        Ok(self.import_text(&text, options))
    }

    /// Imports inline ICS text into the store.
    pub fn import_text(&mut self, text: &str, options: &ImportOptions) -> ImportOutcome {
        let events = calport_ical::parse(text);
        let mut outcome = ImportOutcome::default();
        let mut incoming_ids: Vec<String> = Vec::new();

        for event in events {
            incoming_ids.push(event.id.clone());

            if let Some(range) = &options.date_range
                && !range.overlaps_event(&event)
            {
                outcome.skipped.push(SkippedEvent {
                    event,
                    reason: SkipReason::OutOfRange,
                });
                continue;
            }
            if let Some(categories) = &options.categories
                && !carries_category(&event, categories)
            {
                outcome.skipped.push(SkippedEvent {
                    event,
                    reason: SkipReason::CategoryFiltered,
                });
                continue;
            }

            if self.store.get_event(&event.id).is_some() {
                if options.update_existing {
                    let id = event.id.clone();
                    match self.store.update_event(&id, event.clone()) {
                        Ok(Some(updated)) => outcome.updated.push(updated),
                        Ok(None) => {}
                        Err(e) => outcome.errors.push(FailedEvent {
                            event,
                            message: e.to_string(),
                        }),
                    }
                } else if options.skip_duplicates {
                    outcome.skipped.push(SkippedEvent {
                        event,
                        reason: SkipReason::Duplicate,
                    });
                } else {
                    let mut clone = event.clone();
                    clone.id = format!("{}-imported-{}", clone.id, Utc::now().timestamp_millis());
                    match self.store.add_event(clone) {
                        Ok(added) => outcome.imported.push(added),
                        Err(e) => outcome.errors.push(FailedEvent {
                            event,
                            message: e.to_string(),
                        }),
                    }
                }
            } else {
                match self.store.add_event(event.clone()) {
                    Ok(added) => outcome.imported.push(added),
                    Err(e) => outcome.errors.push(FailedEvent {
                        event,
                        message: e.to_string(),
                    }),
                }
            }
        }

        if !options.merge {
            let stale: Vec<String> = self
                .store
                .events()
                .into_iter()
                .map(|e| e.id)
                .filter(|id| !incoming_ids.contains(id))
                .collect();
            for id in stale {
                self.store.remove_event(&id);
            }
        }

        tracing::info!(
            imported = outcome.imported.len(),
            updated = outcome.updated.len(),
            skipped = outcome.skipped.len(),
            errors = outcome.errors.len(),
            "import finished"
        );
        outcome
    }

    /// Fetches a remote calendar and imports it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Fetch`] when the request fails or the server
    /// answers with a non-success status.
    pub async fn import_from_url(
        &mut self,
        url: &str,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, CoreError> {
        let text = fetch_ics(url).await?;
        Ok(self.import_text(&text, options))
    }

    /// Renders matching store contents as an ICS document.
    #[must_use]
    pub fn export(&self, options: &ExportOptions) -> String {
        let mut events: Vec<EventRecord> = self.store.events();

        if let Some(range) = &options.date_range {
            events.retain(|e| range.overlaps_event(e));
        }
        if let Some(categories) = &options.categories {
            events.retain(|e| carries_category(e, categories));
        }

        let events: Vec<EventRecord> = events
            .into_iter()
            .flat_map(|event| {
                if !event.is_recurring() {
                    return vec![event];
                }
                if !options.include_recurring {
                    return Vec::new();
                }
                if options.expand_recurring {
                    let mut instances = self.expander.expand(&event, options.date_range.as_ref());
                    for instance in &mut instances {
                        instance.recurrence = None;
                    }
                    instances
                } else {
                    vec![event]
                }
            })
            .collect();

        calport_ical::export(&events, &options.calendar_name)
    }

    /// Exports matching store contents to a file.
    ///
    /// # Errors
    ///
    /// Returns an error when writing the file fails.
    pub async fn export_to_file(
        &self,
        path: impl Into<PathBuf>,
        options: &ExportOptions,
    ) -> Result<(), CoreError> {
        let path = path.into();
        let text = self.export(options);
        tokio::fs::write(&path, text).await?;
        tracing::info!(path = %path.display(), "calendar exported");
        Ok(())
    }
}

async fn fetch_ics(url: &str) -> Result<String, CoreError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| CoreError::Fetch(e.to_string()))?;
    if !response.status().is_success() {
        return Err(CoreError::Fetch(format!(
            "{url} answered {}",
            response.status()
        )));
    }
    response
        .text()
        .await
        .map_err(|e| CoreError::Fetch(e.to_string()))
}

fn carries_category(event: &EventRecord, wanted: &[String]) -> bool {
    if let Some(category) = &event.category
        && wanted.contains(category)
    {
        return true;
    }
    event.categories.iter().any(|c| wanted.contains(c))
}

/// Structural check of an ICS document, without parsing it into events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Whether the document passed all structural checks.
    pub valid: bool,
    /// Problems that make the document unusable.
    pub errors: Vec<String>,
    /// Oddities worth surfacing but not fatal.
    pub warnings: Vec<String>,
}

/// Checks an ICS document for the required envelope markers and obvious
/// per-event problems.
#[must_use]
pub fn validate(text: &str) -> Validation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !text.contains("BEGIN:VCALENDAR") {
        errors.push("missing BEGIN:VCALENDAR".to_string());
    }
    if !text.contains("END:VCALENDAR") {
        errors.push("missing END:VCALENDAR".to_string());
    }
    if !text.contains("VERSION:") {
        errors.push("missing VERSION property".to_string());
    }

    let events = calport_ical::parse(text);
    if events.is_empty() {
        warnings.push("calendar contains no events".to_string());
    }
    for (i, (event, described)) in events.iter().zip(described_flags(text)).enumerate() {
        if event.start.is_none() {
            errors.push(format!("event {} has no start date", i + 1));
        }
        if !described {
            warnings.push(format!("event {} has no title or description", i + 1));
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Whether each terminated VEVENT carries its own SUMMARY or DESCRIPTION, in
/// document order. Parsed records cannot answer this: an absent summary is
/// normalized to the placeholder title, which a real event may also use.
fn described_flags(text: &str) -> Vec<bool> {
    let unfolded = calport_ical::unfold(text);
    let mut flags = Vec::new();
    let mut in_event = false;
    let mut in_alarm = false;
    let mut described = false;
    for line in unfolded.lines().map(str::trim_end) {
        match line {
            "BEGIN:VEVENT" => {
                in_event = true;
                described = false;
            }
            "END:VEVENT" => {
                if in_event {
                    flags.push(described);
                }
                in_event = false;
            }
            "BEGIN:VALARM" => in_alarm = true,
            "END:VALARM" => in_alarm = false,
            _ if in_event && !in_alarm => {
                if let Some(content) = ContentLine::split(line)
                    && matches!(content.name, "SUMMARY" | "DESCRIPTION")
                    && !content.value.is_empty()
                {
                    described = true;
                }
            }
            _ => {}
        }
    }
    flags
}
