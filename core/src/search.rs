// SPDX-FileCopyrightText: 2026 The calport authors
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory full-text search, filtering, and grouping over event records.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use calport_ical::{DateRange, EventRecord, EventStatus};
use serde::{Deserialize, Serialize};

use crate::store::EventSource;

/// Fields consulted by search, suggestions, and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// The event title.
    Title,
    /// The event description.
    Description,
    /// The event location.
    Location,
    /// The primary category.
    Category,
}

impl SearchField {
    /// The default field set indexed and scanned by search.
    pub const DEFAULT: [SearchField; 4] = [
        SearchField::Title,
        SearchField::Description,
        SearchField::Location,
        SearchField::Category,
    ];

    fn label(self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Description => "description",
            SearchField::Location => "location",
            SearchField::Category => "category",
        }
    }

    fn value(self, event: &EventRecord) -> Option<&str> {
        match self {
            SearchField::Title => Some(event.title.as_str()),
            SearchField::Description => event.description.as_deref(),
            SearchField::Location => event.location.as_deref(),
            SearchField::Category => event.category.as_deref(),
        }
    }
}

/// Result ordering for [`SearchEngine::search`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Descending score.
    #[default]
    Relevance,
    /// Ascending start time.
    Date,
    /// Lexicographic title, case-insensitive.
    Title,
    /// Encounter order, untouched.
    Unsorted,
}

/// Options for [`SearchEngine::search`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Fields scanned for matches.
    pub fields: Vec<SearchField>,

    /// Whether tokens without a substring match fall back to edit-distance
    /// matching (distance of at most 2).
    pub fuzzy: bool,

    /// Whether matching is case-sensitive.
    pub case_sensitive: bool,

    /// Maximum number of results; unbounded when `None`.
    pub limit: Option<usize>,

    /// Result ordering.
    pub sort_by: SortBy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: SearchField::DEFAULT.to_vec(),
            fuzzy: true,
            case_sensitive: false,
            limit: None,
            sort_by: SortBy::default(),
        }
    }
}

/// Options for [`SearchEngine::suggestions`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestOptions {
    /// Field whose values are suggested.
    pub field: SearchField,

    /// Maximum number of suggestions.
    pub limit: usize,

    /// Minimum length of the partial input before suggesting anything.
    pub min_length: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            field: SearchField::Title,
            limit: 10,
            min_length: 2,
        }
    }
}

/// Options for [`SearchEngine::group_by`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupOptions {
    /// Whether events without a value for the field land in an explicit
    /// `(No <field>)` bucket instead of being dropped.
    pub include_empty: bool,

    /// Whether each bucket is sorted ascending by start time.
    pub sort_events: bool,

    /// Whether bucket keys are sorted lexicographically.
    pub sort_groups: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            include_empty: false,
            sort_events: false,
            sort_groups: true,
        }
    }
}

/// A single bucket produced by [`SearchEngine::group_by`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGroup {
    /// Field value shared by the bucket, or the `(No <field>)` placeholder.
    pub key: String,

    /// Events in the bucket.
    pub events: Vec<EventRecord>,
}

/// Criteria for [`SearchEngine::filter`], applied in a fixed order with each
/// non-empty criterion narrowing the previous result.
#[derive(Default)]
pub struct EventFilters {
    /// Keep events whose interval overlaps this range.
    pub date_range: Option<DateRange>,

    /// Keep events whose category (or any entry of their categories list) is
    /// in this set.
    pub categories: Option<Vec<String>>,

    /// Keep events whose location is in this set, case-insensitively.
    pub locations: Option<Vec<String>>,

    /// Keep events with at least one attendee email in this set,
    /// case-insensitively.
    pub attendees: Option<Vec<String>>,

    /// Keep events whose status is in this set.
    pub status: Option<Vec<EventStatus>>,

    /// Keep events whose all-day flag equals this value.
    pub all_day: Option<bool>,

    /// Keep events with (or without) a recurrence expression.
    pub recurring: Option<bool>,

    /// Keep events with (or without) reminders.
    pub has_reminders: Option<bool>,

    /// Arbitrary caller-supplied predicate, applied last.
    #[allow(clippy::type_complexity)]
    pub custom: Option<Box<dyn Fn(&EventRecord) -> bool + Send + Sync>>,
}

impl fmt::Debug for EventFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFilters")
            .field("date_range", &self.date_range)
            .field("categories", &self.categories)
            .field("locations", &self.locations)
            .field("attendees", &self.attendees)
            .field("status", &self.status)
            .field("all_day", &self.all_day)
            .field("recurring", &self.recurring)
            .field("has_reminders", &self.has_reminders)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Query, filter, suggest, and group operations over a caller-supplied event
/// collection.
///
/// The engine also maintains a token index over the default field set. The
/// index is a rebuildable cache; the scoring path always recomputes from the
/// live collection, so a stale index never affects results.
#[derive(Debug)]
pub struct SearchEngine<S: EventSource> {
    source: S,
    index: HashMap<String, HashSet<String>>,
}

impl<S: EventSource> SearchEngine<S> {
    /// Creates an engine over the given collection. The token index starts
    /// empty; call [`rebuild_index`](Self::rebuild_index) to populate it.
    pub fn new(source: S) -> Self {
        Self {
            source,
            index: HashMap::new(),
        }
    }

    /// The underlying collection.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Rebuilds the token index from the live collection.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for event in self.source.all_events() {
            for field in SearchField::DEFAULT {
                let Some(value) = field.value(&event) else {
                    continue;
                };
                for token in value.to_lowercase().split_whitespace() {
                    self.index
                        .entry(token.to_string())
                        .or_default()
                        .insert(event.id.clone());
                }
            }
        }
        tracing::debug!(tokens = self.index.len(), "search index rebuilt");
    }

    /// The token index: lowercase token to set of event ids.
    pub fn index(&self) -> &HashMap<String, HashSet<String>> {
        &self.index
    }

    /// Scores the collection against a whitespace-tokenized query.
    ///
    /// Each exact substring match contributes a flat increment; with `fuzzy`
    /// enabled, a token without a substring match contributes inversely to its
    /// edit distance from the field value when that distance is at most 2.
    /// After a field is scanned, a title field doubles the event's running
    /// total, so the boost compounds with everything scored before it.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<EventRecord> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let normalized = if options.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        let mut scored: Vec<(f64, EventRecord)> = Vec::new();
        for event in self.source.all_events() {
            let score = score_event(&event, &tokens, options);
            if score > 0.0 {
                scored.push((score, event));
            }
        }

        match options.sort_by {
            SortBy::Relevance => {
                scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
            }
            SortBy::Date => scored.sort_by_key(|(_, e)| e.start.map(|s| s.with_start_of_day())),
            SortBy::Title => scored.sort_by_key(|(_, e)| e.title.to_lowercase()),
            SortBy::Unsorted => {}
        }

        if let Some(limit) = options.limit {
            scored.truncate(limit);
        }
        scored.into_iter().map(|(_, event)| event).collect()
    }

    /// Applies the filter criteria in their fixed order.
    pub fn filter(&self, filters: &EventFilters) -> Vec<EventRecord> {
        let mut events = self.source.all_events();

        if let Some(range) = &filters.date_range {
            events.retain(|e| range.overlaps_event(e));
        }
        if let Some(categories) = &filters.categories {
            events.retain(|e| matches_category(e, categories));
        }
        if let Some(locations) = &filters.locations {
            let wanted: Vec<String> = locations.iter().map(|l| l.to_lowercase()).collect();
            events.retain(|e| {
                e.location
                    .as_deref()
                    .is_some_and(|l| wanted.contains(&l.to_lowercase()))
            });
        }
        if let Some(attendees) = &filters.attendees {
            let wanted: Vec<String> = attendees.iter().map(|a| a.to_lowercase()).collect();
            events.retain(|e| {
                e.attendees
                    .iter()
                    .any(|a| wanted.contains(&a.email.to_lowercase()))
            });
        }
        if let Some(status) = &filters.status {
            events.retain(|e| status.contains(&e.status));
        }
        if let Some(all_day) = filters.all_day {
            events.retain(|e| e.all_day == all_day);
        }
        if let Some(recurring) = filters.recurring {
            events.retain(|e| e.is_recurring() == recurring);
        }
        if let Some(has_reminders) = filters.has_reminders {
            events.retain(|e| !e.reminders.is_empty() == has_reminders);
        }
        if let Some(custom) = &filters.custom {
            events.retain(|e| custom(e));
        }

        events
    }

    /// Filters first, then intersects with the unlimited search result for
    /// the query; the limit applies only at the very end.
    pub fn advanced_search(
        &self,
        query: &str,
        filters: &EventFilters,
        options: &SearchOptions,
    ) -> Vec<EventRecord> {
        let mut events = self.filter(filters);

        if !query.trim().is_empty() {
            let unlimited = SearchOptions {
                limit: None,
                ..options.clone()
            };
            let matched: HashSet<String> = self
                .search(query, &unlimited)
                .into_iter()
                .map(|e| e.id)
                .collect();
            events.retain(|e| matched.contains(&e.id));
        }

        if let Some(limit) = options.limit {
            events.truncate(limit);
        }
        events
    }

    /// Distinct values of a field containing the partial input, in
    /// first-match order, stopping at the limit.
    pub fn suggestions(&self, partial: &str, options: &SuggestOptions) -> Vec<String> {
        if partial.chars().count() < options.min_length {
            return Vec::new();
        }
        let needle = partial.to_lowercase();

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for event in self.source.all_events() {
            let Some(value) = options.field.value(&event) else {
                continue;
            };
            if value.to_lowercase().contains(&needle) && seen.insert(value.to_string()) {
                out.push(value.to_string());
                if out.len() >= options.limit {
                    break;
                }
            }
        }
        out
    }

    /// Distinct values of a field across the collection, sorted. For the
    /// category field, entries of the categories list are folded in.
    pub fn unique_values(&self, field: SearchField) -> Vec<String> {
        let mut values = BTreeSet::new();
        for event in self.source.all_events() {
            if let Some(value) = field.value(&event) {
                values.insert(value.to_string());
            }
            if field == SearchField::Category {
                for extra in &event.categories {
                    values.insert(extra.clone());
                }
            }
        }
        values.into_iter().collect()
    }

    /// Partitions events into buckets keyed by the field's value.
    pub fn group_by(&self, field: SearchField, options: &GroupOptions) -> Vec<EventGroup> {
        let placeholder = format!("(No {})", field.label());

        let mut keys: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, Vec<EventRecord>> = HashMap::new();
        for event in self.source.all_events() {
            let key = match field.value(&event) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ if options.include_empty => placeholder.clone(),
                _ => continue,
            };
            if !buckets.contains_key(&key) {
                keys.push(key.clone());
            }
            buckets.entry(key).or_default().push(event);
        }

        if options.sort_groups {
            keys.sort();
        }

        keys.into_iter()
            .filter_map(|key| {
                let mut events = buckets.remove(&key)?;
                if options.sort_events {
                    events.sort_by_key(|e| e.start.map(|s| s.with_start_of_day()));
                }
                Some(EventGroup { key, events })
            })
            .collect()
    }
}

fn score_event(event: &EventRecord, tokens: &[&str], options: &SearchOptions) -> f64 {
    let mut score = 0.0_f64;
    for field in &options.fields {
        let Some(value) = field.value(event) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let haystack = if options.case_sensitive {
            value.to_string()
        } else {
            value.to_lowercase()
        };

        for token in tokens {
            if haystack.contains(token) {
                score += 10.0;
            } else if options.fuzzy {
                let distance = levenshtein(token, &haystack);
                if distance <= 2 {
                    #[allow(clippy::cast_precision_loss)]
                    let d = distance.max(1) as f64;
                    score += 5.0 / d;
                }
            }
        }

        // The title boost doubles the running total, not the field's own
        // contribution, so it compounds with fields scanned before it.
        if *field == SearchField::Title {
            score *= 2.0;
        }
    }
    score
}

fn matches_category(event: &EventRecord, wanted: &[String]) -> bool {
    if let Some(category) = &event.category
        && wanted.contains(category)
    {
        return true;
    }
    event.categories.iter().any(|c| wanted.contains(c))
}

/// Classic dynamic-programming edit distance: substitution, insertion, and
/// deletion all cost 1. Computed fresh per comparison.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    #[expect(clippy::indexing_slicing)]
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    *prev.last().unwrap_or(&0)
}
