//! Read-side view over persisted events: the filtered, deduplicated,
//! sorted feed a consumer actually sees.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::StoredEvent;

#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// Source slug, or `None`/"all" for every source.
    pub source: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl FeedFilter {
    fn matches_source(&self, event: &StoredEvent) -> bool {
        match self.source.as_deref() {
            None | Some("all") => true,
            Some(slug) => event.event.source == slug,
        }
    }

    fn matches_category(&self, event: &StoredEvent) -> bool {
        match self.category.as_deref() {
            None | Some("all") => true,
            Some(category) => event
                .event
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category)),
        }
    }

    fn matches_search(&self, event: &StoredEvent) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let e = &event.event;
        [&e.title, &e.description, &e.host, &e.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    fn matches_range(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Produce the consumer-facing feed. Steps run in a fixed order: future
/// filter, attribute filters, search, date range, global dedupe, stable
/// ascending date sort. Events with no date cannot be future-checked and
/// are excluded here rather than erroring the render.
pub fn render(events: &[StoredEvent], filter: &FeedFilter, now: NaiveDate) -> Vec<StoredEvent> {
    let mut feed: Vec<StoredEvent> = events
        .iter()
        .filter(|event| event.event.date.is_some_and(|date| date >= now))
        .filter(|event| filter.matches_source(event))
        .filter(|event| filter.matches_category(event))
        .filter(|event| filter.matches_search(event))
        .filter(|event| {
            event
                .event
                .date
                .is_some_and(|date| filter.matches_range(date))
        })
        .cloned()
        .collect();

    feed = dedupe(feed);
    // Stable: ties keep scan order.
    feed.sort_by_key(|event| event.event.date);
    feed
}

/// Drop later occurrences of the same (title, date, host) triple across
/// the whole set. First occurrence in scan order wins. Idempotent.
pub fn dedupe(events: Vec<StoredEvent>) -> Vec<StoredEvent> {
    let mut seen: HashSet<(String, Option<NaiveDate>, String)> = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            seen.insert((
                event.event.title.clone(),
                event.event.date,
                event.event.host.clone(),
            ))
        })
        .collect()
}
