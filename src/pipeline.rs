//! Fan-out aggregation across every configured source.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::models::{CandidateEvent, StoredEvent};
use crate::scraping::{self, FetchPage, SourceConfig};

/// Result of one aggregation run, with per-source counts for diagnostics.
#[derive(Debug)]
pub struct ScrapeRun {
    pub events: Vec<StoredEvent>,
    pub by_source: BTreeMap<String, usize>,
    pub sources_tried: usize,
    pub ingested_at: DateTime<Utc>,
}

impl ScrapeRun {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Run every source extractor concurrently and merge the results in
/// source-declaration order.
///
/// Isolation comes from each extractor's own never-fails contract: a slow
/// or broken site contributes an empty list, nothing more. Each fetch
/// carries its own timeout, so the worst case is the slowest single
/// source, not the sum.
pub async fn run_all(
    fetcher: Arc<dyn FetchPage>,
    configs: &'static [SourceConfig],
    now: NaiveDate,
) -> Vec<CandidateEvent> {
    let mut set = JoinSet::new();
    for (index, config) in configs.iter().enumerate() {
        let fetcher = fetcher.clone();
        set.spawn(async move {
            (index, scraping::run_source(fetcher.as_ref(), config, now).await)
        });
    }

    // Completion order is nondeterministic; reassemble by declaration
    // index so runs are comparable.
    let mut buckets: Vec<Vec<CandidateEvent>> = vec![Vec::new(); configs.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, events)) => buckets[index] = events,
            Err(err) => warn!(error = %err, "extractor task panicked"),
        }
    }

    let candidates: Vec<CandidateEvent> = buckets.into_iter().flatten().collect();
    info!(
        total = candidates.len(),
        sources = configs.len(),
        "aggregation run complete"
    );
    candidates
}

/// Assign stable identity and ingestion timestamps.
pub fn ingest(
    candidates: Vec<CandidateEvent>,
    sources_tried: usize,
    ingested_at: DateTime<Utc>,
) -> ScrapeRun {
    let mut by_source: BTreeMap<String, usize> = BTreeMap::new();
    let mut events = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        *by_source.entry(candidate.source.clone()).or_insert(0) += 1;
        events.push(candidate.into_stored(ingested_at));
    }
    ScrapeRun {
        events,
        by_source,
        sources_tried,
        ingested_at,
    }
}

/// Reserved source tag for placeholder events, so consumers can tell them
/// apart from scraped data at a glance.
pub const PLACEHOLDER_SOURCE: &str = "sample";

/// Clearly labeled stand-ins for when aggregation yields nothing. Upstream
/// sites are unreliable and zero-result runs are routine; the browsing
/// surface still needs something to render.
pub fn placeholder_events(now: NaiveDate) -> Vec<CandidateEvent> {
    let sample = |title: &str, days_out: u64, location: &str, description: &str| CandidateEvent {
        title: format!("[Sample] {title}"),
        date: now.checked_add_days(Days::new(days_out)),
        time: None,
        location: location.to_string(),
        host: "Energy Events".to_string(),
        link: "https://example.org/sample-event".to_string(),
        source: PLACEHOLDER_SOURCE.to_string(),
        description: description.to_string(),
        category: None,
    };
    vec![
        sample(
            "Grid Modernization Briefing",
            7,
            "Washington DC",
            "Placeholder shown while no live listings are available.",
        ),
        sample(
            "Clean Energy Finance Webinar",
            14,
            "Online",
            "Placeholder shown while no live listings are available.",
        ),
        sample(
            "Carbon Policy Roundtable",
            21,
            "Washington DC",
            "Placeholder shown while no live listings are available.",
        ),
    ]
}
