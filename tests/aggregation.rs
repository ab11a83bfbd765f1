//! End-to-end run: fixture sources through scrape, store, and feed read.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use energy_events::api;
use energy_events::db::Store;
use energy_events::feed::FeedFilter;
use energy_events::scraping::{FetchPage, SourceConfig};

struct FixtureFetcher {
    pages: HashMap<&'static str, &'static str>,
}

#[async_trait]
impl FetchPage for FixtureFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        self.pages
            .get(url)
            .map(|html| html.to_string())
            .ok_or_else(|| anyhow!("connection timed out: {url}"))
    }
}

const GRID_FORUM_HTML: &str = r#"
<div class="event-card">
  <h3>Grid Modernization Forum</h3>
  <span class="event-date">June 12, 2025</span>
  <a href="/events/grid-forum">Details</a>
</div>
<div class="event-card">
  <h3>Transmission Siting Workshop</h3>
  <span class="event-date">2025-07-03</span>
  <a href="/events/siting"></a>
</div>
"#;

const LIST_ORG_HTML: &str = r#"
<div class="event-card">
  <h3>Member Policy Call</h3>
  <a href="https://list.example.org/policy-call">Register</a>
</div>
"#;

static FIXTURE_SOURCES: [SourceConfig; 3] = [
    SourceConfig {
        slug: "grid-forum",
        host: "Grid Forum",
        url: "https://grid.example.org/events",
        default_location: "Washington DC",
        candidate_selectors: &[".event-card"],
        title_selectors: &["h3"],
        date_selectors: &[".event-date"],
        location_selectors: &[],
        description_selectors: &[],
        category: Some("Conference"),
        requires_relevance_filter: false,
        strict_dates: false,
    },
    SourceConfig {
        slug: "flaky-org",
        host: "Flaky Org",
        url: "https://flaky.example.org/events",
        default_location: "Online",
        candidate_selectors: &[".event-card"],
        title_selectors: &["h3"],
        date_selectors: &[".event-date"],
        location_selectors: &[],
        description_selectors: &[],
        category: None,
        requires_relevance_filter: false,
        strict_dates: false,
    },
    SourceConfig {
        slug: "list-org",
        host: "List Org",
        url: "https://list.example.org/events",
        default_location: "Online",
        candidate_selectors: &[".event-card"],
        title_selectors: &["h3"],
        date_selectors: &[".event-date"],
        location_selectors: &[],
        description_selectors: &[],
        category: None,
        requires_relevance_filter: false,
        strict_dates: false,
    },
];

fn fixture_fetcher() -> Arc<FixtureFetcher> {
    let mut pages = HashMap::new();
    pages.insert("https://grid.example.org/events", GRID_FORUM_HTML);
    pages.insert("https://list.example.org/events", LIST_ORG_HTML);
    Arc::new(FixtureFetcher { pages })
}

#[tokio::test]
async fn scrape_store_and_read_feed() {
    let store = Store::open_in_memory().expect("open store");
    let ingested_at = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");

    let summary = api::scrape(fixture_fetcher(), &store, &FIXTURE_SOURCES, ingested_at)
        .await
        .expect("scrape run");

    // One source down still yields the other two sources' candidates.
    assert!(summary.success);
    assert_eq!(summary.count, 3);
    assert_eq!(summary.by_source.get("grid-forum"), Some(&2));
    assert_eq!(summary.by_source.get("flaky-org"), None);
    assert_eq!(summary.by_source.get("list-org"), Some(&1));

    let now = NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date");
    let feed = api::read_feed(&store, &FeedFilter::default(), now, api::DEFAULT_LIMIT)
        .expect("read feed");

    // The dateless candidate is stored but cannot appear in the
    // future-only feed; the dated two come back in ascending order.
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].event.title, "Grid Modernization Forum");
    assert_eq!(
        feed[0].event.date,
        NaiveDate::from_ymd_opt(2025, 6, 12)
    );
    assert_eq!(feed[1].event.title, "Transmission Siting Workshop");
    assert_eq!(feed[0].event.link, "https://grid.example.org/events/grid-forum");

    let stored = store.list_all().expect("list");
    assert_eq!(stored.len(), 3, "dateless events persist even when hidden");
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let store = Store::open_in_memory().expect("open store");
    let first = Utc
        .with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let second = first + chrono::Duration::hours(6);

    api::scrape(fixture_fetcher(), &store, &FIXTURE_SOURCES, first)
        .await
        .expect("first run");
    api::scrape(fixture_fetcher(), &store, &FIXTURE_SOURCES, second)
        .await
        .expect("second run");

    let stored = store.list_all().expect("list");
    assert_eq!(stored.len(), 3, "re-scraping the same pages adds nothing");
    assert!(
        stored.iter().all(|e| e.created_at == first),
        "first-seen timestamps survive the second run"
    );
}
