use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A freshly extracted event, before identity assignment and persistence.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CandidateEvent {
    pub title: String,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: String,
    pub host: String,
    pub link: String,
    pub source: String,
    pub description: String,
    pub category: Option<String>,
}

/// A candidate with stable identity and ingestion timestamp attached.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StoredEvent {
    pub id: String, // sha256 of source|title|date|host
    #[serde(flatten)]
    pub event: CandidateEvent,
    pub created_at: DateTime<Utc>,
}

impl CandidateEvent {
    /// Content hash identity: re-scraping the same real-world event
    /// produces the same id, so the store upserts instead of duplicating.
    pub fn stable_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hasher.update(b"|");
        hasher.update(self.title.as_bytes());
        hasher.update(b"|");
        hasher.update(
            self.date
                .map(|d| d.to_string())
                .unwrap_or_default()
                .as_bytes(),
        );
        hasher.update(b"|");
        hasher.update(self.host.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn into_stored(self, created_at: DateTime<Utc>) -> StoredEvent {
        StoredEvent {
            id: self.stable_id(),
            event: self,
            created_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("no events found across {sources_tried} sources")]
    NoData { sources_tried: usize },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}
