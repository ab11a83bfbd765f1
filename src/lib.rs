pub mod api;
pub mod config;
pub mod dates;
pub mod db;
pub mod email;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod relevance;
pub mod scraping;
pub mod utils;

pub use api::{read_feed, scrape, ScrapeSummary};
pub use config::AppConfig;
pub use db::Store;
pub use feed::FeedFilter;
pub use models::{CandidateEvent, FeedError, StoredEvent};
