//! Plain-text digest rendering for email delivery. Transport is a thin
//! pluggable seam; only the formatting belongs to this crate.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::StoredEvent;

#[derive(Debug, Clone)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

pub fn build_digest(events: &[StoredEvent], now: NaiveDate) -> Digest {
    let subject = format!(
        "Energy events digest: {} upcoming ({})",
        events.len(),
        now.format("%B %d, %Y")
    );

    let mut body = String::from("Upcoming energy and climate events:\n\n");
    if events.is_empty() {
        body.push_str("No upcoming events right now. Check back soon.\n");
    }
    for event in events {
        let e = &event.event;
        let date = e
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "date TBD".to_string());
        body.push_str(&format!("* {} — {}\n", date, e.title));
        body.push_str(&format!("  {} | {}\n", e.host, e.location));
        if let Some(time) = &e.time {
            body.push_str(&format!("  {time}\n"));
        }
        body.push_str(&format!("  {}\n\n", e.link));
    }
    Digest { subject, body }
}

#[async_trait]
pub trait SendEmail: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Prints instead of sending; the default when no transport is wired up.
pub struct StdoutSender;

#[async_trait]
impl SendEmail for StdoutSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        println!("To: {to}\nSubject: {subject}\n\n{body}");
        Ok(())
    }
}
