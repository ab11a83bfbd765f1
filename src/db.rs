use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{CandidateEvent, StoredEvent};
use crate::utils;

/// Event store keyed by content-hash id. Payloads are stored as JSON so
/// the schema does not chase the record shape; `date` and `source` are
/// mirrored into columns for ordering and filtering.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open_default() -> rusqlite::Result<Self> {
        let path = utils::database_path();
        utils::ensure_parent(&path);
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> rusqlite::Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS events(
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                date TEXT,
                payload TEXT NOT NULL,
                first_seen_utc TEXT NOT NULL,
                last_seen_utc TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
            CREATE INDEX IF NOT EXISTS idx_events_source ON events(source);",
        )?;
        Ok(())
    }

    /// Upsert one batch. Re-seeing an id refreshes the payload and
    /// `last_seen_utc`; `first_seen_utc` (the createdAt) never changes.
    pub fn upsert_events(&self, events: &[StoredEvent]) -> rusqlite::Result<usize> {
        let mut written = 0;
        for event in events {
            let payload =
                serde_json::to_string(&event.event).expect("event payload serialization");
            self.conn.execute(
                "INSERT INTO events (id, source, date, payload, first_seen_utc, last_seen_utc)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                   payload = excluded.payload,
                   date = excluded.date,
                   last_seen_utc = excluded.last_seen_utc",
                params![
                    event.id,
                    event.event.source,
                    event.event.date.map(|d| d.to_string()),
                    payload,
                    event.created_at.to_rfc3339(),
                ],
            )?;
            written += 1;
        }
        Ok(written)
    }

    /// Stored events ordered by date ascending, dateless rows last,
    /// optionally filtered by source.
    pub fn query(&self, source: Option<&str>, limit: usize) -> rusqlite::Result<Vec<StoredEvent>> {
        let sql = "SELECT id, payload, first_seen_utc FROM events
             WHERE (?1 IS NULL OR source = ?1)
             ORDER BY date IS NULL, date ASC, first_seen_utc ASC
             LIMIT ?2";
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![source, limit as i64], row_to_event)?;
        rows.collect()
    }

    pub fn list_all(&self) -> rusqlite::Result<Vec<StoredEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, payload, first_seen_utc FROM events
             ORDER BY date IS NULL, date ASC, first_seen_utc ASC",
        )?;
        let rows = stmt.query_map([], row_to_event)?;
        rows.collect()
    }

    pub fn get_event(&self, id: &str) -> rusqlite::Result<Option<StoredEvent>> {
        self.conn
            .query_row(
                "SELECT id, payload, first_seen_utc FROM events WHERE id = ?1",
                params![id],
                row_to_event,
            )
            .optional()
    }

    /// Repair path for legacy dateless rows: rewrite the date in place,
    /// keeping the row id so no duplicate appears.
    pub fn set_event_date(
        &self,
        id: &str,
        date: chrono::NaiveDate,
    ) -> rusqlite::Result<()> {
        let Some(mut stored) = self.get_event(id)? else {
            return Ok(());
        };
        stored.event.date = Some(date);
        let payload =
            serde_json::to_string(&stored.event).expect("event payload serialization");
        self.conn.execute(
            "UPDATE events SET date = ?2, payload = ?3 WHERE id = ?1",
            params![id, date.to_string(), payload],
        )?;
        Ok(())
    }

    pub fn count(&self) -> rusqlite::Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEvent> {
    let id: String = row.get(0)?;
    let payload: String = row.get(1)?;
    let first_seen: String = row.get(2)?;
    let event: CandidateEvent = serde_json::from_str(&payload).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            payload.len(),
            rusqlite::types::Type::Text,
            Box::new(err),
        )
    })?;
    let created_at = DateTime::parse_from_rfc3339(&first_seen)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                first_seen.len(),
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })?;
    Ok(StoredEvent {
        id,
        event,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn stored(title: &str, date: Option<(i32, u32, u32)>, source: &str) -> StoredEvent {
        CandidateEvent {
            title: title.to_string(),
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            time: None,
            location: "Washington DC".to_string(),
            host: "Host".to_string(),
            link: "https://example.org/e".to_string(),
            source: source.to_string(),
            description: String::new(),
            category: None,
        }
        .into_stored(Utc::now())
    }

    #[test]
    fn upsert_by_id_never_duplicates() {
        let store = Store::open_in_memory().expect("open store");
        let event = stored("Grid Week", Some((2025, 7, 1)), "eei");
        store.upsert_events(&[event.clone()]).expect("first write");
        store.upsert_events(&[event.clone()]).expect("second write");
        assert_eq!(store.count().expect("count"), 1);
    }

    #[test]
    fn first_seen_survives_reingest() {
        let store = Store::open_in_memory().expect("open store");
        let mut event = stored("Grid Week", Some((2025, 7, 1)), "eei");
        let original_created = event.created_at;
        store.upsert_events(&[event.clone()]).expect("first write");

        event.created_at = original_created + Duration::hours(6);
        event.event.description = "updated blurb".to_string();
        store.upsert_events(&[event.clone()]).expect("second write");

        let read = store
            .get_event(&event.id)
            .expect("read")
            .expect("event exists");
        assert_eq!(
            read.created_at.timestamp(),
            original_created.timestamp(),
            "createdAt is immutable"
        );
        assert_eq!(read.event.description, "updated blurb");
    }

    #[test]
    fn query_orders_by_date_with_dateless_last() {
        let store = Store::open_in_memory().expect("open store");
        store
            .upsert_events(&[
                stored("Dateless", None, "a"),
                stored("Late", Some((2025, 9, 1)), "a"),
                stored("Early", Some((2025, 7, 1)), "b"),
            ])
            .expect("write");

        let events = store.query(None, 50).expect("query");
        let titles: Vec<&str> = events.iter().map(|e| e.event.title.as_str()).collect();
        assert_eq!(titles, vec!["Early", "Late", "Dateless"]);

        let only_a = store.query(Some("a"), 50).expect("query");
        assert_eq!(only_a.len(), 2);
    }

    #[test]
    fn limit_is_applied() {
        let store = Store::open_in_memory().expect("open store");
        for day in 1..=5 {
            store
                .upsert_events(&[stored(&format!("Event {day}"), Some((2025, 7, day)), "a")])
                .expect("write");
        }
        assert_eq!(store.query(None, 3).expect("query").len(), 3);
    }
}
