//! Append-only request history backed by SQLite.

use super::types::{HistoryFilter, HistoryPage, NewRecord, RequestRecord};
use crate::compose::HttpMethod;
use crate::error::StoreError;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Durable history of execution attempts.
///
/// Records are only ever appended; nothing updates or deletes them.
pub trait HistoryStore: Send + Sync {
    /// Persists `record`, assigning its id and creation time.
    fn append(&self, record: NewRecord) -> Result<RequestRecord, StoreError>;

    /// Returns one page of records, newest first, and the filtered total.
    fn query(&self, filter: &HistoryFilter) -> Result<HistoryPage, StoreError>;

    /// Point lookup; `StoreError::NotFound` when no record has `id`.
    fn get(&self, id: i64) -> Result<RequestRecord, StoreError>;
}

pub type SharedStore = Arc<dyn HistoryStore>;

/// Runs a store call on the blocking thread pool.
pub async fn with_store<T, F>(store: &SharedStore, f: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&dyn HistoryStore) -> Result<T, StoreError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        method TEXT NOT NULL,
        url TEXT NOT NULL,
        headers TEXT NOT NULL,
        request_body TEXT,
        response_status INTEGER NOT NULL,
        response_time_ms INTEGER NOT NULL,
        response_size_bytes INTEGER,
        response_body TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_requests_created_at ON requests(created_at);
"#;

const SELECT_COLUMNS: &str = "id, method, url, headers, request_body, response_status, \
     response_time_ms, response_size_bytes, response_body, created_at";

const FILTER_CLAUSE: &str =
    "WHERE (?1 IS NULL OR instr(url, ?1) > 0) AND (?2 IS NULL OR method = ?2)";

/// SQLite-backed [`HistoryStore`]; a mutex serialises access to the connection.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, record: NewRecord) -> Result<RequestRecord, StoreError> {
        let headers = serde_json::to_string(&record.headers)?;
        let request_body = record
            .request_body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let response_body = serde_json::to_string(&record.response_body)?;

        let conn = self.lock()?;
        let created_at = Utc::now().trunc_subsecs(6);
        conn.execute(
            "INSERT INTO requests (method, url, headers, request_body, response_status, \
             response_time_ms, response_size_bytes, response_body, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.method.as_str(),
                record.url,
                headers,
                request_body,
                i64::from(record.response_status),
                record.response_time_ms as i64,
                record.response_size_bytes.map(|s| s as i64),
                response_body,
                encode_timestamp(&created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(record.into_record(id, created_at))
    }

    fn query(&self, filter: &HistoryFilter) -> Result<HistoryPage, StoreError> {
        let search = filter.search_term();
        let method = filter.method_filter();

        let conn = self.lock()?;
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM requests {}", FILTER_CLAUSE),
            params![search, method],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM requests {} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4",
            SELECT_COLUMNS, FILTER_CLAUSE
        ))?;
        let rows = stmt
            .query_map(
                params![
                    search,
                    method,
                    i64::from(filter.limit()),
                    filter.offset() as i64
                ],
                RawRecord::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let records = rows
            .into_iter()
            .map(RawRecord::decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoryPage {
            records,
            total_count: total as u64,
        })
    }

    fn get(&self, id: i64) -> Result<RequestRecord, StoreError> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("SELECT {} FROM requests WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                RawRecord::from_row,
            )
            .optional()?;

        match raw {
            Some(raw) => raw.decode(),
            None => Err(StoreError::NotFound(id)),
        }
    }
}

/// Row as stored, before JSON columns are decoded.
struct RawRecord {
    id: i64,
    method: String,
    url: String,
    headers: String,
    request_body: Option<String>,
    response_status: i64,
    response_time_ms: i64,
    response_size_bytes: Option<i64>,
    response_body: String,
    created_at: String,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            method: row.get(1)?,
            url: row.get(2)?,
            headers: row.get(3)?,
            request_body: row.get(4)?,
            response_status: row.get(5)?,
            response_time_ms: row.get(6)?,
            response_size_bytes: row.get(7)?,
            response_body: row.get(8)?,
            created_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<RequestRecord, StoreError> {
        let method: HttpMethod = self
            .method
            .parse()
            .map_err(|_| StoreError::InvalidMethod(self.method.clone()))?;

        Ok(RequestRecord {
            id: self.id,
            method,
            url: self.url,
            headers: serde_json::from_str(&self.headers)?,
            request_body: self
                .request_body
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            response_status: self.response_status as u16,
            response_time_ms: self.response_time_ms.max(0) as u64,
            response_size_bytes: self.response_size_bytes.map(|s| s.max(0) as u64),
            response_body: serde_json::from_str(&self.response_body)?,
            created_at: decode_timestamp(&self.created_at)?,
        })
    }
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn encode_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp(value.to_string()))
}
