//! SQLite whitelist store.
//!
//! Reads the `lp_whitelist` table. Archived plates live in
//! `lp_whitelist_archive` and are never loaded.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE lp_whitelist (
//!     id TEXT PRIMARY KEY,
//!     licensePlate TEXT NOT NULL,
//!     validFrom TEXT NOT NULL,
//!     validTo TEXT NOT NULL
//! );
//! ```
//!
//! The connection is not `Sync`; it sits behind a mutex and every query runs
//! on the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use shared_types::{parse_calendar_date, EntryId, StoreError, StoredEntry};
use tracing::{debug, info, warn};

use crate::domain::CacheError;
use crate::ports::WhitelistStore;

const SELECT_ACTIVE: &str = "SELECT id, licensePlate, validFrom, validTo FROM lp_whitelist";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS lp_whitelist (
        id TEXT PRIMARY KEY,
        licensePlate TEXT NOT NULL,
        validFrom TEXT NOT NULL,
        validTo TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS lp_whitelist_archive (
        id TEXT PRIMARY KEY,
        licensePlate TEXT NOT NULL,
        validFrom TEXT NOT NULL,
        validTo TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_lp_whitelist_plate ON lp_whitelist(licensePlate);
";

/// Whitelist store backed by a SQLite database file.
#[derive(Clone)]
pub struct SqliteWhitelistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWhitelistStore {
    /// Open (or create) the database at `path` and make sure both tables
    /// exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path).map_err(|e| CacheError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let store = Self::from_connection(conn)?;
        info!("[rg-02] Whitelist database ready at {}", path.display());
        Ok(store)
    }

    /// An in-memory database with the schema in place.
    pub fn new_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(|e| CacheError::Open {
            path: ":memory:".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, CacheError> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create the whitelist and archive tables when absent.
    pub fn ensure_schema(&self) -> Result<(), CacheError> {
        self.conn
            .lock()
            .execute_batch(SCHEMA)
            .map_err(|e| CacheError::Schema(e.to_string()))
    }

    /// Insert a row under a fresh UUID, as the administration layer does.
    ///
    /// Bounds are stored verbatim.
    pub fn insert(
        &self,
        license_plate: &str,
        valid_from: &str,
        valid_to: &str,
    ) -> Result<EntryId, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.insert_row(&StoredEntry::new(
            id.as_str(),
            license_plate,
            valid_from,
            valid_to,
        ))?;
        Ok(EntryId::from(id))
    }

    /// Insert a row with a caller-chosen id.
    pub fn insert_row(&self, row: &StoredEntry) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO lp_whitelist (id, licensePlate, validFrom, validTo) VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.license_plate, row.valid_from, row.valid_to],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Move a row into the archive table.
    pub fn archive(&self, id: &EntryId) -> Result<bool, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let moved = tx
            .execute(
                "INSERT INTO lp_whitelist_archive SELECT * FROM lp_whitelist WHERE id = ?1",
                params![id.as_str()],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        tx.execute("DELETE FROM lp_whitelist WHERE id = ?1", params![id.as_str()])
            .map_err(|e| StoreError::Database(e.to_string()))?;
        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(moved > 0)
    }

    /// Move every row whose `validTo` lies before `today` into the archive
    /// table, in one transaction. Returns the number of rows moved.
    ///
    /// Rows whose upper bound does not parse stay where they are; they can
    /// never match anyway and an operator has to look at them.
    pub fn archive_expired(&self, today: NaiveDate) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let expired: Vec<String> = Self::query_active(&tx)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .into_iter()
            .filter(|row| match parse_calendar_date(&row.valid_to) {
                Ok(valid_to) => valid_to < today,
                Err(e) => {
                    warn!(id = %row.id, error = %e, "[rg-02] Unparseable validTo, not archived");
                    false
                }
            })
            .map(|row| row.id)
            .collect();

        for id in &expired {
            tx.execute(
                "INSERT INTO lp_whitelist_archive SELECT * FROM lp_whitelist WHERE id = ?1",
                params![id],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
            tx.execute("DELETE FROM lp_whitelist WHERE id = ?1", params![id])
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        tx.commit()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(archived = expired.len(), %today, "[rg-02] Expired whitelist entries archived");
        Ok(expired.len())
    }

    fn query_active(conn: &Connection) -> Result<Vec<StoredEntry>, rusqlite::Error> {
        let mut stmt = conn.prepare(SELECT_ACTIVE)?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredEntry::new(
                column_text(row, 0)?,
                column_text(row, 1)?,
                column_text(row, 2)?,
                column_text(row, 3)?,
            ))
        })?;
        rows.collect()
    }
}

/// Read a column as text whatever its storage class. Bounds written by
/// other tools may be integers or reals; NULL becomes an empty string and
/// is rejected later as an unparseable bound.
fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

#[async_trait]
impl WhitelistStore for SqliteWhitelistStore {
    async fn fetch_all_whitelist_entries(&self) -> Result<Vec<StoredEntry>, StoreError> {
        let conn = Arc::clone(&self.conn);
        let rows = tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            Self::query_active(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!("[rg-02] Fetched {} whitelist row(s)", rows.len());
        Ok(rows)
    }
}
