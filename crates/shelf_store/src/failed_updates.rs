use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, params_from_iter, Connection};
use shelf_core::{classify, Connectivity, FailureRecord, MangaId, UpdateFailure};
use shelf_logging::{shelf_debug, shelf_error};

use crate::StoreError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS failed_updates (
        manga_id INTEGER NOT NULL PRIMARY KEY,
        error_message TEXT,
        simplified_error_message TEXT
    )";

/// Per-manga record of the last failed update.
///
/// Subscriptions receive the full current state right away and again after
/// every write. Removal failures are logged and swallowed: the inbox is
/// advisory, so a stale row is preferable to an error surfaced to the user.
pub trait FailedUpdatesRepository: Send + Sync {
    fn subscribe(&self) -> Receiver<Vec<FailureRecord>>;

    /// Emits the number of records, skipping repeats.
    fn subscribe_count(&self) -> Receiver<i64>;

    fn records(&self) -> Result<Vec<FailureRecord>, StoreError>;

    /// Inserts or overwrites the record for `manga_id`.
    fn upsert(
        &self,
        manga_id: MangaId,
        error_message: Option<&str>,
        simplified_error_message: Option<&str>,
    ) -> Result<(), StoreError>;

    fn remove_by_ids(&self, manga_ids: &[MangaId]);

    fn remove_all(&self);
}

struct CountSubscriber {
    tx: Sender<i64>,
    last: Option<i64>,
}

pub struct SqliteFailedUpdates {
    conn: Mutex<Connection>,
    list_subscribers: Mutex<Vec<Sender<Vec<FailureRecord>>>>,
    count_subscribers: Mutex<Vec<CountSubscriber>>,
}

impl SqliteFailedUpdates {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            list_subscribers: Mutex::new(Vec::new()),
            count_subscribers: Mutex::new(Vec::new()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Pushes the current table to every live subscriber.
    ///
    /// Callers hold the connection guard across the write and this call, so
    /// emissions reach subscribers in commit order.
    fn notify(&self, conn: &Connection) {
        let snapshot = query_records(conn).and_then(|records| Ok((records, query_count(conn)?)));
        let (records, count) = match snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => {
                shelf_error!("Failed to read failed updates for subscribers: {}", err);
                return;
            }
        };

        if let Ok(mut subscribers) = self.list_subscribers.lock() {
            subscribers.retain(|tx| tx.send(records.clone()).is_ok());
        }
        if let Ok(mut subscribers) = self.count_subscribers.lock() {
            subscribers.retain_mut(|subscriber| {
                if subscriber.last == Some(count) {
                    return true;
                }
                subscriber.last = Some(count);
                subscriber.tx.send(count).is_ok()
            });
        }
    }

    fn execute_logged(&self, what: &str, sql: &str, ids: &[MangaId]) {
        let conn = match self.lock() {
            Ok(conn) => conn,
            Err(err) => {
                shelf_error!("{} failed: {}", what, err);
                return;
            }
        };
        match conn.execute(sql, params_from_iter(ids.iter())) {
            Ok(removed) => shelf_debug!("{}: {} row(s) removed", what, removed),
            Err(err) => {
                shelf_error!("{} failed: {}", what, err);
                return;
            }
        }
        self.notify(&conn);
    }
}

impl FailedUpdatesRepository for SqliteFailedUpdates {
    fn subscribe(&self) -> Receiver<Vec<FailureRecord>> {
        let (tx, rx) = mpsc::channel();
        // Held until the sender is registered.
        let conn = match self.lock() {
            Ok(conn) => conn,
            Err(err) => {
                shelf_error!("Failed to read failed updates: {}", err);
                return rx;
            }
        };
        match query_records(&conn) {
            Ok(records) => {
                let _ = tx.send(records);
            }
            Err(err) => shelf_error!("Failed to read failed updates: {}", err),
        }
        if let Ok(mut subscribers) = self.list_subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn subscribe_count(&self) -> Receiver<i64> {
        let (tx, rx) = mpsc::channel();
        let conn = match self.lock() {
            Ok(conn) => conn,
            Err(err) => {
                shelf_error!("Failed to count failed updates: {}", err);
                return rx;
            }
        };
        let last = match query_count(&conn) {
            Ok(count) => {
                let _ = tx.send(count);
                Some(count)
            }
            Err(err) => {
                shelf_error!("Failed to count failed updates: {}", err);
                None
            }
        };
        if let Ok(mut subscribers) = self.count_subscribers.lock() {
            subscribers.push(CountSubscriber { tx, last });
        }
        rx
    }

    fn records(&self) -> Result<Vec<FailureRecord>, StoreError> {
        let conn = self.lock()?;
        Ok(query_records(&conn)?)
    }

    fn upsert(
        &self,
        manga_id: MangaId,
        error_message: Option<&str>,
        simplified_error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO failed_updates (manga_id, error_message, simplified_error_message)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(manga_id) DO UPDATE SET
                 error_message = excluded.error_message,
                 simplified_error_message = excluded.simplified_error_message",
            params![manga_id, error_message, simplified_error_message],
        )?;
        tx.commit()?;
        shelf_debug!("Recorded failed update for manga {}", manga_id);
        self.notify(&conn);
        Ok(())
    }

    fn remove_by_ids(&self, manga_ids: &[MangaId]) {
        if manga_ids.is_empty() {
            return;
        }
        let placeholders = vec!["?"; manga_ids.len()].join(", ");
        let sql = format!("DELETE FROM failed_updates WHERE manga_id IN ({placeholders})");
        self.execute_logged("Removing failed updates by id", &sql, manga_ids);
    }

    fn remove_all(&self) {
        self.execute_logged("Removing all failed updates", "DELETE FROM failed_updates", &[]);
    }
}

fn query_records(conn: &Connection) -> Result<Vec<FailureRecord>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT manga_id, error_message, simplified_error_message
         FROM failed_updates ORDER BY manga_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(FailureRecord {
            manga_id: row.get(0)?,
            error_message: row.get(1)?,
            simplified_error_message: row.get(2)?,
        })
    })?;
    rows.collect()
}

fn query_count(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.query_row("SELECT COUNT(*) FROM failed_updates", [], |row| row.get(0))
}

/// Stores a failure together with its display message.
pub fn record_failure(
    repo: &dyn FailedUpdatesRepository,
    manga_id: MangaId,
    failure: &UpdateFailure,
    connectivity: &dyn Connectivity,
) -> Result<(), StoreError> {
    let simplified = classify(failure, connectivity);
    repo.upsert(manga_id, Some(&failure.to_string()), Some(&simplified))
}
