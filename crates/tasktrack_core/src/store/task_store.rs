//! Task store contract and SQLite key-value implementation.
//!
//! The collection is stored as a JSON array under [`TASKS_KEY`] in the
//! `kv_store` table. Each element carries exactly the task fields:
//! `id, title, description, dueDate, assignee, tags, status, createdAt`.
//!
//! Blobs from before UUID identity carry timestamp ids. Those records get
//! fresh ids on load and the blob is rewritten once so the ids stick.

use crate::db::DbError;
use crate::model::task::{generate_id, Task, TaskRecord};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Well-known storage key of the task collection blob.
pub const TASKS_KEY: &str = "tasks";

/// Default blob size limit, mirroring a typical browser storage quota.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable store read/write failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialize(serde_json::Error),
    /// Serialized blob would exceed the configured quota.
    QuotaExceeded { size: usize, limit: usize },
    /// Stored blob decoded but violates collection invariants.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "task blob encoding failed: {err}"),
            Self::QuotaExceeded { size, limit } => write!(
                f,
                "storage quota exceeded: blob is {size} bytes, limit is {limit} bytes"
            ),
            Self::InvalidData(message) => write!(f, "invalid stored task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::QuotaExceeded { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Durable storage for the full task collection.
pub trait TaskStore {
    /// Reads the stored collection in storage order.
    ///
    /// Absent or unreadable data yields an empty collection.
    fn load(&self) -> Vec<Task>;

    /// Replaces the stored collection.
    fn save(&self, tasks: &[Task]) -> StoreResult<()>;
}

impl<T: TaskStore + ?Sized> TaskStore for &T {
    fn load(&self) -> Vec<Task> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        (**self).save(tasks)
    }
}

/// SQLite-backed task store.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
    quota_bytes: usize,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Creates a store over a migrated connection (see `db::open_db`).
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Overrides the blob size limit.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    fn read_blob(&self) -> StoreResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [TASKS_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn rewrite_reassigned(&self, tasks: &[Task], reassigned: usize) {
        match self.save(tasks) {
            Ok(()) => info!(
                "event=store_load module=store status=migrated key={TASKS_KEY} reassigned={reassigned}"
            ),
            Err(err) => warn!(
                "event=store_load module=store status=degraded key={TASKS_KEY} error_code=rewrite_failed reassigned={reassigned} error={err}"
            ),
        }
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn load(&self) -> Vec<Task> {
        let blob = match self.read_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("event=store_load module=store status=empty key={TASKS_KEY}");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=degraded key={TASKS_KEY} error_code=read_failed error={err}"
                );
                return Vec::new();
            }
        };

        match decode_blob(&blob) {
            Ok(Decoded { tasks, reassigned }) => {
                debug!(
                    "event=store_load module=store status=ok key={TASKS_KEY} count={}",
                    tasks.len()
                );
                if reassigned > 0 {
                    self.rewrite_reassigned(&tasks, reassigned);
                }
                tasks
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=degraded key={TASKS_KEY} error_code=corrupt_blob error={err}"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let blob = serde_json::to_string(tasks)?;
        if blob.len() > self.quota_bytes {
            error!(
                "event=store_save module=store status=error key={TASKS_KEY} error_code=quota_exceeded size={} limit={}",
                blob.len(),
                self.quota_bytes
            );
            return Err(StoreError::QuotaExceeded {
                size: blob.len(),
                limit: self.quota_bytes,
            });
        }

        // Single upsert statement: SQLite applies it atomically.
        if let Err(err) = self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![TASKS_KEY, blob],
        ) {
            error!(
                "event=store_save module=store status=error key={TASKS_KEY} error_code=write_failed error={err}"
            );
            return Err(err.into());
        }

        debug!(
            "event=store_save module=store status=ok key={TASKS_KEY} count={} size={}",
            tasks.len(),
            blob.len()
        );
        Ok(())
    }
}

struct Decoded {
    tasks: Vec<Task>,
    reassigned: usize,
}

/// Records without a UUID id get a fresh one. Duplicate UUIDs, invalid
/// records and malformed JSON reject the whole blob.
fn decode_blob(blob: &str) -> StoreResult<Decoded> {
    let records: Vec<TaskRecord> = serde_json::from_str(blob)?;

    let mut seen = HashSet::with_capacity(records.len());
    for id in records.iter().filter_map(|record| record.id) {
        if !seen.insert(id) {
            return Err(StoreError::InvalidData(format!("duplicate task id {id}")));
        }
    }

    let mut reassigned = 0;
    let mut tasks = Vec::with_capacity(records.len());
    for mut record in records {
        if record.id.is_none() {
            let id = generate_id(|candidate| seen.contains(&candidate));
            seen.insert(id);
            record.id = Some(id);
            reassigned += 1;
        }
        let task =
            Task::try_from(record).map_err(|err| StoreError::InvalidData(err.to_string()))?;
        tasks.push(task);
    }

    Ok(Decoded { tasks, reassigned })
}
