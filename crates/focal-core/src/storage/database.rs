//! SQLite-backed record store with change notification.
//!
//! Owns the four record tables (activities, tasks, intervals, repeatings),
//! serializes writes behind one connection mutex, and broadcasts a
//! [`Change`] after every committed mutation so view-state runtimes can
//! re-read the queries they depend on. Notifications name the table only;
//! subscribers read full result sets, never diffs.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use indoc::indoc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{DatabaseError, Result, ValidationError};
use crate::events::Change;
use crate::records::{Activity, ActivityKind, Interval, Repeating, Task};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// SQLite database holding all persisted records.
pub struct Database {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<Change>,
}

impl Database {
    /// Open the database at `~/.config/focal/focal.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = super::data_dir()?.join("focal.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let db = Self {
            conn: Mutex::new(conn),
            changes,
        };
        db.migrate()?;
        db.seed()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn migrate(&self) -> Result<()> {
        self.conn()
            .execute_batch(indoc! {"
                CREATE TABLE IF NOT EXISTS activities (
                    id    INTEGER PRIMARY KEY AUTOINCREMENT,
                    name  TEXT NOT NULL,
                    emoji TEXT NOT NULL DEFAULT '',
                    kind  TEXT NOT NULL DEFAULT 'normal'
                );

                CREATE TABLE IF NOT EXISTS tasks (
                    id        INTEGER PRIMARY KEY AUTOINCREMENT,
                    folder_id INTEGER NOT NULL,
                    text      TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS intervals (
                    start_time    INTEGER PRIMARY KEY,
                    timer_seconds INTEGER NOT NULL,
                    note          TEXT,
                    activity_id   INTEGER NOT NULL
                );

                CREATE TABLE IF NOT EXISTS repeatings (
                    id           INTEGER PRIMARY KEY AUTOINCREMENT,
                    text         TEXT NOT NULL,
                    period_title TEXT NOT NULL,
                    next_day     INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_tasks_folder ON tasks(folder_id);
            "})
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    /// Ensure the neutral activity paused intervals park on.
    fn seed(&self) -> Result<()> {
        let conn = self.conn();
        let others: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM activities WHERE kind = 'other'",
                [],
                |row| row.get(0),
            )
            .map_err(DatabaseError::from)?;
        if others == 0 {
            conn.execute(
                "INSERT INTO activities (name, emoji, kind) VALUES ('Other', '', 'other')",
                [],
            )
            .map_err(DatabaseError::from)?;
        }
        Ok(())
    }

    // ── Change stream ────────────────────────────────────────────────

    /// Subscribe to record change notifications. One subscription per
    /// consumer; a slow consumer that lags past the channel capacity
    /// receives `Lagged` and should re-read its queries.
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }

    fn notify(&self, change: Change) {
        debug!(?change, "record change");
        // Nobody listening is fine.
        let _ = self.changes.send(change);
    }

    // ── Activities ───────────────────────────────────────────────────

    pub fn insert_activity(&self, name: &str, emoji: &str, kind: ActivityKind) -> Result<i64> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO activities (name, emoji, kind) VALUES (?1, ?2, ?3)",
                params![name, emoji, format_activity_kind(kind)],
            )
            .map_err(DatabaseError::from)?;
            conn.last_insert_rowid()
        };
        self.notify(Change::Activities);
        Ok(id)
    }

    pub fn activity(&self, id: i64) -> Result<Option<Activity>> {
        let activity = self
            .conn()
            .query_row(
                "SELECT id, name, emoji, kind FROM activities WHERE id = ?1",
                params![id],
                row_to_activity,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(activity)
    }

    pub fn activities(&self) -> Result<Vec<Activity>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, emoji, kind FROM activities ORDER BY id")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], row_to_activity)
            .map_err(DatabaseError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    /// The seeded neutral activity. Its absence is a programmer error, not
    /// a user-facing condition, but it is still reported as an error rather
    /// than a panic.
    pub fn other_activity(&self) -> Result<Activity> {
        let activity = self
            .conn()
            .query_row(
                "SELECT id, name, emoji, kind FROM activities WHERE kind = 'other' LIMIT 1",
                [],
                row_to_activity,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        activity.ok_or_else(|| {
            ValidationError::MissingRecord {
                record: "other activity",
                id: 0,
            }
            .into()
        })
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn insert_task(&self, folder_id: i64, text: &str) -> Result<i64> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO tasks (folder_id, text) VALUES (?1, ?2)",
                params![folder_id, text],
            )
            .map_err(DatabaseError::from)?;
            conn.last_insert_rowid()
        };
        self.notify(Change::Tasks);
        Ok(id)
    }

    pub fn task(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .conn()
            .query_row(
                "SELECT id, folder_id, text FROM tasks WHERE id = ?1",
                params![id],
                row_to_task,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(task)
    }

    /// Tasks of one folder, ascending by id.
    pub fn tasks_in_folder(&self, folder_id: i64) -> Result<Vec<Task>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, folder_id, text FROM tasks WHERE folder_id = ?1 ORDER BY id")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![folder_id], row_to_task)
            .map_err(DatabaseError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    pub fn update_task_folder(&self, id: i64, folder_id: i64) -> Result<()> {
        self.conn()
            .execute(
                "UPDATE tasks SET folder_id = ?2 WHERE id = ?1",
                params![id, folder_id],
            )
            .map_err(DatabaseError::from)?;
        self.notify(Change::Tasks);
        Ok(())
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        self.conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        self.notify(Change::Tasks);
        Ok(())
    }

    // ── Intervals ────────────────────────────────────────────────────

    /// Insert or replace by start time. Replacing an existing row is the
    /// pause/prolong path: the interval keeps its identity while its timer,
    /// note and activity change.
    pub fn put_interval(&self, interval: &Interval) -> Result<()> {
        self.conn()
            .execute(
                indoc! {"
                    INSERT OR REPLACE INTO intervals (start_time, timer_seconds, note, activity_id)
                    VALUES (?1, ?2, ?3, ?4)
                "},
                params![
                    interval.start_time,
                    interval.timer_seconds,
                    interval.note,
                    interval.activity_id
                ],
            )
            .map_err(DatabaseError::from)?;
        self.notify(Change::Intervals);
        Ok(())
    }

    /// The current interval: greatest start time, if any.
    pub fn last_interval(&self) -> Result<Option<Interval>> {
        let interval = self
            .conn()
            .query_row(
                indoc! {"
                    SELECT start_time, timer_seconds, note, activity_id
                    FROM intervals ORDER BY start_time DESC LIMIT 1
                "},
                [],
                row_to_interval,
            )
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(interval)
    }

    /// Newest-first interval history.
    pub fn intervals_desc(&self, limit: u32) -> Result<Vec<Interval>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(indoc! {"
                SELECT start_time, timer_seconds, note, activity_id
                FROM intervals ORDER BY start_time DESC LIMIT ?1
            "})
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![limit], row_to_interval)
            .map_err(DatabaseError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    // ── Repeatings ───────────────────────────────────────────────────

    pub fn insert_repeating(&self, text: &str, period_title: &str, next_day: i64) -> Result<i64> {
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO repeatings (text, period_title, next_day) VALUES (?1, ?2, ?3)",
                params![text, period_title, next_day],
            )
            .map_err(DatabaseError::from)?;
            conn.last_insert_rowid()
        };
        self.notify(Change::Repeatings);
        Ok(id)
    }

    pub fn repeatings(&self) -> Result<Vec<Repeating>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, text, period_title, next_day FROM repeatings ORDER BY id")
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map([], row_to_repeating)
            .map_err(DatabaseError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    pub fn delete_repeating(&self, id: i64) -> Result<()> {
        self.conn()
            .execute("DELETE FROM repeatings WHERE id = ?1", params![id])
            .map_err(DatabaseError::from)?;
        self.notify(Change::Repeatings);
        Ok(())
    }
}

// === Row mapping ===

fn row_to_activity(row: &Row) -> std::result::Result<Activity, rusqlite::Error> {
    let kind: String = row.get(3)?;
    Ok(Activity {
        id: row.get(0)?,
        name: row.get(1)?,
        emoji: row.get(2)?,
        kind: parse_activity_kind(&kind),
    })
}

fn row_to_task(row: &Row) -> std::result::Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        folder_id: row.get(1)?,
        text: row.get(2)?,
    })
}

fn row_to_interval(row: &Row) -> std::result::Result<Interval, rusqlite::Error> {
    Ok(Interval {
        start_time: row.get(0)?,
        timer_seconds: row.get(1)?,
        note: row.get(2)?,
        activity_id: row.get(3)?,
    })
}

fn row_to_repeating(row: &Row) -> std::result::Result<Repeating, rusqlite::Error> {
    Ok(Repeating {
        id: row.get(0)?,
        text: row.get(1)?,
        period_title: row.get(2)?,
        next_day: row.get(3)?,
    })
}

/// Parse activity kind from database string
fn parse_activity_kind(kind: &str) -> ActivityKind {
    match kind {
        "other" => ActivityKind::Other,
        _ => ActivityKind::Normal,
    }
}

/// Format activity kind for database storage
fn format_activity_kind(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Normal => "normal",
        ActivityKind::Other => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_exactly_one_other_activity() {
        let db = Database::open_memory().unwrap();
        let other = db.other_activity().unwrap();
        assert!(other.is_other());
        assert_eq!(
            db.activities()
                .unwrap()
                .iter()
                .filter(|a| a.is_other())
                .count(),
            1
        );
    }

    #[test]
    fn put_interval_replaces_by_start_time() {
        let db = Database::open_memory().unwrap();
        let first = Interval {
            start_time: 1000,
            timer_seconds: 300,
            note: None,
            activity_id: 1,
        };
        db.put_interval(&first).unwrap();
        let second = Interval {
            timer_seconds: 600,
            note: Some("stretched".to_string()),
            ..first.clone()
        };
        db.put_interval(&second).unwrap();
        assert_eq!(db.intervals_desc(10).unwrap().len(), 1);
        assert_eq!(db.last_interval().unwrap(), Some(second));
    }

    #[test]
    fn mutations_notify_subscribers() {
        let db = Database::open_memory().unwrap();
        let mut rx = db.subscribe();
        db.insert_task(1, "write tests").unwrap();
        assert_eq!(rx.try_recv().unwrap(), Change::Tasks);
        db.delete_task(1).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Change::Tasks);
    }

    #[test]
    fn reopen_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focal.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.insert_task(1, "persisted").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.tasks_in_folder(1).unwrap().len(), 1);
        // Seeding is idempotent across reopens.
        assert_eq!(
            db.activities()
                .unwrap()
                .iter()
                .filter(|a| a.is_other())
                .count(),
            1
        );
    }

    #[test]
    fn tasks_in_folder_filters_and_sorts_ascending() {
        let db = Database::open_memory().unwrap();
        db.insert_task(1, "a").unwrap();
        db.insert_task(2, "b").unwrap();
        db.insert_task(1, "c").unwrap();
        let texts: Vec<String> = db
            .tasks_in_folder(1)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["a", "c"]);
    }
}
