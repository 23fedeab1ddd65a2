//! SQLite entity store.
//!
//! Backs both engine ports plus the small write surface the rest of the
//! tracker needs to stock the store. Timestamps are RFC 3339 UTC strings
//! with whole-second precision, so string comparison in SQL orders them
//! correctly.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use taskforge_core::error::{Result, TaskForgeError};
use taskforge_core::traits::{CandidateRepository, EntityMutator};
use taskforge_core::types::{
    EntityKind, EntitySnapshot, EntityStatus, ProjectStatus, TaskStatus,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL,
    due_date TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0,
    notified_overdue INTEGER NOT NULL DEFAULT 0,
    notified_upcoming INTEGER NOT NULL DEFAULT 0,
    completed_on TEXT,
    created_on TEXT NOT NULL,
    updated_on TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL,
    due_date TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0,
    notified_overdue INTEGER NOT NULL DEFAULT 0,
    notified_upcoming INTEGER NOT NULL DEFAULT 0,
    completed_on TEXT,
    created_on TEXT NOT NULL,
    updated_on TEXT NOT NULL
);
";

const SNAPSHOT_COLUMNS: &str =
    "id, owner_id, title, status, due_date, deleted, notified_overdue, notified_upcoming";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Task => "tasks",
        EntityKind::Project => "projects",
    }
}

fn ts(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| TaskForgeError::store(format!("bad timestamp '{raw}': {e}")))
}

fn parse_status(kind: EntityKind, raw: &str) -> Result<EntityStatus> {
    match kind {
        EntityKind::Task => TaskStatus::parse(raw).map(EntityStatus::Task),
        EntityKind::Project => ProjectStatus::parse(raw).map(EntityStatus::Project),
    }
    .ok_or_else(|| TaskForgeError::store(format!("unknown {kind} status '{raw}'")))
}

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| TaskForgeError::store(format!("bad id '{raw}': {e}")))
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and bootstrap
    /// the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| TaskForgeError::Store(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TaskForgeError::Store(e.to_string()))
    }

    /// Insert a new entity. Dedup flags start cleared regardless of the
    /// snapshot's values; only the engine sets them.
    pub fn create(&self, snapshot: &EntitySnapshot, description: &str) -> Result<()> {
        let now = ts(Utc::now());
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, owner_id, title, description, status, due_date, deleted,
                     notified_overdue, notified_upcoming, created_on, updated_on)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, 0, ?7, ?7)",
                table(snapshot.kind())
            ),
            rusqlite::params![
                snapshot.id.to_string(),
                snapshot.owner_id.to_string(),
                snapshot.title,
                description,
                snapshot.status.as_str(),
                ts(snapshot.due_date),
                now,
            ],
        )
        .map_err(|e| TaskForgeError::Store(e.to_string()))?;
        Ok(())
    }

    pub fn fetch(&self, kind: EntityKind, id: Uuid) -> Result<Option<EntitySnapshot>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM {} WHERE id = ?1",
                table(kind)
            ))
            .map_err(|e| TaskForgeError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(rusqlite::params![id.to_string()])
            .map_err(|e| TaskForgeError::Store(e.to_string()))?;
        match rows.next().map_err(|e| TaskForgeError::Store(e.to_string()))? {
            Some(row) => Ok(Some(Self::snapshot_from_row(kind, row)?)),
            None => Ok(None),
        }
    }

    /// Mark an entity completed. Idempotent; a completed entity is
    /// permanently out of the engine's reach.
    pub fn complete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        let now = ts(Utc::now());
        self.update_row(
            kind,
            id,
            "status = 'completed', completed_on = ?2, updated_on = ?2",
            rusqlite::params![id.to_string(), now],
        )
    }

    /// Soft-delete: the row stays but every sweep ignores it.
    pub fn soft_delete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        let now = ts(Utc::now());
        self.update_row(
            kind,
            id,
            "deleted = 1, updated_on = ?2",
            rusqlite::params![id.to_string(), now],
        )
    }

    /// Change the due date. The notified flags are deliberately left
    /// untouched: a rescheduled entity that was already notified will
    /// not be notified again.
    pub fn edit_due_date(&self, kind: EntityKind, id: Uuid, due_date: DateTime<Utc>) -> Result<()> {
        let now = ts(Utc::now());
        self.update_row(
            kind,
            id,
            "due_date = ?2, updated_on = ?3",
            rusqlite::params![id.to_string(), ts(due_date), now],
        )
    }

    /// All non-deleted entities of `kind`, soonest due first.
    pub fn list(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>> {
        self.query_snapshots(kind, "deleted = 0", [])
    }

    /// Flip a task between Todo and In Progress. Any other status is
    /// left as-is.
    pub fn toggle_task_status(&self, id: Uuid) -> Result<()> {
        let Some(snapshot) = self.fetch(EntityKind::Task, id)? else {
            return Err(TaskForgeError::NotFound(id.to_string()));
        };
        let next = match snapshot.status {
            EntityStatus::Task(TaskStatus::Todo) => TaskStatus::InProgress,
            EntityStatus::Task(TaskStatus::InProgress) => TaskStatus::Todo,
            _ => return Ok(()),
        };
        let now = ts(Utc::now());
        self.update_row(
            EntityKind::Task,
            id,
            "status = ?2, updated_on = ?3",
            rusqlite::params![id.to_string(), next.as_str(), now],
        )
    }

    fn update_row(
        &self,
        kind: EntityKind,
        id: Uuid,
        set_clause: &str,
        params: impl rusqlite::Params,
    ) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                &format!("UPDATE {} SET {set_clause} WHERE id = ?1", table(kind)),
                params,
            )
            .map_err(|e| TaskForgeError::Store(e.to_string()))?;
        if updated == 0 {
            return Err(TaskForgeError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn snapshot_from_row(kind: EntityKind, row: &rusqlite::Row<'_>) -> Result<EntitySnapshot> {
        let id: String = row.get(0).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let owner_id: String = row.get(1).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let title: String = row.get(2).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let status: String = row.get(3).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let due_date: String = row.get(4).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let deleted: bool = row.get(5).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let notified_overdue: bool = row.get(6).map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let notified_upcoming: bool = row.get(7).map_err(|e| TaskForgeError::Store(e.to_string()))?;

        Ok(EntitySnapshot {
            id: parse_id(&id)?,
            owner_id: parse_id(&owner_id)?,
            title,
            due_date: parse_ts(&due_date)?,
            status: parse_status(kind, &status)?,
            deleted,
            notified_overdue,
            notified_upcoming,
        })
    }

    fn query_snapshots(
        &self,
        kind: EntityKind,
        where_clause: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<EntitySnapshot>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM {} WHERE {where_clause} ORDER BY due_date ASC",
                table(kind)
            ))
            .map_err(|e| TaskForgeError::Store(e.to_string()))?;

        let mut rows = stmt
            .query(params)
            .map_err(|e| TaskForgeError::Store(e.to_string()))?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next().map_err(|e| TaskForgeError::Store(e.to_string()))? {
            // A malformed row must not poison the whole candidate set,
            // or every future sweep would abort on it.
            match Self::snapshot_from_row(kind, row) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => {
                    let e = TaskForgeError::entity(e.to_string());
                    tracing::warn!("skipping unreadable {kind} row: {e}");
                }
            }
        }
        Ok(snapshots)
    }
}

#[async_trait]
impl CandidateRepository for SqliteStore {
    async fn overdue_candidates(
        &self,
        kind: EntityKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<EntitySnapshot>> {
        self.query_snapshots(
            kind,
            "deleted = 0 AND status != 'completed' AND due_date <= ?1",
            rusqlite::params![ts(now)],
        )
        .map_err(|e| TaskForgeError::repository(e.to_string()))
    }

    async fn upcoming_candidates(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>> {
        self.query_snapshots(kind, "deleted = 0 AND status != 'completed'", [])
            .map_err(|e| TaskForgeError::repository(e.to_string()))
    }
}

#[async_trait]
impl EntityMutator for SqliteStore {
    async fn save(&self, snapshot: &EntitySnapshot) -> Result<()> {
        let now = ts(Utc::now());
        self.update_row(
            snapshot.kind(),
            snapshot.id,
            "status = ?2, notified_overdue = ?3, notified_upcoming = ?4, updated_on = ?5",
            rusqlite::params![
                snapshot.id.to_string(),
                snapshot.status.as_str(),
                snapshot.notified_overdue,
                snapshot.notified_upcoming,
                now,
            ],
        )
        .map_err(|e| TaskForgeError::persist(e.to_string()))
    }
}
