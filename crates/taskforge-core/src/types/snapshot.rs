//! Flat entity snapshots handed to the detectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{EntityKind, EntityStatus, ProjectStatus, TaskStatus};

/// Immutable view of a deadline-bearing entity (task or project).
///
/// The repository port returns these instead of live storage handles, so
/// the detectors can never trigger hidden I/O. Only the fields the
/// reconciliation state machine consults are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub status: EntityStatus,
    pub deleted: bool,
    pub notified_overdue: bool,
    pub notified_upcoming: bool,
}

impl EntitySnapshot {
    /// A fresh task snapshot: dedup flags cleared, not deleted.
    pub fn task(
        id: Uuid,
        owner_id: Uuid,
        title: impl Into<String>,
        due_date: DateTime<Utc>,
        status: TaskStatus,
    ) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            due_date,
            status: EntityStatus::Task(status),
            deleted: false,
            notified_overdue: false,
            notified_upcoming: false,
        }
    }

    /// A fresh project snapshot: dedup flags cleared, not deleted.
    pub fn project(
        id: Uuid,
        owner_id: Uuid,
        title: impl Into<String>,
        due_date: DateTime<Utc>,
        status: ProjectStatus,
    ) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            due_date,
            status: EntityStatus::Project(status),
            deleted: false,
            notified_overdue: false,
            notified_upcoming: false,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.status.kind()
    }
}
