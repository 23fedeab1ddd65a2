//! Domain events published by the reconciliation engine.
//!
//! Events are ephemeral: they exist only on the in-process bus and are
//! never persisted. Dedup lives in the entity's notified flags, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::EntityKind;

/// An entity crossed its due date without being completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverdueEvent {
    pub entity_id: Uuid,
    pub kind: EntityKind,
    pub owner_id: Uuid,
    pub title: String,
    pub due_date: DateTime<Utc>,
}

/// An entity's deadline is roughly a day away (23–24h remaining).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpcomingDeadlineEvent {
    pub entity_id: Uuid,
    pub kind: EntityKind,
    pub owner_id: Uuid,
    pub title: String,
    pub deadline: DateTime<Utc>,
}
