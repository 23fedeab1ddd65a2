//! Storage-facing ports consumed by the reconciliation engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{EntityKind, EntitySnapshot};

/// Read-only access to sweep candidates.
///
/// Implementations apply the completed/deleted filters themselves; the
/// detectors assume every snapshot they receive already passed them.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Entities of `kind` that are not completed, not deleted, and whose
    /// due date is at or before `now`.
    async fn overdue_candidates(
        &self,
        kind: EntityKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<EntitySnapshot>>;

    /// Entities of `kind` that are not completed and not deleted,
    /// regardless of due date.
    async fn upcoming_candidates(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>>;
}

/// Write port for persisting a mutated snapshot (status + dedup flags).
#[async_trait]
pub trait EntityMutator: Send + Sync {
    async fn save(&self, snapshot: &EntitySnapshot) -> Result<()>;
}
