//! Overdue detection.
//!
//! Pure function of `(snapshot, now)`. The sweep owns all I/O: it fetches
//! the candidate, applies the returned decision, publishes the event, and
//! persists the snapshot.

use chrono::{DateTime, Utc};
use taskforge_core::types::{EntitySnapshot, OverdueEvent};

/// What the sweep should do with one overdue candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueDecision {
    /// Mutated snapshot to persist. Persisted every time the overdue
    /// condition holds, even when nothing changed since the last tick.
    pub snapshot: EntitySnapshot,
    /// Set exactly once per entity: only while `notified_overdue` was
    /// still clear.
    pub event: Option<OverdueEvent>,
}

/// Evaluate one candidate against the overdue condition.
///
/// Returns `None` when the entity is completed, deleted, or not yet due —
/// no mutation, no event. `Overdue` is sticky: an already-overdue entity
/// keeps the status and is simply re-persisted without a second event.
pub fn evaluate(snapshot: &EntitySnapshot, now: DateTime<Utc>) -> Option<OverdueDecision> {
    if snapshot.due_date > now || snapshot.status.is_completed() || snapshot.deleted {
        return None;
    }

    let mut snapshot = snapshot.clone();
    snapshot.status = snapshot.status.overdue();

    let event = if snapshot.notified_overdue {
        None
    } else {
        snapshot.notified_overdue = true;
        Some(OverdueEvent {
            entity_id: snapshot.id,
            kind: snapshot.kind(),
            owner_id: snapshot.owner_id,
            title: snapshot.title.clone(),
            due_date: snapshot.due_date,
        })
    };

    Some(OverdueDecision { snapshot, event })
}
