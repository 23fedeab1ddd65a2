//! Upcoming-deadline detection.
//!
//! Fires while the remaining time, truncated to whole hours, sits in the
//! `[23, 24]` window — i.e. roughly one day before the deadline. The poll
//! cadence (30–60 min) is below the window's 1-hour width, so a
//! continuously running scheduler observes every entity at least once
//! inside it. An entity that is edited past the window without a sweep
//! landing inside it is never notified; there is no backfill.

use chrono::{DateTime, Utc};
use taskforge_core::types::{EntitySnapshot, UpcomingDeadlineEvent};

const WINDOW_MIN_HOURS: i64 = 23;
const WINDOW_MAX_HOURS: i64 = 24;

/// What the sweep should do with one upcoming-deadline candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingDecision {
    /// Snapshot with `notified_upcoming` set; persisted by the sweep.
    pub snapshot: EntitySnapshot,
    pub event: UpcomingDeadlineEvent,
}

/// Evaluate one candidate against the upcoming window.
///
/// Completed entities are filtered upstream by the candidate query, not
/// here. Returns `None` once the flag is set or whenever the truncated
/// remaining hours fall outside the window (including negative remaining
/// time for entities already past due).
pub fn evaluate(snapshot: &EntitySnapshot, now: DateTime<Utc>) -> Option<UpcomingDecision> {
    if snapshot.notified_upcoming {
        return None;
    }

    let remaining_hours = (snapshot.due_date - now).num_hours();
    if !(WINDOW_MIN_HOURS..=WINDOW_MAX_HOURS).contains(&remaining_hours) {
        return None;
    }

    let mut snapshot = snapshot.clone();
    snapshot.notified_upcoming = true;

    let event = UpcomingDeadlineEvent {
        entity_id: snapshot.id,
        kind: snapshot.kind(),
        owner_id: snapshot.owner_id,
        title: snapshot.title.clone(),
        deadline: snapshot.due_date,
    };

    Some(UpcomingDecision { snapshot, event })
}
