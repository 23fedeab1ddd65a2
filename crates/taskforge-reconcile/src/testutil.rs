//! In-memory doubles shared by the engine and scheduler tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use taskforge_core::error::{Result, TaskForgeError};
use taskforge_core::traits::{CandidateRepository, EntityMutator};
use taskforge_core::types::{EntityKind, EntitySnapshot, OverdueEvent, UpcomingDeadlineEvent};

use crate::bus::EventBus;

/// Vec-backed store implementing both engine ports, with failure and
/// latency injection.
#[derive(Default)]
pub struct InMemoryStore {
    entities: Mutex<Vec<EntitySnapshot>>,
    save_counts: Mutex<Vec<Uuid>>,
    failing_saves: Mutex<HashSet<Uuid>>,
    failing_queries: AtomicBool,
    query_delay: Mutex<Option<Duration>>,
    queries: AtomicUsize,
    active_queries: AtomicUsize,
    max_active_queries: AtomicUsize,
}

impl InMemoryStore {
    pub fn insert(&self, snapshot: EntitySnapshot) {
        self.entities.lock().expect("entities lock").push(snapshot);
    }

    pub fn fetch(&self, id: Uuid) -> Option<EntitySnapshot> {
        self.entities
            .lock()
            .expect("entities lock")
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<EntitySnapshot> {
        self.entities.lock().expect("entities lock").clone()
    }

    pub fn saves_for(&self, id: Uuid) -> usize {
        self.save_counts
            .lock()
            .expect("saves lock")
            .iter()
            .filter(|saved| **saved == id)
            .count()
    }

    pub fn fail_queries(&self, fail: bool) {
        self.failing_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves_for(&self, id: Uuid) {
        self.failing_saves.lock().expect("failing lock").insert(id);
    }

    pub fn clear_save_failures(&self) {
        self.failing_saves.lock().expect("failing lock").clear();
    }

    pub fn delay_queries(&self, delay: Duration) {
        *self.query_delay.lock().expect("delay lock") = Some(delay);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Highest number of queries ever in flight at once.
    pub fn max_active_queries(&self) -> usize {
        self.max_active_queries.load(Ordering::SeqCst)
    }

    async fn begin_query(&self) -> Result<()> {
        if self.failing_queries.load(Ordering::SeqCst) {
            return Err(TaskForgeError::repository("simulated outage"));
        }
        self.queries.fetch_add(1, Ordering::SeqCst);
        let active = self.active_queries.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_queries.fetch_max(active, Ordering::SeqCst);

        let delay = *self.query_delay.lock().expect("delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn end_query(&self) {
        self.active_queries.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CandidateRepository for InMemoryStore {
    async fn overdue_candidates(
        &self,
        kind: EntityKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<EntitySnapshot>> {
        self.begin_query().await?;
        let candidates = self
            .entities
            .lock()
            .expect("entities lock")
            .iter()
            .filter(|e| {
                e.kind() == kind && !e.status.is_completed() && !e.deleted && e.due_date <= now
            })
            .cloned()
            .collect();
        self.end_query();
        Ok(candidates)
    }

    async fn upcoming_candidates(&self, kind: EntityKind) -> Result<Vec<EntitySnapshot>> {
        self.begin_query().await?;
        let candidates = self
            .entities
            .lock()
            .expect("entities lock")
            .iter()
            .filter(|e| e.kind() == kind && !e.status.is_completed() && !e.deleted)
            .cloned()
            .collect();
        self.end_query();
        Ok(candidates)
    }
}

#[async_trait]
impl EntityMutator for InMemoryStore {
    async fn save(&self, snapshot: &EntitySnapshot) -> Result<()> {
        if self.failing_saves.lock().expect("failing lock").contains(&snapshot.id) {
            return Err(TaskForgeError::persist("simulated write failure"));
        }
        let mut entities = self.entities.lock().expect("entities lock");
        let Some(slot) = entities.iter_mut().find(|e| e.id == snapshot.id) else {
            return Err(TaskForgeError::persist(format!("unknown entity {}", snapshot.id)));
        };
        *slot = snapshot.clone();
        self.save_counts.lock().expect("saves lock").push(snapshot.id);
        Ok(())
    }
}

type EventLog<E> = Arc<Mutex<Vec<E>>>;

/// Subscribe recording handlers for both event types.
pub fn subscribe_counting(
    bus: &mut EventBus,
) -> (EventLog<OverdueEvent>, EventLog<UpcomingDeadlineEvent>) {
    let overdue: EventLog<OverdueEvent> = Arc::default();
    let upcoming: EventLog<UpcomingDeadlineEvent> = Arc::default();

    let log = Arc::clone(&overdue);
    bus.subscribe_overdue(move |event| {
        log.lock().expect("overdue log lock").push(event.clone());
        Ok(())
    });
    let log = Arc::clone(&upcoming);
    bus.subscribe_upcoming(move |event| {
        log.lock().expect("upcoming log lock").push(event.clone());
        Ok(())
    });

    (overdue, upcoming)
}
