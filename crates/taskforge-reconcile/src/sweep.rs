//! Sweep execution.
//!
//! One sweep: fetch candidates for a `(kind, condition)` pair, run the
//! detector over each snapshot, and apply positive decisions in the
//! order mutate-in-memory → publish → persist. A candidate-query failure
//! aborts the whole tick; a per-entity failure is logged and the sweep
//! continues. No cursor is kept anywhere — all sweep state lives in the
//! entities, which makes an interrupted sweep self-healing on the next
//! tick.

use std::sync::Arc;

use taskforge_core::clock::Clock;
use taskforge_core::error::Result;
use taskforge_core::traits::{CandidateRepository, EntityMutator};
use taskforge_core::types::EntityKind;

use crate::bus::EventBus;
use crate::detector::{overdue, upcoming};

/// Per-tick summary, logged by the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub scanned: usize,
    pub transitioned: usize,
    pub notified: usize,
    pub failed: usize,
}

pub struct ReconcileEngine {
    repository: Arc<dyn CandidateRepository>,
    mutator: Arc<dyn EntityMutator>,
    bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
}

impl ReconcileEngine {
    pub fn new(
        repository: Arc<dyn CandidateRepository>,
        mutator: Arc<dyn EntityMutator>,
        bus: Arc<EventBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, mutator, bus, clock }
    }

    /// Sweep all overdue candidates of `kind`.
    pub async fn run_overdue_sweep(&self, kind: EntityKind) -> Result<SweepStats> {
        let now = self.clock.now();
        let candidates = self.repository.overdue_candidates(kind, now).await?;

        let mut stats = SweepStats { scanned: candidates.len(), ..Default::default() };
        for candidate in candidates {
            let entity_id = candidate.id;

            let Some(decision) = overdue::evaluate(&candidate, now) else {
                continue;
            };
            let notified = decision.event.is_some();
            if let Some(event) = &decision.event {
                self.bus.publish_overdue(event);
            }
            match self.mutator.save(&decision.snapshot).await {
                Ok(()) => {
                    stats.transitioned += 1;
                    if notified {
                        stats.notified += 1;
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(%entity_id, %kind, "overdue sweep: persist failed: {e}");
                }
            }
        }
        Ok(stats)
    }

    /// Sweep all upcoming-deadline candidates of `kind`.
    pub async fn run_upcoming_sweep(&self, kind: EntityKind) -> Result<SweepStats> {
        let now = self.clock.now();
        let candidates = self.repository.upcoming_candidates(kind).await?;

        let mut stats = SweepStats { scanned: candidates.len(), ..Default::default() };
        for candidate in candidates {
            let entity_id = candidate.id;

            let Some(decision) = upcoming::evaluate(&candidate, now) else {
                continue;
            };
            self.bus.publish_upcoming(&decision.event);
            match self.mutator.save(&decision.snapshot).await {
                Ok(()) => {
                    stats.transitioned += 1;
                    stats.notified += 1;
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(%entity_id, %kind, "upcoming sweep: persist failed: {e}");
                }
            }
        }
        Ok(stats)
    }
}
