//! Reconciliation scheduler.
//!
//! Four independent periodic jobs, one per (entity kind, condition)
//! pair, each on its own tokio interval. A job is non-reentrant: the
//! loop awaits its sweep inline and missed ticks are skipped, and an
//! atomic in-flight guard covers the manual trigger points so an
//! operator-invoked sweep can never overlap the timer-driven one for
//! the same job. Overlap exclusion is what keeps the dedup flags
//! single-writer; no entity-level locking is needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use taskforge_core::error::Result;
use taskforge_core::types::EntityKind;

use crate::sweep::{ReconcileEngine, SweepStats};

/// Sweep cadences, matching the product's reconciliation contract.
pub const TASK_OVERDUE_PERIOD: Duration = Duration::from_secs(60);
pub const PROJECT_OVERDUE_PERIOD: Duration = Duration::from_secs(60);
pub const TASK_UPCOMING_PERIOD: Duration = Duration::from_secs(30 * 60);
pub const PROJECT_UPCOMING_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Which condition a job sweeps for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepCheck {
    Overdue,
    Upcoming,
}

fn job_name(kind: EntityKind, check: SweepCheck) -> &'static str {
    match (kind, check) {
        (EntityKind::Task, SweepCheck::Overdue) => "task-overdue",
        (EntityKind::Task, SweepCheck::Upcoming) => "task-upcoming",
        (EntityKind::Project, SweepCheck::Overdue) => "project-overdue",
        (EntityKind::Project, SweepCheck::Upcoming) => "project-upcoming",
    }
}

fn job_period(kind: EntityKind, check: SweepCheck) -> Duration {
    match (kind, check) {
        (EntityKind::Task, SweepCheck::Overdue) => TASK_OVERDUE_PERIOD,
        (EntityKind::Task, SweepCheck::Upcoming) => TASK_UPCOMING_PERIOD,
        (EntityKind::Project, SweepCheck::Overdue) => PROJECT_OVERDUE_PERIOD,
        (EntityKind::Project, SweepCheck::Upcoming) => PROJECT_UPCOMING_PERIOD,
    }
}

/// Per-job in-flight marker. `try_acquire` wins at most once until the
/// returned token drops.
struct JobGuard {
    running: AtomicBool,
}

impl JobGuard {
    fn new() -> Self {
        Self { running: AtomicBool::new(false) }
    }

    fn try_acquire(&self) -> Option<JobGuardToken<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobGuardToken { guard: self })
    }
}

struct JobGuardToken<'a> {
    guard: &'a JobGuard,
}

impl Drop for JobGuardToken<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

struct Guards {
    task_overdue: Arc<JobGuard>,
    task_upcoming: Arc<JobGuard>,
    project_overdue: Arc<JobGuard>,
    project_upcoming: Arc<JobGuard>,
}

impl Guards {
    fn new() -> Self {
        Self {
            task_overdue: Arc::new(JobGuard::new()),
            task_upcoming: Arc::new(JobGuard::new()),
            project_overdue: Arc::new(JobGuard::new()),
            project_upcoming: Arc::new(JobGuard::new()),
        }
    }

    fn get(&self, kind: EntityKind, check: SweepCheck) -> &Arc<JobGuard> {
        match (kind, check) {
            (EntityKind::Task, SweepCheck::Overdue) => &self.task_overdue,
            (EntityKind::Task, SweepCheck::Upcoming) => &self.task_upcoming,
            (EntityKind::Project, SweepCheck::Overdue) => &self.project_overdue,
            (EntityKind::Project, SweepCheck::Upcoming) => &self.project_upcoming,
        }
    }
}

pub struct ReconciliationScheduler {
    engine: Arc<ReconcileEngine>,
    guards: Guards,
    shutdown_tx: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ReconciliationScheduler {
    pub fn new(engine: Arc<ReconcileEngine>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            engine,
            guards: Guards::new(),
            shutdown_tx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn all four sweep jobs.
    pub fn start(&self) {
        let mut handles = self.handles.lock().expect("handles lock");
        for (kind, check) in [
            (EntityKind::Task, SweepCheck::Overdue),
            (EntityKind::Project, SweepCheck::Overdue),
            (EntityKind::Task, SweepCheck::Upcoming),
            (EntityKind::Project, SweepCheck::Upcoming),
        ] {
            handles.push(self.spawn_job(kind, check, job_period(kind, check)));
        }
    }

    /// Signal all jobs to stop. In-flight sweeps finish; future ticks
    /// are suppressed.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for every spawned job to observe the stop signal and exit.
    pub async fn join(&self) {
        let handles: Vec<_> = self.handles.lock().expect("handles lock").drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Manual trigger sharing the job's in-flight guard. Returns
    /// `Ok(None)` when the job was already running and this invocation
    /// was skipped.
    pub async fn run_overdue_sweep(&self, kind: EntityKind) -> Result<Option<SweepStats>> {
        let guard = self.guards.get(kind, SweepCheck::Overdue);
        Self::run_guarded(&self.engine, guard, kind, SweepCheck::Overdue).await
    }

    /// Manual trigger for the upcoming-deadline job; see [`Self::run_overdue_sweep`].
    pub async fn run_upcoming_sweep(&self, kind: EntityKind) -> Result<Option<SweepStats>> {
        let guard = self.guards.get(kind, SweepCheck::Upcoming);
        Self::run_guarded(&self.engine, guard, kind, SweepCheck::Upcoming).await
    }

    async fn run_guarded(
        engine: &ReconcileEngine,
        guard: &JobGuard,
        kind: EntityKind,
        check: SweepCheck,
    ) -> Result<Option<SweepStats>> {
        let Some(_running) = guard.try_acquire() else {
            tracing::debug!(job = job_name(kind, check), "previous run still in flight, skipping");
            return Ok(None);
        };
        let stats = match check {
            SweepCheck::Overdue => engine.run_overdue_sweep(kind).await?,
            SweepCheck::Upcoming => engine.run_upcoming_sweep(kind).await?,
        };
        Ok(Some(stats))
    }

    fn spawn_job(&self, kind: EntityKind, check: SweepCheck, period: Duration) -> JoinHandle<()> {
        let engine = Arc::clone(&self.engine);
        let guard = Arc::clone(self.guards.get(kind, check));
        let mut shutdown = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let job = job_name(kind, check);
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!(job, period_secs = period.as_secs(), "sweep job started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match Self::run_guarded(&engine, &guard, kind, check).await {
                            Ok(Some(stats)) => tracing::info!(
                                job,
                                scanned = stats.scanned,
                                transitioned = stats.transitioned,
                                notified = stats.notified,
                                failed = stats.failed,
                                "sweep complete"
                            ),
                            Ok(None) => {}
                            // Candidate query failed; this tick is lost,
                            // the next one retries from scratch.
                            Err(e) => tracing::error!(job, "sweep aborted: {e}"),
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!(job, "sweep job stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::testutil::{subscribe_counting, InMemoryStore};
    use chrono::{Duration as ChronoDuration, Utc};
    use taskforge_core::clock::ManualClock;
    use taskforge_core::types::{EntitySnapshot, TaskStatus};
    use uuid::Uuid;

    struct Harness {
        store: Arc<InMemoryStore>,
        scheduler: ReconciliationScheduler,
        overdue_events: Arc<Mutex<Vec<taskforge_core::types::OverdueEvent>>>,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::default());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut bus = EventBus::new();
        let (overdue_events, _) = subscribe_counting(&mut bus);
        let engine = Arc::new(ReconcileEngine::new(
            store.clone(),
            store.clone(),
            Arc::new(bus),
            clock,
        ));
        Harness { store, scheduler: ReconciliationScheduler::new(engine), overdue_events }
    }

    fn late_task(store: &InMemoryStore) -> EntitySnapshot {
        let task = EntitySnapshot::task(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "late",
            Utc::now() - ChronoDuration::hours(1),
            TaskStatus::Todo,
        );
        store.insert(task.clone());
        task
    }

    #[tokio::test]
    async fn test_concurrent_triggers_of_same_job_yield_one_event() {
        let h = harness();
        late_task(&h.store);
        h.store.delay_queries(Duration::from_millis(50));

        let (first, second) = tokio::join!(
            h.scheduler.run_overdue_sweep(EntityKind::Task),
            h.scheduler.run_overdue_sweep(EntityKind::Task),
        );

        let outcomes = [first.expect("first trigger"), second.expect("second trigger")];
        assert_eq!(outcomes.iter().filter(|o| o.is_some()).count(), 1, "one ran, one skipped");
        assert_eq!(h.overdue_events.lock().expect("events lock").len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_jobs_do_not_share_a_guard() {
        let h = harness();
        h.store.delay_queries(Duration::from_millis(50));

        let (task_sweep, project_sweep) = tokio::join!(
            h.scheduler.run_overdue_sweep(EntityKind::Task),
            h.scheduler.run_overdue_sweep(EntityKind::Project),
        );

        assert!(task_sweep.expect("task sweep").is_some());
        assert!(project_sweep.expect("project sweep").is_some());
    }

    #[tokio::test]
    async fn test_job_loop_never_overlaps_itself() {
        let h = harness();
        late_task(&h.store);
        h.store.delay_queries(Duration::from_millis(25));

        // Private period override: a tick fires long before the sweep
        // finishes, so skipped ticks are exercised.
        let handle = h.scheduler.spawn_job(
            EntityKind::Task,
            SweepCheck::Overdue,
            Duration::from_millis(5),
        );
        tokio::time::sleep(Duration::from_millis(120)).await;
        h.scheduler.stop();
        let _ = handle.await;

        assert_eq!(h.store.max_active_queries(), 1, "sweeps must never overlap");
        assert!(h.store.query_count() >= 2, "job should have ticked repeatedly");
        assert_eq!(h.overdue_events.lock().expect("events lock").len(), 1);
    }

    #[tokio::test]
    async fn test_query_failure_only_skips_one_tick() {
        let h = harness();
        late_task(&h.store);
        h.store.fail_queries(true);

        let handle = h.scheduler.spawn_job(
            EntityKind::Task,
            SweepCheck::Overdue,
            Duration::from_millis(5),
        );
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.store.fail_queries(false);
        tokio::time::sleep(Duration::from_millis(30)).await;
        h.scheduler.stop();
        let _ = handle.await;

        assert_eq!(h.overdue_events.lock().expect("events lock").len(), 1, "recovered after outage");
    }

    #[tokio::test]
    async fn test_stop_suppresses_future_ticks() {
        let h = harness();
        h.scheduler.start();
        tokio::time::sleep(Duration::from_millis(20)).await;
        h.scheduler.stop();
        h.scheduler.join().await;

        let before = h.store.query_count();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(h.store.query_count(), before, "no sweeps after shutdown");
    }
}
