//! Typed, synchronous, in-process event bus.
//!
//! Subscribers are registered explicitly at wiring time (one list per
//! event type) and invoked on the publisher's execution context, in
//! registration order. `publish_*` never fails: a subscriber error or
//! panic is logged and the remaining subscribers still run, so a broken
//! listener can never corrupt a sweep.

use std::panic::{AssertUnwindSafe, catch_unwind};

use taskforge_core::error::Result;
use taskforge_core::types::{OverdueEvent, UpcomingDeadlineEvent};

type Handler<E> = Box<dyn Fn(&E) -> Result<()> + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    overdue: Vec<Handler<OverdueEvent>>,
    upcoming: Vec<Handler<UpcomingDeadlineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_overdue<F>(&mut self, handler: F)
    where
        F: Fn(&OverdueEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.overdue.push(Box::new(handler));
    }

    pub fn subscribe_upcoming<F>(&mut self, handler: F)
    where
        F: Fn(&UpcomingDeadlineEvent) -> Result<()> + Send + Sync + 'static,
    {
        self.upcoming.push(Box::new(handler));
    }

    pub fn publish_overdue(&self, event: &OverdueEvent) {
        Self::deliver(&self.overdue, event, "overdue");
    }

    pub fn publish_upcoming(&self, event: &UpcomingDeadlineEvent) {
        Self::deliver(&self.upcoming, event, "upcoming_deadline");
    }

    fn deliver<E>(handlers: &[Handler<E>], event: &E, event_type: &str) {
        for (index, handler) in handlers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(event_type, subscriber = index, "subscriber failed: {e}");
                }
                Err(_) => {
                    tracing::error!(event_type, subscriber = index, "subscriber panicked");
                }
            }
        }
    }
}
