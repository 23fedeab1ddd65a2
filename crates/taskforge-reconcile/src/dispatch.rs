//! Notification dispatcher.
//!
//! The sole bus subscriber in the engine's scope. Bus handlers enqueue
//! the event onto an unbounded channel and return immediately, so
//! publishing never blocks a sweep on the outbound call. A spawned
//! worker drains the queue and makes one best-effort gateway call per
//! event; delivery failures are logged there and go no further.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use taskforge_core::error::TaskForgeError;
use taskforge_core::traits::NotificationGateway;
use taskforge_core::types::{OverdueEvent, UpcomingDeadlineEvent};

use crate::bus::EventBus;

#[derive(Debug)]
enum Delivery {
    Overdue(OverdueEvent),
    Upcoming(UpcomingDeadlineEvent),
    Flush(oneshot::Sender<()>),
}

pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Delivery>,
    worker: JoinHandle<()>,
}

impl NotificationDispatcher {
    /// Spawn the delivery worker for `gateway`.
    pub fn spawn(gateway: Arc<dyn NotificationGateway>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();

        let worker = tokio::spawn(async move {
            while let Some(delivery) = rx.recv().await {
                let result = match delivery {
                    Delivery::Overdue(event) => gateway.send_overdue(&event).await,
                    Delivery::Upcoming(event) => gateway.send_upcoming(&event).await,
                    Delivery::Flush(ack) => {
                        let _ = ack.send(());
                        continue;
                    }
                };
                if let Err(e) = result {
                    tracing::warn!(gateway = gateway.name(), "notification delivery failed: {e}");
                }
            }
        });

        Self { tx, worker }
    }

    /// Register this dispatcher's handlers on the bus.
    pub fn attach(&self, bus: &mut EventBus) {
        let tx = self.tx.clone();
        bus.subscribe_overdue(move |event| {
            tx.send(Delivery::Overdue(event.clone()))
                .map_err(|_| TaskForgeError::notification("dispatcher worker stopped"))
        });

        let tx = self.tx.clone();
        bus.subscribe_upcoming(move |event| {
            tx.send(Delivery::Upcoming(event.clone()))
                .map_err(|_| TaskForgeError::notification("dispatcher worker stopped"))
        });
    }

    /// Wait until every event enqueued before this call has been handed
    /// to the gateway.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Delivery::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Abort the worker. Queued events that were not yet delivered are
    /// dropped; delivery is best-effort by contract.
    pub fn shutdown(self) {
        drop(self.tx);
        self.worker.abort();
    }
}
