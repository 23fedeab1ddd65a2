//! # TaskForge Reconcile
//! The deadline reconciliation engine: pure detectors, a typed
//! in-process event bus, the notification dispatcher, and the
//! four-job scheduler that drives it all.
//!
//! ```text
//! ReconciliationScheduler (4 tokio intervals, non-reentrant)
//!   ├── task-overdue     every 60s   ─┐
//!   ├── project-overdue  every 60s    ├─→ ReconcileEngine sweep
//!   ├── task-upcoming    every 30min  │     fetch → detect → publish → persist
//!   └── project-upcoming every 60min ─┘
//!                                  EventBus ──→ NotificationDispatcher ──→ gateway
//! ```

pub mod bus;
pub mod detector;
pub mod dispatch;
pub mod scheduler;
pub mod sweep;

#[cfg(test)]
mod testutil;

pub use bus::EventBus;
pub use dispatch::NotificationDispatcher;
pub use scheduler::{ReconciliationScheduler, SweepCheck};
pub use sweep::{ReconcileEngine, SweepStats};
