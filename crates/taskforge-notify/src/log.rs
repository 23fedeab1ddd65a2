//! Log-only gateway.
//!
//! Default backend when no notifier service is configured: every event
//! becomes a structured log line and nothing leaves the process.

use async_trait::async_trait;

use taskforge_core::error::Result;
use taskforge_core::traits::NotificationGateway;
use taskforge_core::types::{OverdueEvent, UpcomingDeadlineEvent};

use crate::messages;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogGateway;

#[async_trait]
impl NotificationGateway for LogGateway {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_overdue(&self, event: &OverdueEvent) -> Result<()> {
        tracing::info!(
            entity_id = %event.entity_id,
            owner_id = %event.owner_id,
            due_date = %event.due_date,
            "{}",
            messages::overdue_subject(event.kind, &event.title)
        );
        Ok(())
    }

    async fn send_upcoming(&self, event: &UpcomingDeadlineEvent) -> Result<()> {
        tracing::info!(
            entity_id = %event.entity_id,
            owner_id = %event.owner_id,
            deadline = %event.deadline,
            "{}",
            messages::upcoming_subject(event.kind, &event.title)
        );
        Ok(())
    }
}
