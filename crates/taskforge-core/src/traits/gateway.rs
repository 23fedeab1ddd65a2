//! Outbound notification port.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{OverdueEvent, UpcomingDeadlineEvent};

/// Forwards domain events to the external notification collaborator.
///
/// One best-effort call per event. The engine never consumes a return
/// value beyond logging; retry and backoff belong to the collaborator.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn send_overdue(&self, event: &OverdueEvent) -> Result<()>;

    async fn send_upcoming(&self, event: &UpcomingDeadlineEvent) -> Result<()>;
}
