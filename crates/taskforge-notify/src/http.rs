//! HTTP gateway to the external notifier service.
//!
//! One POST per event. The service owns delivery, retry, and user
//! preferences; this side only reports whether the request itself was
//! accepted.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use taskforge_core::error::{Result, TaskForgeError};
use taskforge_core::traits::NotificationGateway;
use taskforge_core::types::{OverdueEvent, UpcomingDeadlineEvent};

use crate::messages::{self, NotificationType};

/// Wire body understood by the notifier service.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NotificationRequest {
    pub user_id: Uuid,
    pub subject: String,
    pub body: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
}

impl NotificationRequest {
    pub fn for_overdue(event: &OverdueEvent) -> Self {
        Self {
            user_id: event.owner_id,
            subject: messages::overdue_subject(event.kind, &event.title),
            body: String::new(),
            notification_type: NotificationType::Deadline,
        }
    }

    pub fn for_upcoming(event: &UpcomingDeadlineEvent) -> Self {
        Self {
            user_id: event.owner_id,
            subject: messages::upcoming_subject(event.kind, &event.title),
            body: String::new(),
            notification_type: NotificationType::Reminder,
        }
    }
}

pub struct HttpNotificationGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNotificationGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, request: &NotificationRequest) -> Result<()> {
        let url = format!("{}/api/v1/notifications", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TaskForgeError::notification(format!("POST {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(TaskForgeError::notification(format!(
                "notifier service returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn send_overdue(&self, event: &OverdueEvent) -> Result<()> {
        self.post(&NotificationRequest::for_overdue(event)).await
    }

    async fn send_upcoming(&self, event: &UpcomingDeadlineEvent) -> Result<()> {
        self.post(&NotificationRequest::for_upcoming(event)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskforge_core::types::EntityKind;

    #[test]
    fn test_overdue_request_body() {
        let event = OverdueEvent {
            entity_id: Uuid::new_v4(),
            kind: EntityKind::Task,
            owner_id: Uuid::new_v4(),
            title: "Pay invoices".into(),
            due_date: Utc::now(),
        };

        let request = NotificationRequest::for_overdue(&event);
        assert_eq!(request.user_id, event.owner_id);
        assert_eq!(request.notification_type, NotificationType::Deadline);
        assert!(request.subject.contains("Pay invoices"));
        assert!(request.body.is_empty());

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["type"], "deadline");
        assert_eq!(json["user_id"], event.owner_id.to_string());
    }

    #[test]
    fn test_upcoming_request_uses_reminder_type() {
        let event = UpcomingDeadlineEvent {
            entity_id: Uuid::new_v4(),
            kind: EntityKind::Project,
            owner_id: Uuid::new_v4(),
            title: "Website relaunch".into(),
            deadline: Utc::now(),
        };

        let request = NotificationRequest::for_upcoming(&event);
        assert_eq!(request.notification_type, NotificationType::Reminder);
        assert!(request.subject.contains("Website relaunch"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway = HttpNotificationGateway::new("http://localhost:8081/");
        assert_eq!(gateway.base_url, "http://localhost:8081");
    }
}
