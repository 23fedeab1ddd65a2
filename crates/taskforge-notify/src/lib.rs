//! # TaskForge Notify
//! Notification gateway backends and the message catalog.

pub mod http;
pub mod log;
pub mod messages;

use std::sync::Arc;

use taskforge_core::config::NotifierConfig;
use taskforge_core::error::{Result, TaskForgeError};
use taskforge_core::traits::NotificationGateway;

pub use http::HttpNotificationGateway;
pub use log::LogGateway;
pub use messages::NotificationType;

/// Create a notification gateway from configuration.
pub fn create_gateway(config: &NotifierConfig) -> Result<Arc<dyn NotificationGateway>> {
    match config.backend.as_str() {
        "http" => {
            let url = config.url.as_deref().ok_or_else(|| {
                TaskForgeError::config("notifier.url is required for the http backend")
            })?;
            Ok(Arc::new(HttpNotificationGateway::new(url)))
        }
        "log" => Ok(Arc::new(LogGateway)),
        other => Err(TaskForgeError::config(format!(
            "Unknown notifier backend: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gateway_backends() {
        let log = create_gateway(&NotifierConfig { backend: "log".into(), url: None })
            .expect("log backend");
        assert_eq!(log.name(), "log");

        let http = create_gateway(&NotifierConfig {
            backend: "http".into(),
            url: Some("http://localhost:8081".into()),
        })
        .expect("http backend");
        assert_eq!(http.name(), "http");
    }

    #[test]
    fn test_http_backend_requires_a_url() {
        let Err(err) = create_gateway(&NotifierConfig { backend: "http".into(), url: None })
        else {
            panic!("should fail");
        };
        assert!(matches!(err, TaskForgeError::Config(_)));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let Err(err) = create_gateway(&NotifierConfig { backend: "carrier-pigeon".into(), url: None })
        else {
            panic!("should fail");
        };
        assert!(matches!(err, TaskForgeError::Config(_)));
    }
}
