//! Notification message catalog.

use serde::{Deserialize, Serialize};

use taskforge_core::types::EntityKind;

pub const TASK_OVERDUE_SUBJECT: &str =
    "Task '{title}' is now overdue. Consider completing or rescheduling it.";
pub const TASK_UPCOMING_SUBJECT: &str =
    "Your task '{title}' is due in 24 hours. Don't forget to finish it on time.";
pub const PROJECT_OVERDUE_SUBJECT: &str =
    "Project '{title}' is now overdue. Consider completing or rescheduling it.";
pub const PROJECT_UPCOMING_SUBJECT: &str =
    "Your project '{title}' is due in 24 hours. Don't forget to finish it on time.";

/// Category the notifier service files the message under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Deadline,
    Reminder,
}

pub fn overdue_subject(kind: EntityKind, title: &str) -> String {
    let template = match kind {
        EntityKind::Task => TASK_OVERDUE_SUBJECT,
        EntityKind::Project => PROJECT_OVERDUE_SUBJECT,
    };
    template.replace("{title}", title)
}

pub fn upcoming_subject(kind: EntityKind, title: &str) -> String {
    let template = match kind {
        EntityKind::Task => TASK_UPCOMING_SUBJECT,
        EntityKind::Project => PROJECT_UPCOMING_SUBJECT,
    };
    template.replace("{title}", title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects_include_the_title() {
        let subject = overdue_subject(EntityKind::Task, "Pay invoices");
        assert_eq!(
            subject,
            "Task 'Pay invoices' is now overdue. Consider completing or rescheduling it."
        );

        let subject = upcoming_subject(EntityKind::Project, "Website relaunch");
        assert!(subject.starts_with("Your project 'Website relaunch'"));
    }

    #[test]
    fn test_notification_type_wire_names() {
        let json = serde_json::to_string(&NotificationType::Deadline).expect("serialize");
        assert_eq!(json, "\"deadline\"");
        let json = serde_json::to_string(&NotificationType::Reminder).expect("serialize");
        assert_eq!(json, "\"reminder\"");
    }
}
