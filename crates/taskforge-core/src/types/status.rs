//! Entity kinds and status state machines.
//!
//! Tasks and projects carry different status sets but share the same
//! deadline lifecycle: manual transitions between the working states,
//! manual completion, and a one-way automatic transition to `Overdue`
//! performed by the reconciliation engine.

use serde::{Deserialize, Serialize};

/// Which deadline-bearing entity a snapshot describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Task,
    Project,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Task => write!(f, "task"),
            EntityKind::Project => write!(f, "project"),
        }
    }
}

/// Task lifecycle states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "overdue" => Some(TaskStatus::Overdue),
            _ => None,
        }
    }
}

/// Project lifecycle states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    OnHold,
    InProgress,
    Completed,
    Overdue,
}

impl ProjectStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Overdue => "Overdue",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Overdue => "overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProjectStatus::Active),
            "on_hold" => Some(ProjectStatus::OnHold),
            "in_progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            "overdue" => Some(ProjectStatus::Overdue),
            _ => None,
        }
    }
}

/// Kind-tagged status union so detectors and sweeps stay generic over
/// tasks and projects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Task(TaskStatus),
    Project(ProjectStatus),
}

impl EntityStatus {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityStatus::Task(_) => EntityKind::Task,
            EntityStatus::Project(_) => EntityKind::Project,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            EntityStatus::Task(TaskStatus::Completed) | EntityStatus::Project(ProjectStatus::Completed)
        )
    }

    pub fn is_overdue(&self) -> bool {
        matches!(
            self,
            EntityStatus::Task(TaskStatus::Overdue) | EntityStatus::Project(ProjectStatus::Overdue)
        )
    }

    /// The kind's own `Overdue` variant.
    pub fn overdue(&self) -> Self {
        match self {
            EntityStatus::Task(_) => EntityStatus::Task(TaskStatus::Overdue),
            EntityStatus::Project(_) => EntityStatus::Project(ProjectStatus::Overdue),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EntityStatus::Task(s) => s.display_name(),
            EntityStatus::Project(s) => s.display_name(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityStatus::Task(s) => s.as_str(),
            EntityStatus::Project(s) => s.as_str(),
        }
    }
}
