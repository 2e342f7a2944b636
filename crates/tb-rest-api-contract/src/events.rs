// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Real-time event frames pushed to connected clients
//!
//! Each frame is serialized as `{"event": "<name>", "data": {...}}`.

use crate::types::Task;
use serde::{Deserialize, Serialize};
use tb_domain_types::{TaskPriority, TaskStatus};

pub const STATUS_CHANGED: &str = "task:status-changed";
pub const PRIORITY_CHANGED: &str = "task:priority-changed";
pub const ASSIGNEE_CHANGED: &str = "task:assignee-changed";
pub const ASSIGNED: &str = "task:assigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusChanged {
    pub task_id: String,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PriorityChanged {
    pub task_id: String,
    pub old_priority: TaskPriority,
    pub new_priority: TaskPriority,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssigneeChanged {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_assignee_id: Option<String>,
    pub task: Task,
}

/// Personal notification delivered only to the assignee's connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Assigned {
    pub message: String,
    pub task: Task,
}

impl Assigned {
    pub fn for_task(task: Task) -> Self {
        Self {
            message: format!("You have been assigned to task: {}", task.title),
            task,
        }
    }
}

/// A named event frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum TaskEvent {
    #[serde(rename = "task:status-changed")]
    StatusChanged(StatusChanged),
    #[serde(rename = "task:priority-changed")]
    PriorityChanged(PriorityChanged),
    #[serde(rename = "task:assignee-changed")]
    AssigneeChanged(AssigneeChanged),
    #[serde(rename = "task:assigned")]
    Assigned(Assigned),
}

impl TaskEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            TaskEvent::StatusChanged(_) => STATUS_CHANGED,
            TaskEvent::PriorityChanged(_) => PRIORITY_CHANGED,
            TaskEvent::AssigneeChanged(_) => ASSIGNEE_CHANGED,
            TaskEvent::Assigned(_) => ASSIGNED,
        }
    }

    /// Task carried by the event
    pub fn task(&self) -> &Task {
        match self {
            TaskEvent::StatusChanged(e) => &e.task,
            TaskEvent::PriorityChanged(e) => &e.task,
            TaskEvent::AssigneeChanged(e) => &e.task,
            TaskEvent::Assigned(e) => &e.task,
        }
    }
}
