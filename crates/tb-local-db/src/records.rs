// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use chrono::{DateTime, Utc};
use tb_domain_types::{SortOrder, TaskPriority, TaskSortKey, TaskStatus, UserProfile};

/// Stored user, including the password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public fields only; the password hash never leaves the store layer
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Stored task, relations as plain ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub creator_id: String,
    pub assigned_to_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub creator_id: String,
    pub assigned_to_id: Option<String>,
}

/// Field-wise patch; `None` leaves a column untouched.
///
/// `assigned_to_id: Some(None)` clears the assignee.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to_id: Option<Option<String>>,
}

impl TaskChanges {
    /// Apply the patch to an in-memory record
    pub fn apply_to(&self, record: &mut TaskRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            record.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            record.priority = priority;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(assignee) = &self.assigned_to_id {
            record.assigned_to_id = assignee.clone();
        }
    }
}

/// Equality filters and ordering for task listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to_id: Option<String>,
    pub creator_id: Option<String>,
    pub sort_key: TaskSortKey,
    pub sort_order: SortOrder,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            assigned_to_id: None,
            creator_id: None,
            sort_key: TaskSortKey::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl TaskFilter {
    /// Whether a record passes every equality filter
    pub fn matches(&self, record: &TaskRecord) -> bool {
        self.status.map_or(true, |s| record.status == s)
            && self.priority.map_or(true, |p| record.priority == p)
            && self
                .assigned_to_id
                .as_deref()
                .map_or(true, |id| record.assigned_to_id.as_deref() == Some(id))
            && self
                .creator_id
                .as_deref()
                .map_or(true, |id| record.creator_id == id)
    }

    /// Compare two records by the configured key and direction
    pub fn compare(&self, a: &TaskRecord, b: &TaskRecord) -> std::cmp::Ordering {
        let ordering = match self.sort_key {
            TaskSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            TaskSortKey::DueDate => a.due_date.cmp(&b.due_date),
            TaskSortKey::Priority => a.priority.rank().cmp(&b.priority.rank()),
            TaskSortKey::Status => a.status.rank().cmp(&b.status.rank()),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}
