// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Real-time task notifications
//!
//! [`NotificationHub`] keeps one bounded channel per live WebSocket
//! connection, grouped by the authenticated user. Delivery is best effort:
//! a connection whose buffer is full misses the event.

use crate::config::HubConfig;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tb_domain_types::{TaskPriority, TaskStatus};
use tb_rest_api_contract::{
    AssigneeChanged, Assigned, PriorityChanged, StatusChanged, Task, TaskEvent,
};
use tokio::sync::{mpsc, RwLock};
use tokio::sync::mpsc::error::TrySendError;

/// Sink for task change notifications. Emission never fails outward.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Broadcast a status transition to every connection
    async fn emit_status_change(
        &self,
        task_id: &str,
        old_status: TaskStatus,
        new_status: TaskStatus,
        task: &Task,
    );

    /// Broadcast a priority change to every connection
    async fn emit_priority_change(
        &self,
        task_id: &str,
        old_priority: TaskPriority,
        new_priority: TaskPriority,
        task: &Task,
    );

    /// Tell a newly assigned user first, then broadcast the change
    async fn emit_assignee_change(
        &self,
        task_id: &str,
        old_assignee_id: Option<String>,
        new_assignee_id: Option<String>,
        task: &Task,
    );

    /// Personal notification to one user's connections
    async fn emit_assignment(&self, user_id: &str, task: &Task);
}

pub type ConnectionId = u64;

struct Connection {
    user_id: String,
    tx: mpsc::Sender<Arc<TaskEvent>>,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    groups: HashMap<String, HashSet<ConnectionId>>,
}

/// In-process connection registry and fan-out
pub struct NotificationHub {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
    buffer: usize,
}

impl NotificationHub {
    pub fn new(config: &HubConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            next_id: AtomicU64::new(1),
            buffer: config.connection_buffer.max(1),
        }
    }

    /// Register a connection for `user_id` and join its per-user group
    pub async fn connect(&self, user_id: &str) -> (ConnectionId, mpsc::Receiver<Arc<TaskEvent>>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.buffer);

        let mut registry = self.registry.write().await;
        registry.connections.insert(
            id,
            Connection {
                user_id: user_id.to_string(),
                tx,
            },
        );
        registry
            .groups
            .entry(user_id.to_string())
            .or_default()
            .insert(id);

        tracing::info!(
            connection_id = id,
            user_id,
            connections = registry.connections.len(),
            "realtime client connected"
        );
        (id, rx)
    }

    /// Remove a connection; empty groups are dropped
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut registry = self.registry.write().await;
        let Some(connection) = registry.connections.remove(&id) else {
            return;
        };

        if let Some(group) = registry.groups.get_mut(&connection.user_id) {
            group.remove(&id);
            if group.is_empty() {
                registry.groups.remove(&connection.user_id);
            }
        }

        tracing::info!(
            connection_id = id,
            user_id = %connection.user_id,
            connections = registry.connections.len(),
            "realtime client disconnected"
        );
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Number of live connections authenticated as `user_id`
    pub async fn group_size(&self, user_id: &str) -> usize {
        self.registry
            .read()
            .await
            .groups
            .get(user_id)
            .map_or(0, HashSet::len)
    }

    async fn broadcast(&self, event: TaskEvent) {
        let event = Arc::new(event);
        let registry = self.registry.read().await;
        for (id, connection) in &registry.connections {
            deliver(*id, connection, &event);
        }
    }

    async fn send_to_user(&self, user_id: &str, event: TaskEvent) {
        let event = Arc::new(event);
        let registry = self.registry.read().await;
        let Some(group) = registry.groups.get(user_id) else {
            return;
        };
        for id in group {
            if let Some(connection) = registry.connections.get(id) {
                deliver(*id, connection, &event);
            }
        }
    }
}

fn deliver(id: ConnectionId, connection: &Connection, event: &Arc<TaskEvent>) {
    match connection.tx.try_send(Arc::clone(event)) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::debug!(
                connection_id = id,
                event = event.name(),
                task_id = %event.task().id,
                "dropped notification, buffer full"
            );
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(
                connection_id = id,
                event = event.name(),
                task_id = %event.task().id,
                "dropped notification, connection closing"
            );
        }
    }
}

#[async_trait]
impl Notifier for NotificationHub {
    async fn emit_status_change(
        &self,
        task_id: &str,
        old_status: TaskStatus,
        new_status: TaskStatus,
        task: &Task,
    ) {
        self.broadcast(TaskEvent::StatusChanged(StatusChanged {
            task_id: task_id.to_string(),
            old_status,
            new_status,
            task: task.clone(),
        }))
        .await;
    }

    async fn emit_priority_change(
        &self,
        task_id: &str,
        old_priority: TaskPriority,
        new_priority: TaskPriority,
        task: &Task,
    ) {
        self.broadcast(TaskEvent::PriorityChanged(PriorityChanged {
            task_id: task_id.to_string(),
            old_priority,
            new_priority,
            task: task.clone(),
        }))
        .await;
    }

    async fn emit_assignee_change(
        &self,
        task_id: &str,
        old_assignee_id: Option<String>,
        new_assignee_id: Option<String>,
        task: &Task,
    ) {
        if let Some(new_id) = new_assignee_id.as_deref() {
            if old_assignee_id.as_deref() != Some(new_id) {
                self.emit_assignment(new_id, task).await;
            }
        }

        self.broadcast(TaskEvent::AssigneeChanged(AssigneeChanged {
            task_id: task_id.to_string(),
            old_assignee_id,
            new_assignee_id,
            task: task.clone(),
        }))
        .await;
    }

    async fn emit_assignment(&self, user_id: &str, task: &Task) {
        self.send_to_user(user_id, TaskEvent::Assigned(Assigned::for_task(task.clone())))
            .await;
    }
}
