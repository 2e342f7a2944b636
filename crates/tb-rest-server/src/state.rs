// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server state management

use crate::auth::AuthConfig;
use crate::config::ServerConfig;
use crate::models::{TaskStore, UserStore};
use crate::notify::{NotificationHub, Notifier};
use crate::services::{AuthService, TaskService};
use std::sync::Arc;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    pub user_store: Arc<dyn UserStore>,
    pub task_store: Arc<dyn TaskStore>,

    /// Live WebSocket connections
    pub hub: Arc<NotificationHub>,
}

impl AppState {
    /// Get configuration reference
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.config.auth
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.user_store), self.config.auth.clone())
    }

    pub fn task_service(&self) -> TaskService {
        let notifier: Arc<dyn Notifier> = self.hub.clone();
        TaskService::new(
            Arc::clone(&self.task_store),
            Arc::clone(&self.user_store),
            notifier,
        )
    }
}
