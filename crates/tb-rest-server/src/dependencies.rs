// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Dependency wiring for the REST server

use crate::{
    config::ServerConfig,
    models::{DatabaseStore, InMemoryStore, TaskStore, UserStore},
    notify::NotificationHub,
    state::AppState,
};
use anyhow::Result;
use std::sync::Arc;
use tb_local_db::Database;

/// Default dependency builder: SQLite stores and the in-process hub
pub struct DefaultServerDependencies {
    state: AppState,
}

impl DefaultServerDependencies {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let db = if config.database_path == ":memory:" {
            Arc::new(Database::open_in_memory()?)
        } else {
            Arc::new(Database::open(&config.database_path)?)
        };
        tracing::info!(database = %config.database_path, "database ready");

        let store = Arc::new(DatabaseStore::new(db));
        Ok(Self {
            state: build_state(config, store.clone(), store),
        })
    }

    /// Consume the dependency builder and return the resulting app state
    pub fn into_state(self) -> AppState {
        self.state
    }
}

/// Dependency wiring with in-memory stores, for tests and throwaway runs
pub struct InMemoryServerDependencies {
    state: AppState,
}

impl InMemoryServerDependencies {
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            state: build_state(config, store.clone(), store),
        }
    }

    pub fn into_state(self) -> AppState {
        self.state
    }
}

fn build_state(
    config: ServerConfig,
    user_store: Arc<dyn UserStore>,
    task_store: Arc<dyn TaskStore>,
) -> AppState {
    let hub = Arc::new(NotificationHub::new(&config.hub));
    AppState {
        config,
        user_store,
        task_store,
        hub,
    }
}
