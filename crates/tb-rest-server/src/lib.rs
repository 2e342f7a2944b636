// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Taskboard REST API server
//!
//! Users register and log in, then create, assign and update tasks over a
//! cookie-authenticated REST API. Status, priority and assignee changes are
//! pushed to connected WebSocket clients as they happen.

pub mod auth;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod server;
pub mod services;
pub mod state;

pub use config::{HubConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::Server;
