// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server configuration

use crate::auth::AuthConfig;
use std::net::{Ipv4Addr, SocketAddr};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Path to SQLite database, or `:memory:`
    pub database_path: String,

    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<String>,

    /// Production mode marks the session cookie `Secure`
    pub production: bool,

    /// Session token configuration
    pub auth: AuthConfig,

    /// Real-time notification hub configuration
    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 4000)),
            database_path: ":memory:".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            production: false,
            auth: AuthConfig::default(),
            hub: HubConfig::default(),
        }
    }
}

/// Notification hub configuration
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Outbound frames buffered per connection before events are dropped
    pub connection_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            connection_buffer: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_are_local_only_and_in_memory() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr, "127.0.0.1:4000".parse().unwrap());
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000"]);
        assert!(!config.production, "Secure cookies must be opt-in");
    }

    #[test]
    fn sessions_last_a_week_and_hub_buffers_64_frames() {
        let config = ServerConfig::default();

        assert_eq!(config.auth.token_ttl, Duration::from_secs(7 * 24 * 60 * 60));
        assert!(config.auth.uses_development_secret());
        assert_eq!(config.hub.connection_buffer, 64);
    }
}
