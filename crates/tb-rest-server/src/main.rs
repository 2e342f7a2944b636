// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Taskboard REST API server binary

use clap::Parser;
use std::net::SocketAddr;
use tb_logging::CliLoggingArgs;
use tb_rest_server::auth::{AuthConfig, DEVELOPMENT_JWT_SECRET};
use tb_rest_server::{Server, ServerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address for the server
    #[arg(short, long, env = "TASKBOARD_BIND", default_value = "127.0.0.1:4000")]
    bind: SocketAddr,

    /// Database path (SQLite), or :memory:
    #[arg(short, long, env = "TASKBOARD_DATABASE", default_value = ":memory:")]
    database: String,

    /// Secret used to sign session tokens
    #[arg(long, env = "TASKBOARD_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Mark the session cookie Secure
    #[arg(long, env = "TASKBOARD_PRODUCTION")]
    production: bool,

    /// Origin allowed to make credentialed requests (repeatable)
    #[arg(
        long = "cors-origin",
        env = "TASKBOARD_CORS_ORIGIN",
        value_delimiter = ',',
        default_value = "http://localhost:3000"
    )]
    cors_origins: Vec<String>,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.logging.init("tb-rest-server")?;

    tracing::info!("Starting Taskboard REST API server");

    let auth = AuthConfig::with_jwt_secret(
        args.jwt_secret
            .unwrap_or_else(|| DEVELOPMENT_JWT_SECRET.to_string()),
    );
    if auth.uses_development_secret() {
        tracing::warn!("No JWT secret configured; using the development secret");
    }

    let config = ServerConfig {
        bind_addr: args.bind,
        database_path: args.database,
        cors_origins: args.cors_origins,
        production: args.production,
        auth,
        ..Default::default()
    };

    let server = Server::new(config)?;
    server.run().await?;

    Ok(())
}
