// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Main server implementation

use crate::auth::require_session;
use crate::config::ServerConfig;
use crate::dependencies::DefaultServerDependencies;
use crate::error::{ServerError, ServerResult};
use crate::handlers;
use crate::state::AppState;
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Span};

/// REST API server
pub struct Server {
    config: ServerConfig,
    app: Router,
}

impl Server {
    /// Create a new server instance backed by SQLite
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let state = DefaultServerDependencies::new(config.clone())?.into_state();
        Ok(Self::with_state(config, state))
    }

    /// Construct a server from an already-built app state (used for custom dependencies)
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        let app = Self::build_app(state, &config);
        Self { config, app }
    }

    /// Build the Axum application with routes and middleware
    fn build_app(state: AppState, config: &ServerConfig) -> Router {
        let middleware_stack = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(cors_layer(config));

        // Everything under /tasks passes the session gate first
        let task_routes = Router::new()
            .route(
                "/",
                post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
            )
            .route(
                "/:id",
                get(handlers::tasks::get_task)
                    .put(handlers::tasks::update_task)
                    .delete(handlers::tasks::delete_task),
            )
            .route_layer(from_fn_with_state(state.clone(), require_session));

        let api_routes = Router::new()
            // Health and status endpoints
            .route("/health", get(handlers::health::health_check))
            .route("/version", get(handlers::health::version))
            .route("/openapi.json", get(handlers::openapi::openapi_spec))
            // Authentication
            .route("/auth/register", post(handlers::auth::register))
            .route("/auth/login", post(handlers::auth::login))
            .route("/auth/logout", post(handlers::auth::logout))
            // Task management
            .nest("/tasks", task_routes)
            .layer(CompressionLayer::new());

        // The upgrade response must not pass through compression
        let realtime_routes = Router::new().route("/ws", get(handlers::realtime::connect));

        Router::new()
            .merge(api_routes)
            .merge(realtime_routes)
            .with_state(state)
            .layer(middleware_stack)
    }

    /// The assembled application, for serving on a caller-provided listener
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Run the server until Ctrl-C
    pub async fn run(self) -> ServerResult<()> {
        let addr = self.config.bind_addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Taskboard server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::Internal(format!("REST server error: {err}")))?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the bind address
    pub fn addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}

/// Request span without the query string, which may carry a session token
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        version = ?request.version(),
    )
}

/// Credentialed CORS for the configured origins
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::InMemoryServerDependencies;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn server() -> Server {
        let config = ServerConfig::default();
        let state = InMemoryServerDependencies::new(config.clone()).into_state();
        Server::with_state(config, state)
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn task_routes_require_a_session() {
        for (method, uri) in [("GET", "/tasks"), ("POST", "/tasks"), ("DELETE", "/tasks/abc")] {
            let response = server()
                .router()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin_with_credentials() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/tasks")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            headers.get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }
}
