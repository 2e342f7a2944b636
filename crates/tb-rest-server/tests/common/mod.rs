// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tb_rest_server::{
    dependencies::InMemoryServerDependencies, state::AppState, Server, ServerConfig,
};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let state = InMemoryServerDependencies::new(config.clone()).into_state();
        let router = Server::with_state(config, state.clone()).router();
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("token={token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register a user and return its public profile
    pub async fn register(&self, name: &str, email: &str) -> Value {
        let response = self
            .request(
                Method::POST,
                "/auth/register",
                Some(json!({ "name": name, "email": email, "password": "password123" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }

    /// Log in and return the session token from the cookie
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({ "email": email, "password": "password123" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        session_cookie_value(&response.headers).expect("login sets the token cookie")
    }

    /// Register and log in; returns (user id, token)
    pub async fn sign_up(&self, name: &str, email: &str) -> (String, String) {
        let profile = self.register(name, email).await;
        let token = self.login(email).await;
        (profile["id"].as_str().unwrap().to_string(), token)
    }

    /// Serve the router on an ephemeral port for WebSocket clients
    pub async fn spawn(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    /// Wait until the hub has registered `expected` connections
    pub async fn wait_for_connections(&self, expected: usize) {
        let hub = self.state.hub.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while hub.connection_count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("hub connection count never settled");
    }
}

/// The raw `Set-Cookie` header for the session cookie
pub fn session_set_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("token="))
        .map(str::to_string)
}

pub fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    let raw = session_set_cookie(headers)?;
    let pair = raw.split(';').next()?;
    pair.strip_prefix("token=").map(str::to_string)
}

pub fn task_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "release",
        "dueDate": "2025-12-31",
        "priority": "HIGH"
    })
}
