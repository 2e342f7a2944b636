// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! WebSocket endpoint for real-time task notifications
//!
//! Clients authenticate at upgrade time with the same session token used
//! for REST calls, passed as `?token=`, the `token` cookie or a bearer
//! header. Server frames are `{"event": ..., "data": ...}` JSON text
//! messages; client frames other than close are ignored.

use crate::auth::session_token;
use crate::error::ServerError;
use crate::notify::NotificationHub;
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

/// Authenticate, then upgrade to a notification stream
pub async fn connect(
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    ws: WebSocketUpgrade,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| session_token(&jar, &headers));

    let Some(token) = token else {
        return ServerError::Auth("Unauthorized".to_string()).into_response();
    };
    let user_id = match state.auth().validate_jwt(&token) {
        Ok(claims) => claims.sub,
        Err(err) => return err.into_response(),
    };

    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, user_id))
}

async fn handle_socket(socket: WebSocket, hub: Arc<NotificationHub>, user_id: String) {
    let (connection_id, mut events) = hub.connect(&user_id).await;
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                let text = match serde_json::to_string(event.as_ref()) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(%err, event = event.name(), "failed to encode notification");
                        continue;
                    }
                };
                if sender.send(WsMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            maybe_msg = receiver.next() => {
                match maybe_msg {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    hub.disconnect(connection_id).await;
}
