// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Registration, login and logout endpoints

use crate::auth::expired_session_cookie;
use crate::state::AppState;
use crate::ServerResult;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use tb_domain_types::UserProfile;
use tb_rest_api_contract::{ErrorBody, LoginRequest, MessageResponse, RegisterRequest};

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserProfile),
        (status = 400, description = "Invalid input or email already registered", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<UserProfile>)> {
    let Json(request) = payload?;
    let profile = state.auth_service().register(request).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Log in and receive the session cookie
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `token` cookie set", body = UserProfile),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServerResult<(CookieJar, Json<UserProfile>)> {
    let Json(request) = payload?;
    let outcome = state.auth_service().login(request).await?;

    let cookie = state
        .auth()
        .session_cookie(outcome.token, state.config().production);
    Ok((jar.add(cookie), Json(outcome.user)))
}

/// Clear the session cookie. Tokens stay valid until they expire.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cookie cleared", body = MessageResponse))
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(expired_session_cookie()),
        Json(MessageResponse::new("Logged out")),
    )
}
