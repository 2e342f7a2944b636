// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Task management endpoints
//!
//! Mounted behind the session gate, so every handler can rely on the
//! [`AuthenticatedUser`] extension.

use crate::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::ServerResult;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tb_rest_api_contract::{
    CreateTaskRequest, ErrorBody, MessageResponse, Task, TaskListQuery, UpdateTaskRequest,
};

/// Create a task owned by the caller
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Authentication required", body = ErrorBody)
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Task>)> {
    let Json(request) = payload?;
    let task = state
        .task_service()
        .create_task(request, &user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// List tasks with optional filters and ordering
#[utoipa::path(
    get,
    path = "/tasks",
    params(
        ("status" = Option<String>, Query, description = "TODO, IN_PROGRESS, REVIEW or DONE"),
        ("priority" = Option<String>, Query, description = "LOW, MEDIUM, HIGH or URGENT"),
        ("assignedToId" = Option<String>, Query, description = "Assignee user id"),
        ("creatorId" = Option<String>, Query, description = "Creator user id"),
        ("sortBy" = Option<String>, Query, description = "createdAt, dueDate, priority or status"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Matching tasks", body = [Task]),
        (status = 400, description = "Unknown filter value", body = ErrorBody),
        (status = 401, description = "Authentication required", body = ErrorBody)
    )
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<TaskListQuery>, QueryRejection>,
) -> ServerResult<Json<Vec<Task>>> {
    let Query(query) = query?;
    let tasks = state.task_service().get_tasks(&user.user_id, &query).await?;
    Ok(Json(tasks))
}

/// Fetch one task
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = Task),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody)
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<Task>> {
    let task = state.task_service().get_task_by_id(&id).await?;
    Ok(Json(task))
}

/// Partially update a task; `assignedToId: null` unassigns
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody)
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ServerResult<Json<Task>> {
    let Json(request) = payload?;
    let task = state
        .task_service()
        .update_task(&id, request, &user.user_id)
        .await?;
    Ok(Json(task))
}

/// Delete a task; only its creator may do so
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = String, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 401, description = "Authentication required", body = ErrorBody),
        (status = 403, description = "Caller is not the creator", body = ErrorBody),
        (status = 404, description = "Task not found", body = ErrorBody)
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<MessageResponse>> {
    state.task_service().delete_task(&id, &user.user_id).await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}
