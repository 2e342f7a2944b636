// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Taskboard REST API contract types and validation
//!
//! Request/response bodies, list query options and real-time event frames
//! shared between the server and its tests. Validation rules for incoming
//! bodies live next to the types as `validator` attributes.

pub mod error;
pub mod events;
pub mod types;
pub mod validation;

pub use error::*;
pub use events::*;
pub use types::*;

/// Generate OpenAPI schema for the API contract types
#[cfg(feature = "utoipa")]
pub fn openapi_schema() -> utoipa::openapi::OpenApi {
    use tb_domain_types::{TaskPriority, TaskStatus, UserProfile};
    use utoipa::OpenApi;

    #[derive(OpenApi)]
    #[openapi(
        info(title = "Taskboard REST API"),
        paths(),
        components(schemas(
            TaskPriority,
            TaskStatus,
            UserProfile,
            RegisterRequest,
            LoginRequest,
            CreateTaskRequest,
            UpdateTaskRequest,
            Task,
            TaskSortKey,
            SortOrder,
            MessageResponse,
            ErrorBody,
            StatusChanged,
            PriorityChanged,
            AssigneeChanged,
            Assigned
        ))
    )]
    struct ApiDoc;
    ApiDoc::openapi()
}
