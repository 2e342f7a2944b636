// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! OpenAPI document endpoint

use super::{auth, tasks};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Taskboard API"),
    paths(
        auth::register,
        auth::login,
        auth::logout,
        tasks::create_task,
        tasks::list_tasks,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task
    )
)]
struct ApiDoc;

/// Paths from the handler annotations plus the contract schemas
pub fn document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(tb_rest_api_contract::openapi_schema());
    doc
}

/// OpenAPI specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(document())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_and_contract_schema() {
        let doc = document();
        for path in ["/auth/register", "/auth/login", "/auth/logout", "/tasks", "/tasks/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }

        let schemas = &doc.components.as_ref().unwrap().schemas;
        for schema in [
            "Task",
            "TaskStatus",
            "TaskPriority",
            "ErrorBody",
            "StatusChanged",
            "UpdateTaskRequest",
        ] {
            assert!(schemas.contains_key(schema), "missing schema {schema}");
        }
    }

    #[test]
    fn task_update_documents_its_request_body() {
        let doc = document();
        let item = &doc.paths.paths["/tasks/{id}"];
        let put = item
            .operations
            .get(&utoipa::openapi::PathItemType::Put)
            .expect("PUT /tasks/{id} documented");
        assert!(put.request_body.is_some());

        let json = serde_json::to_value(&doc).unwrap();
        let reference = &json["paths"]["/tasks/{id}"]["put"]["requestBody"]["content"]
            ["application/json"]["schema"]["$ref"];
        assert_eq!(reference, "#/components/schemas/UpdateTaskRequest");
    }
}
