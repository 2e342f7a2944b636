// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Server error types and handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tb_rest_api_contract::{validation::field_messages, ApiContractError, ErrorBody};

/// Server result type
pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] tb_local_db::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Database(tb_local_db::Error::DuplicateEmail(_))
            | ServerError::Database(tb_local_db::Error::MissingUser) => StatusCode::BAD_REQUEST,
            ServerError::Database(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServerError::Authorization(_) => StatusCode::FORBIDDEN,
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::TaskNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Convert error to the uniform JSON error body
    pub fn to_body(&self) -> ErrorBody {
        let status = self.status().as_u16();
        match self {
            ServerError::Database(tb_local_db::Error::DuplicateEmail(_)) => {
                ErrorBody::new("Email already registered", status)
            }
            ServerError::Database(tb_local_db::Error::MissingUser) => {
                ErrorBody::new("Assigned user does not exist", status)
            }
            ServerError::Database(_) | ServerError::Internal(_) => {
                ErrorBody::new("Internal server error", status)
            }
            ServerError::Auth(msg) | ServerError::Authorization(msg) => {
                ErrorBody::new(msg.clone(), status)
            }
            ServerError::Validation(errors) => ErrorBody {
                details: field_messages(errors),
                ..ErrorBody::new("Validation failed", status)
            },
            ServerError::TaskNotFound(_) => ErrorBody::new("Task not found", status),
            ServerError::BadRequest(msg) => ErrorBody::new(msg.clone(), status),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.to_body())).into_response()
    }
}

/// Store traits report through `anyhow`; recover typed database errors
impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<tb_local_db::Error>() {
            Ok(db_err) => ServerError::Database(db_err),
            Err(err) => ServerError::Internal(format!("{err:#}")),
        }
    }
}

impl From<ApiContractError> for ServerError {
    fn from(err: ApiContractError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

/// Malformed bodies, including unknown enum values
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_rest_api_contract::RegisterRequest;
    use validator::Validate;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            ServerError::Auth("Unauthorized".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServerError::Authorization("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServerError::TaskNotFound("t1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::Database(tb_local_db::Error::MissingUser).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::Database(tb_local_db::Error::LockPoisoned).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_failures_carry_field_details() {
        let request = RegisterRequest {
            name: "A".into(),
            email: "not-an-email".into(),
            password: "secret123".into(),
        };
        let err = ServerError::from(request.validate().unwrap_err());
        let body = err.to_body();

        assert_eq!(body.error, "Validation failed");
        assert_eq!(body.status_code, 400);
        assert!(body.details.contains_key("name"));
        assert!(body.details.contains_key("email"));
        assert!(!body.details.contains_key("password"));
    }

    #[test]
    fn unparseable_due_dates_are_bad_requests() {
        let err = ServerError::from(
            tb_rest_api_contract::validation::parse_due_date("someday").unwrap_err(),
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_body().error, "Invalid due date: someday");
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = ServerError::from(anyhow::anyhow!("disk on fire at /var/lib/db"));
        let body = err.to_body();

        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.status_code, 500);
        assert!(body.details.is_empty());
    }

    #[test]
    fn typed_database_errors_survive_anyhow() {
        let err = ServerError::from(anyhow::Error::new(tb_local_db::Error::DuplicateEmail(
            "a@example.com".into(),
        )));

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_body().error, "Email already registered");
    }
}
