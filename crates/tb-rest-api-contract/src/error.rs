// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for API contract validation and parsing

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while interpreting contract values
#[derive(Debug, Error)]
pub enum ApiContractError {
    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),
}

/// Uniform error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub status_code: u16,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub details: HashMap<String, Vec<String>>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            status_code,
            details: HashMap::new(),
        }
    }
}
