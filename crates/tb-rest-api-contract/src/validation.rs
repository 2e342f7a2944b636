// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation helpers for API contract types

use crate::error::ApiContractError;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use validator::{ValidationError, ValidationErrors};

/// Parse a due date given either as an RFC 3339 timestamp or as a plain
/// `YYYY-MM-DD` date (midnight UTC).
pub fn parse_due_date(value: &str) -> Result<DateTime<Utc>, ApiContractError> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(ApiContractError::InvalidDueDate(value.to_string()))
}

/// `validator` hook for due date fields
pub fn validate_due_date(value: &str) -> Result<(), ValidationError> {
    parse_due_date(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("due_date");
        err.message = Some("Due date must be an RFC 3339 timestamp or YYYY-MM-DD".into());
        err
    })
}

/// Flatten validation errors into per-field human-readable messages, keyed
/// by the camelCase names used on the wire
pub fn field_messages(errors: &ValidationErrors) -> HashMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (wire_name(&field), messages)
        })
        .collect()
}

fn wire_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            name.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            name.push(ch);
        }
    }
    name
}
