// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Referenced user does not exist")]
    MissingUser,

    #[error("Database lock poisoned")]
    LockPoisoned,
}
