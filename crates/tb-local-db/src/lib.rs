// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! SQLite persistence for Taskboard
//!
//! A single connection guarded by a mutex. Every statement is short, so
//! callers on the async runtime invoke these methods directly.

mod error;
mod migrations;
mod records;
mod stores;

pub use error::{Error, Result};
pub use records::*;
pub use stores::{TaskStore, UserStore};

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Handle to the Taskboard database
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "opened database");
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| Error::LockPoisoned)
    }

    /// User accessor
    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(self)
    }

    /// Task accessor
    pub fn tasks(&self) -> TaskStore<'_> {
        TaskStore::new(self)
    }
}
