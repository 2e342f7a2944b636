// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use crate::Result;
use rusqlite::Connection;

/// Ordered schema steps; `PRAGMA user_version` records how many were applied.
const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE users (
        id            TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    );

    CREATE TABLE tasks (
        id             TEXT PRIMARY KEY,
        title          TEXT NOT NULL,
        description    TEXT NOT NULL,
        due_date       TEXT NOT NULL,
        priority       TEXT NOT NULL
                       CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH', 'URGENT')),
        status         TEXT NOT NULL
                       CHECK (status IN ('TODO', 'IN_PROGRESS', 'REVIEW', 'DONE')),
        creator_id     TEXT NOT NULL REFERENCES users(id),
        assigned_to_id TEXT REFERENCES users(id),
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    );

    CREATE INDEX idx_tasks_status ON tasks(status);
    CREATE INDEX idx_tasks_assigned_to ON tasks(assigned_to_id);
    CREATE INDEX idx_tasks_creator ON tasks(creator_id);
"#];

pub(crate) fn migrate(conn: &mut Connection) -> Result<()> {
    let current: usize = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current >= MIGRATIONS.len() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        tracing::info!(version = idx + 1, "applying schema migration");
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", MIGRATIONS.len())?;
    tx.commit()?;
    Ok(())
}
