// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use crate::{
    Database, Error, NewTask, NewUser, Result, TaskChanges, TaskFilter, TaskRecord, UserRecord,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, ErrorCode, OptionalExtension, Row, ToSql};
use tb_domain_types::{SortOrder, TaskSortKey};

/// Fixed-width UTC text so that lexical order equals chronological order
fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

/// Credential records
pub struct UserStore<'a> {
    db: &'a Database,
}

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: decode_ts(row, 4)?,
    })
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a user; fails with [`Error::DuplicateEmail`] when the email is taken
    pub fn insert(&self, user: &NewUser) -> Result<UserRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = encode_ts(&Utc::now());
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user.name, user.email, user.password_hash, created_at],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::DuplicateEmail(user.email.clone())
            } else {
                Error::Sqlite(e)
            }
        })?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], user_from_row)?)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        Ok(conn.query_row(&sql, params![email], user_from_row).optional()?)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], user_from_row).optional()?)
    }
}

/// Task records
pub struct TaskStore<'a> {
    db: &'a Database,
}

const TASK_COLUMNS: &str = "id, title, description, due_date, priority, status, \
                            creator_id, assigned_to_id, created_at, updated_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    Ok(TaskRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: decode_ts(row, 3)?,
        priority: row.get(4)?,
        status: row.get(5)?,
        creator_id: row.get(6)?,
        assigned_to_id: row.get(7)?,
        created_at: decode_ts(row, 8)?,
        updated_at: decode_ts(row, 9)?,
    })
}

fn order_clause(key: TaskSortKey, order: SortOrder) -> String {
    let column = match key {
        TaskSortKey::CreatedAt => "created_at",
        TaskSortKey::DueDate => "due_date",
        TaskSortKey::Priority => {
            "CASE priority WHEN 'LOW' THEN 0 WHEN 'MEDIUM' THEN 1 WHEN 'HIGH' THEN 2 ELSE 3 END"
        }
        TaskSortKey::Status => {
            "CASE status WHEN 'TODO' THEN 0 WHEN 'IN_PROGRESS' THEN 1 WHEN 'REVIEW' THEN 2 ELSE 3 END"
        }
    };
    let dir = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    // rowid keeps ties in insertion order
    format!("ORDER BY {column} {dir}, rowid {dir}")
}

impl<'a> TaskStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn insert(&self, task: &NewTask) -> Result<TaskRecord> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = encode_ts(&Utc::now());
        let conn = self.db.conn()?;
        conn.execute(
            "INSERT INTO tasks (id, title, description, due_date, priority, status,
                                creator_id, assigned_to_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
            params![
                id,
                task.title,
                task.description,
                encode_ts(&task.due_date),
                task.priority,
                task.status,
                task.creator_id,
                task.assigned_to_id,
                now,
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::MissingUser
            } else {
                Error::Sqlite(e)
            }
        })?;

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], task_from_row)?)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        let conn = self.db.conn()?;
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], task_from_row).optional()?)
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<TaskRecord>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            clauses.push("status = ?");
            values.push(Box::new(status));
        }
        if let Some(priority) = filter.priority {
            clauses.push("priority = ?");
            values.push(Box::new(priority));
        }
        if let Some(assignee) = &filter.assigned_to_id {
            clauses.push("assigned_to_id = ?");
            values.push(Box::new(assignee.clone()));
        }
        if let Some(creator) = &filter.creator_id {
            clauses.push("creator_id = ?");
            values.push(Box::new(creator.clone()));
        }

        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push(' ');
        sql.push_str(&order_clause(filter.sort_key, filter.sort_order));

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let rows = stmt.query_map(params.as_slice(), task_from_row)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Apply a patch and return the updated record, or `None` when absent
    pub fn update(&self, id: &str, changes: &TaskChanges) -> Result<Option<TaskRecord>> {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let Some(mut record) = tx.query_row(&sql, params![id], task_from_row).optional()? else {
            return Ok(None);
        };

        changes.apply_to(&mut record);
        record.updated_at = Utc::now();

        tx.execute(
            "UPDATE tasks SET title = ?2, description = ?3, due_date = ?4, priority = ?5,
                              status = ?6, assigned_to_id = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                id,
                record.title,
                record.description,
                encode_ts(&record.due_date),
                record.priority,
                record.status,
                record.assigned_to_id,
                encode_ts(&record.updated_at),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                Error::MissingUser
            } else {
                Error::Sqlite(e)
            }
        })?;
        let updated = tx.query_row(&sql, params![id], task_from_row)?;
        tx.commit()?;
        Ok(Some(updated))
    }

    /// Delete a task; returns whether a row was removed
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.db.conn()?;
        let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}
