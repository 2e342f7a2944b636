// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Storage interfaces used by the services
//!
//! Two implementations: [`InMemoryStore`] for tests and ephemeral runs, and
//! [`DatabaseStore`] backed by SQLite. Both enforce unique emails and reject
//! tasks that reference unknown users with the typed `tb_local_db::Error`
//! values, so the HTTP layer maps them identically.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tb_domain_types::SortOrder;
use tb_local_db::{
    Database, Error as DbError, NewTask, NewUser, TaskChanges, TaskFilter, TaskRecord, UserRecord,
};
use tokio::sync::RwLock;

/// Credential store interface
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<UserRecord>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn find_user_by_id(&self, id: &str) -> anyhow::Result<Option<UserRecord>>;
}

/// Task store interface
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: NewTask) -> anyhow::Result<TaskRecord>;
    async fn get_task(&self, id: &str) -> anyhow::Result<Option<TaskRecord>>;
    async fn list_tasks(&self, filter: &TaskFilter) -> anyhow::Result<Vec<TaskRecord>>;
    /// Returns `None` when the task does not exist
    async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> anyhow::Result<Option<TaskRecord>>;
    /// Returns whether a task was removed
    async fn delete_task(&self, id: &str) -> anyhow::Result<bool>;
}

/// In-memory store implementation (for development/testing)
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    // Insertion order breaks sort ties, matching rowid order in SQLite
    tasks: RwLock<Vec<TaskRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn ensure_user(&self, id: Option<&str>) -> anyhow::Result<()> {
        if let Some(id) = id {
            if !self.users.read().await.contains_key(id) {
                return Err(DbError::MissingUser.into());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<UserRecord> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DbError::DuplicateEmail(user.email).into());
        }

        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(id).cloned())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn create_task(&self, task: NewTask) -> anyhow::Result<TaskRecord> {
        self.ensure_user(Some(&task.creator_id)).await?;
        self.ensure_user(task.assigned_to_id.as_deref()).await?;

        let now = Utc::now();
        let record = TaskRecord {
            id: uuid::Uuid::new_v4().to_string(),
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            creator_id: task.creator_id,
            assigned_to_id: task.assigned_to_id,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.push(record.clone());
        Ok(record)
    }

    async fn get_task(&self, id: &str) -> anyhow::Result<Option<TaskRecord>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> anyhow::Result<Vec<TaskRecord>> {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<(usize, &TaskRecord)> = tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| filter.matches(t))
            .collect();

        matching.sort_by(|(ia, a), (ib, b)| {
            filter.compare(a, b).then_with(|| match filter.sort_order {
                SortOrder::Asc => ia.cmp(ib),
                SortOrder::Desc => ib.cmp(ia),
            })
        });

        Ok(matching.into_iter().map(|(_, t)| t.clone()).collect())
    }

    async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> anyhow::Result<Option<TaskRecord>> {
        if let Some(assignee) = &changes.assigned_to_id {
            self.ensure_user(assignee.as_deref()).await?;
        }

        let mut tasks = self.tasks.write().await;
        let Some(record) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        changes.apply_to(record);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_task(&self, id: &str) -> anyhow::Result<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() != before)
    }
}

/// SQLite-backed store
pub struct DatabaseStore {
    db: Arc<Database>,
}

impl DatabaseStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for DatabaseStore {
    async fn create_user(&self, user: NewUser) -> anyhow::Result<UserRecord> {
        Ok(self.db.users().insert(&user)?)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.db.users().find_by_email(email)?)
    }

    async fn find_user_by_id(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.db.users().find_by_id(id)?)
    }
}

#[async_trait]
impl TaskStore for DatabaseStore {
    async fn create_task(&self, task: NewTask) -> anyhow::Result<TaskRecord> {
        Ok(self.db.tasks().insert(&task)?)
    }

    async fn get_task(&self, id: &str) -> anyhow::Result<Option<TaskRecord>> {
        Ok(self.db.tasks().find_by_id(id)?)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> anyhow::Result<Vec<TaskRecord>> {
        Ok(self.db.tasks().list(filter)?)
    }

    async fn update_task(
        &self,
        id: &str,
        changes: &TaskChanges,
    ) -> anyhow::Result<Option<TaskRecord>> {
        Ok(self.db.tasks().update(id, changes)?)
    }

    async fn delete_task(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.db.tasks().delete(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tb_domain_types::{TaskPriority, TaskSortKey, TaskStatus};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    fn new_task(creator: &str, title: &str, days: i64, status: TaskStatus) -> NewTask {
        NewTask {
            title: title.into(),
            description: "d".into(),
            due_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(days),
            priority: TaskPriority::Medium,
            status,
            creator_id: creator.into(),
            assigned_to_id: None,
        }
    }

    fn database_store() -> DatabaseStore {
        DatabaseStore::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    async fn exercise_duplicate_email(store: &dyn UserStore) {
        store.create_user(new_user("a@example.com")).await.unwrap();
        let err = store.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::DuplicateEmail(_))
        ));
    }

    async fn exercise_unknown_assignee(users: &dyn UserStore, tasks: &dyn TaskStore) {
        let creator = users.create_user(new_user("c@example.com")).await.unwrap();
        let mut task = new_task(&creator.id, "t", 0, TaskStatus::Todo);
        task.assigned_to_id = Some("nobody".into());

        let err = tasks.create_task(task).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<DbError>(), Some(DbError::MissingUser)));
    }

    async fn exercise_filter_and_sort(users: &dyn UserStore, tasks: &dyn TaskStore) {
        let creator = users.create_user(new_user("s@example.com")).await.unwrap();
        tasks.create_task(new_task(&creator.id, "late", 9, TaskStatus::Done)).await.unwrap();
        tasks.create_task(new_task(&creator.id, "open", 1, TaskStatus::Todo)).await.unwrap();
        tasks.create_task(new_task(&creator.id, "early", 2, TaskStatus::Done)).await.unwrap();

        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            sort_key: TaskSortKey::DueDate,
            sort_order: SortOrder::Asc,
            ..Default::default()
        };
        let titles: Vec<String> = tasks
            .list_tasks(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["early", "late"]);

        let assignee = users.create_user(new_user("t@example.com")).await.unwrap();
        let mut urgent = new_task(&creator.id, "urgent", 5, TaskStatus::Review);
        urgent.priority = TaskPriority::Urgent;
        urgent.assigned_to_id = Some(assignee.id.clone());
        tasks.create_task(urgent).await.unwrap();

        let by_priority = TaskFilter {
            priority: Some(TaskPriority::Urgent),
            ..Default::default()
        };
        let found = tasks.list_tasks(&by_priority).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "urgent");

        let by_assignee = TaskFilter {
            assigned_to_id: Some(assignee.id.clone()),
            ..Default::default()
        };
        let found = tasks.list_tasks(&by_assignee).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].assigned_to_id.as_deref(), Some(assignee.id.as_str()));

        let nobody = TaskFilter {
            priority: Some(TaskPriority::Medium),
            assigned_to_id: Some(assignee.id),
            ..Default::default()
        };
        assert!(tasks.list_tasks(&nobody).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_emails_are_rejected_by_both_stores() {
        exercise_duplicate_email(&InMemoryStore::new()).await;
        exercise_duplicate_email(&database_store()).await;
    }

    #[tokio::test]
    async fn unknown_assignee_is_rejected_by_both_stores() {
        let memory = InMemoryStore::new();
        exercise_unknown_assignee(&memory, &memory).await;
        let database = database_store();
        exercise_unknown_assignee(&database, &database).await;
    }

    #[tokio::test]
    async fn filtering_and_sorting_agree_between_stores() {
        let memory = InMemoryStore::new();
        exercise_filter_and_sort(&memory, &memory).await;
        let database = database_store();
        exercise_filter_and_sort(&database, &database).await;
    }

    #[tokio::test]
    async fn in_memory_default_order_is_newest_first() {
        let store = InMemoryStore::new();
        let creator = store.create_user(new_user("n@example.com")).await.unwrap();
        for title in ["first", "second", "third"] {
            store
                .create_task(new_task(&creator.id, title, 0, TaskStatus::Todo))
                .await
                .unwrap();
        }

        let titles: Vec<String> = store
            .list_tasks(&TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn in_memory_update_and_delete() {
        let store = InMemoryStore::new();
        let creator = store.create_user(new_user("u@example.com")).await.unwrap();
        let task = store
            .create_task(new_task(&creator.id, "t", 0, TaskStatus::Todo))
            .await
            .unwrap();

        let changes = TaskChanges {
            status: Some(TaskStatus::Review),
            assigned_to_id: Some(Some(creator.id.clone())),
            ..Default::default()
        };
        let updated = store.update_task(&task.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.status, TaskStatus::Review);
        assert_eq!(updated.assigned_to_id.as_deref(), Some(creator.id.as_str()));
        assert_eq!(updated.creator_id, task.creator_id);

        assert!(store.update_task("missing", &changes).await.unwrap().is_none());
        assert!(store.delete_task(&task.id).await.unwrap());
        assert!(!store.delete_task(&task.id).await.unwrap());
    }
}
