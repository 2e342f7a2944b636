// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Business logic layer

use crate::auth::{hash_password, verify_password, AuthConfig};
use crate::error::{ServerError, ServerResult};
use crate::models::{TaskStore, UserStore};
use crate::notify::Notifier;
use std::collections::HashMap;
use std::sync::Arc;
use tb_domain_types::UserProfile;
use tb_local_db::{NewTask, NewUser, TaskChanges, TaskFilter, TaskRecord};
use tb_rest_api_contract::{
    validation::parse_due_date, CreateTaskRequest, LoginRequest, RegisterRequest, Task,
    TaskListQuery, UpdateTaskRequest,
};
use validator::Validate;

/// Successful login: the signed session token and the caller's profile
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserProfile,
}

/// Registration, login and token verification
pub struct AuthService {
    users: Arc<dyn UserStore>,
    auth: AuthConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, auth: AuthConfig) -> Self {
        Self { users, auth }
    }

    pub async fn register(&self, request: RegisterRequest) -> ServerResult<UserProfile> {
        request.validate()?;

        if self.users.find_user_by_email(&request.email).await?.is_some() {
            return Err(ServerError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(request.password).await?;
        let user = self
            .users
            .create_user(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "registered user");
        Ok(user.profile())
    }

    pub async fn login(&self, request: LoginRequest) -> ServerResult<LoginOutcome> {
        request.validate()?;

        let invalid = || ServerError::Auth("Invalid credentials".to_string());
        let Some(user) = self.users.find_user_by_email(&request.email).await? else {
            tracing::info!("login failed: unknown email");
            return Err(invalid());
        };
        if !verify_password(request.password, user.password_hash.clone()).await? {
            tracing::info!(user_id = %user.id, "login failed: wrong password");
            return Err(invalid());
        }

        let token = self.auth.issue_token(&user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            token,
            user: user.profile(),
        })
    }

    /// Resolve the user id a token was issued for
    pub fn verify_token(&self, token: &str) -> ServerResult<String> {
        Ok(self.auth.validate_jwt(token)?.sub)
    }
}

/// Task mutation engine: CRUD, relation expansion and change notifications
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            tasks,
            users,
            notifier,
        }
    }

    pub async fn create_task(
        &self,
        request: CreateTaskRequest,
        creator_id: &str,
    ) -> ServerResult<Task> {
        request.validate()?;
        let due_date = parse_due_date(&request.due_date)?;
        let assigned_to_id = request.assigned_to_id.filter(|id| !id.is_empty());

        let record = self
            .tasks
            .create_task(NewTask {
                title: request.title,
                description: request.description,
                due_date,
                priority: request.priority,
                status: request.status.unwrap_or_default(),
                creator_id: creator_id.to_string(),
                assigned_to_id: assigned_to_id.clone(),
            })
            .await?;
        tracing::info!(task_id = %record.id, creator_id, "created task");

        let task = self.expand(record).await?;
        if assigned_to_id.is_some() {
            self.notifier
                .emit_assignee_change(&task.id, None, assigned_to_id, &task)
                .await;
        }
        Ok(task)
    }

    /// List tasks. Every authenticated user sees every task.
    pub async fn get_tasks(&self, user_id: &str, query: &TaskListQuery) -> ServerResult<Vec<Task>> {
        let (sort_key, sort_order) = query.ordering();
        let filter = TaskFilter {
            status: query.status,
            priority: query.priority,
            assigned_to_id: non_blank(&query.assigned_to_id),
            creator_id: non_blank(&query.creator_id),
            sort_key,
            sort_order,
        };

        let records = self.tasks.list_tasks(&filter).await?;
        tracing::debug!(user_id, count = records.len(), "listed tasks");
        self.expand_all(records).await
    }

    pub async fn get_task_by_id(&self, id: &str) -> ServerResult<Task> {
        let record = self.find(id).await?;
        self.expand(record).await
    }

    pub async fn update_task(
        &self,
        id: &str,
        request: UpdateTaskRequest,
        user_id: &str,
    ) -> ServerResult<Task> {
        request.validate()?;
        let snapshot = self.find(id).await?;

        let changes = TaskChanges {
            title: request.title,
            description: request.description,
            due_date: request.due_date.as_deref().map(parse_due_date).transpose()?,
            priority: request.priority,
            status: request.status,
            assigned_to_id: request
                .assigned_to_id
                .map(|assignee| assignee.filter(|id| !id.is_empty())),
        };

        let record = self
            .tasks
            .update_task(id, &changes)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound(id.to_string()))?;
        tracing::info!(task_id = id, user_id, "updated task");
        let task = self.expand(record).await?;

        if let Some(new_status) = changes.status.filter(|s| *s != snapshot.status) {
            self.notifier
                .emit_status_change(id, snapshot.status, new_status, &task)
                .await;
        }
        if let Some(new_priority) = changes.priority.filter(|p| *p != snapshot.priority) {
            self.notifier
                .emit_priority_change(id, snapshot.priority, new_priority, &task)
                .await;
        }
        if let Some(new_assignee) = changes
            .assigned_to_id
            .filter(|a| *a != snapshot.assigned_to_id)
        {
            self.notifier
                .emit_assignee_change(id, snapshot.assigned_to_id, new_assignee, &task)
                .await;
        }

        Ok(task)
    }

    /// Only the creator may delete a task
    pub async fn delete_task(&self, id: &str, user_id: &str) -> ServerResult<()> {
        let task = self.find(id).await?;
        if task.creator_id != user_id {
            return Err(ServerError::Authorization(
                "Only the creator can delete this task".to_string(),
            ));
        }

        if !self.tasks.delete_task(id).await? {
            return Err(ServerError::TaskNotFound(id.to_string()));
        }
        tracing::info!(task_id = id, user_id, "deleted task");
        Ok(())
    }

    async fn find(&self, id: &str) -> ServerResult<TaskRecord> {
        self.tasks
            .get_task(id)
            .await?
            .ok_or_else(|| ServerError::TaskNotFound(id.to_string()))
    }

    async fn expand(&self, record: TaskRecord) -> ServerResult<Task> {
        let mut profiles = HashMap::new();
        self.expand_with(record, &mut profiles).await
    }

    async fn expand_all(&self, records: Vec<TaskRecord>) -> ServerResult<Vec<Task>> {
        let mut profiles = HashMap::new();
        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            tasks.push(self.expand_with(record, &mut profiles).await?);
        }
        Ok(tasks)
    }

    /// Attach creator and assignee profiles, memoising lookups in `profiles`
    async fn expand_with(
        &self,
        record: TaskRecord,
        profiles: &mut HashMap<String, Option<UserProfile>>,
    ) -> ServerResult<Task> {
        let creator = self.profile(&record.creator_id, profiles).await?;
        let assignee = match record.assigned_to_id.as_deref() {
            Some(id) => self.profile(id, profiles).await?,
            None => None,
        };

        Ok(Task {
            id: record.id,
            title: record.title,
            description: record.description,
            due_date: record.due_date,
            priority: record.priority,
            status: record.status,
            creator_id: record.creator_id,
            creator,
            assigned_to_id: record.assigned_to_id,
            assignee,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    async fn profile(
        &self,
        user_id: &str,
        profiles: &mut HashMap<String, Option<UserProfile>>,
    ) -> ServerResult<Option<UserProfile>> {
        if let Some(cached) = profiles.get(user_id) {
            return Ok(cached.clone());
        }
        let profile = self
            .users
            .find_user_by_id(user_id)
            .await?
            .map(|user| user.profile());
        profiles.insert(user_id.to_string(), profile.clone());
        Ok(profile)
    }
}

/// Blank id filters (`?assignedToId=`) are treated as absent
fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|id| !id.is_empty()).map(str::to_string)
}
