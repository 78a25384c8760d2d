/// Task model and database operations
///
/// This module provides the Task model and the owner-scoped queries behind
/// the task API. Every read and write carries the owner predicate in SQL;
/// nothing filters rows after the fact.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed', 'cancelled');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     tags TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::id::UserId;
/// use tasknest_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, owner: UserId) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::create(&pool, CreateTask {
///     user_id: owner,
///     title: "Write release notes".to_string(),
///     description: None,
///     status: TaskStatus::Pending,
///     priority: TaskPriority::High,
///     due_date: None,
///     tags: vec!["docs".to_string()],
/// }).await?;
///
/// println!("Created task: {}", task.id);
/// # Ok(())
/// # }
/// ```
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::id::UserId;

/// Task lifecycle status
///
/// No transition rules are enforced; a task can move between any two
/// statuses through an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,

    /// Abandoned without completion
    Cancelled,
}

impl TaskStatus {
    /// Gets status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a wire string, returning `None` for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Gets priority as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    /// Parses a wire string, returning `None` for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

/// Column a task listing may be sorted by
///
/// The allow-list doubles as the SQL column mapping, so user-supplied sort
/// specs never reach the query string unvalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Status,
    Priority,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parses a sort field name, returning `None` for anything outside the
    /// allow-list
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "status" => Some(SortField::Status),
            "priority" => Some(SortField::Priority),
            "due_date" => Some(SortField::DueDate),
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    /// Gets the SQL column name
    fn as_column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::DueDate => "due_date",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Rejected sort field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid sort field: {0}")]
pub struct InvalidSortField(pub String);

/// One `field:direction` entry of a sort spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FromStr for SortKey {
    type Err = InvalidSortField;

    /// Parses a single `field` or `field:direction` spec
    ///
    /// A missing or unrecognized direction means ascending; an unrecognized
    /// field is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        let (field_str, dir_str) = match spec.split_once(':') {
            Some((field, dir)) => (field, Some(dir)),
            None => (spec, None),
        };

        let field = SortField::parse(field_str)
            .ok_or_else(|| InvalidSortField(field_str.to_string()))?;
        let direction = match dir_str {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        Ok(SortKey { field, direction })
    }
}

/// Parses a comma-separated sort spec like `"priority:desc,due_date"`
///
/// # Errors
///
/// Returns the first unrecognized field name.
pub fn parse_sort_spec(spec: &str) -> Result<Vec<SortKey>, InvalidSortField> {
    spec.split(',').map(str::parse).collect()
}

/// Default listing order: newest first
pub fn default_sort() -> Vec<SortKey> {
    vec![SortKey {
        field: SortField::CreatedAt,
        direction: SortDirection::Desc,
    }]
}

/// Optional narrowing applied to task listings
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Task owned by a single user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owner; only this user may read or modify the task
    pub user_id: UserId,

    /// Short human-readable title (1-255 chars)
    pub title: String,

    /// Optional longer description (up to 5000 chars)
    pub description: Option<String>,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Free-form labels (each up to 50 chars)
    pub tags: Vec<String>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// Field validation (title length, tag length) happens at the API schema
/// layer before this struct is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owner of the new task
    pub user_id: UserId,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Initial status
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Labels
    pub tags: Vec<String>,
}

/// Input for a full task replacement (PUT semantics)
///
/// Every mutable column is written; fields left `None` overwrite with NULL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

/// Input for a partial task update (PATCH semantics)
///
/// Distinguishes three cases per nullable field: absent (leave untouched),
/// `null` (clear), and a value (set). The double `Option` encodes
/// absent-vs-null; `deserialize_some` keeps serde from collapsing explicit
/// `null` into "absent".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    /// New title, if present
    pub title: Option<String>,

    /// `Some(None)` clears the description, `Some(Some(_))` replaces it
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,

    /// New status, if present
    pub status: Option<TaskStatus>,

    /// New priority, if present
    pub priority: Option<TaskPriority>,

    /// `Some(None)` clears the due date, `Some(Some(_))` replaces it
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    /// New tag list, if present (replaces the whole list)
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// True when no field is present, i.e. the patch would change nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
    }
}

/// Wraps a present value (including explicit `null`) in `Some`, so absent
/// fields and `null` fields deserialize differently
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

const TASK_COLUMNS: &str = "id, user_id, title, description, status, priority, \
                            due_date, tags, created_at, updated_at";

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key violation)
    /// or the database operation fails
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use tasknest_shared::models::id::UserId;
    /// # use tasknest_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool, owner: UserId) -> Result<(), sqlx::Error> {
    /// let task = Task::create(&pool, CreateTask {
    ///     user_id: owner,
    ///     title: "Ship it".to_string(),
    ///     description: Some("Before Friday".to_string()),
    ///     status: TaskStatus::Pending,
    ///     priority: TaskPriority::Urgent,
    ///     due_date: None,
    ///     tags: vec![],
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, priority, due_date, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.tags)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, regardless of owner
    ///
    /// Callers enforcing ownership go through
    /// `auth::authorization::require_task_owner`, which needs the row to
    /// tell "absent" apart from "not yours".
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Replaces every mutable field of a task (PUT semantics)
    ///
    /// Returns `None` if the task no longer exists.
    pub async fn replace(
        pool: &PgPool,
        id: Uuid,
        data: ReplaceTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = $4,
                priority = $5,
                due_date = $6,
                tags = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.tags)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update (PATCH semantics)
    ///
    /// Absent fields are left untouched. For nullable columns an explicit
    /// `null` in the patch clears the column. An empty patch still bumps
    /// `updated_at`, matching the behavior of an update that changes
    /// nothing.
    ///
    /// Returns `None` if the task no longer exists.
    pub async fn apply_patch(
        pool: &PgPool,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if patch.tags.is_some() {
            bind_count += 1;
            query.push_str(&format!(", tags = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }
        if let Some(tags) = patch.tags {
            q = q.bind(tags);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Returns true if a row was removed, false if the task didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists one page of an owner's tasks
    ///
    /// The owner predicate, optional status/priority filters, validated
    /// sort keys, and the LIMIT/OFFSET window are all part of the single
    /// SQL query.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner: UserId,
        filter: TaskFilter,
        sort: &[SortKey],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1");
        let mut bind_count = 1;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND priority = ${}", bind_count));
        }

        // Sort keys were validated against the column allow-list at parse
        // time, so interpolating them here is safe
        let order_by = sort
            .iter()
            .map(|key| format!("{} {}", key.field.as_column(), key.direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        query.push_str(&format!(" ORDER BY {}", order_by));

        query.push_str(&format!(
            " LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(owner);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        q = q.bind(limit).bind(offset);

        let tasks = q.fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Counts an owner's tasks under the same filters as `list_for_owner`
    pub async fn count_for_owner(
        pool: &PgPool,
        owner: UserId,
        filter: TaskFilter,
    ) -> Result<i64, sqlx::Error> {
        let mut query = String::from("SELECT COUNT(*) FROM tasks WHERE user_id = $1");
        let mut bind_count = 1;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND priority = ${}", bind_count));
        }

        let mut q = sqlx::query_as::<_, (i64,)>(&query).bind(owner);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }

        let (count,): (i64,) = q.fetch_one(pool).await?;

        Ok(count)
    }
}
