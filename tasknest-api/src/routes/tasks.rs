/// Task CRUD endpoints
///
/// This module provides owner-scoped task management. Every endpoint runs
/// behind the strict identity layer, and every read or write is bound to
/// the authenticated owner: single-task routes go through the ownership
/// guard (404 for absent ids, 403 for someone else's task), and the list
/// route carries the owner predicate inside the SQL query itself.
///
/// # Endpoints
///
/// - `GET /api/tasks` - List tasks (paginated, filterable, sortable)
/// - `POST /api/tasks` - Create task
/// - `GET /api/tasks/:id` - Get task
/// - `PUT /api/tasks/:id` - Replace task
/// - `PATCH /api/tasks/:id` - Partially update task
/// - `DELETE /api/tasks/:id` - Delete task
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tasknest_shared::{
    auth::{authorization::require_task_owner, middleware::Identity},
    models::task::{
        default_sort, parse_sort_spec, CreateTask, ReplaceTask, Task, TaskFilter, TaskPatch,
        TaskPriority, TaskStatus,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Request body for creating or replacing a task
///
/// Create and PUT share this shape: PUT is a full replacement, so omitted
/// optional fields reset to their defaults rather than being preserved.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskPayload {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional longer description
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    /// Lifecycle status (default: pending)
    pub status: Option<TaskStatus>,

    /// Priority level (default: medium)
    pub priority: Option<TaskPriority>,

    /// Optional due date (ISO 8601)
    pub due_date: Option<DateTime<Utc>>,

    /// Labels (default: empty, each at most 50 characters)
    pub tags: Option<Vec<String>>,
}

/// Query parameters for task listing
///
/// `status` and `priority` arrive as plain strings and are parsed against
/// the enum wire values, so an unknown value produces the API's uniform
/// validation error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Page number, 1-based (default: 1)
    pub page: Option<u32>,

    /// Page size (default: 20, clamped to 1-100)
    pub limit: Option<u32>,

    /// Filter by status
    pub status: Option<String>,

    /// Filter by priority
    pub priority: Option<String>,

    /// Comma-separated sort spec, e.g. `priority:desc,due_date`
    pub sort: Option<String>,
}

/// Task listing response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Total matching tasks across all pages
    pub total: i64,

    /// Page number served
    pub page: u32,

    /// Page size used
    pub limit: u32,

    /// Tasks on this page
    pub items: Vec<Task>,
}

/// List tasks
///
/// Returns one page of the authenticated user's tasks. Filters and sort
/// keys apply to both the page items and the total count.
///
/// # Endpoint
///
/// ```text
/// GET /api/tasks?page=1&limit=20&status=pending&sort=priority:desc,due_date
/// Authorization: Bearer <access_token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "total": 42,
///   "page": 1,
///   "limit": 20,
///   "items": [ { "id": "uuid", "title": "...", ... } ]
/// }
/// ```
///
/// # Errors
///
/// - `400 INVALID_SORT_FIELD`: Sort spec names an unknown field
/// - `422 VALIDATION_ERROR`: Unknown status or priority value
/// - `401`: Missing, expired, or invalid token
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListTasksResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(limit);

    let filter = parse_filter(&query)?;
    let sort = match query.sort.as_deref() {
        Some(spec) => parse_sort_spec(spec)?,
        None => default_sort(),
    };

    let total = Task::count_for_owner(&state.db, identity.user_id, filter).await?;
    let items = Task::list_for_owner(
        &state.db,
        identity.user_id,
        filter,
        &sort,
        i64::from(limit),
        offset,
    )
    .await?;

    Ok(Json(ListTasksResponse {
        total,
        page,
        limit,
        items,
    }))
}

/// Create task
///
/// Creates a task owned by the authenticated user. The owner comes from
/// the verified token, never from the request body.
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <access_token>
/// Content-Type: application/json
///
/// {
///   "title": "Write release notes",
///   "description": "Cover the auth changes",
///   "priority": "high",
///   "due_date": "2025-06-01T12:00:00Z",
///   "tags": ["docs"]
/// }
/// ```
///
/// # Response (201)
///
/// The created task row, including generated id and timestamps.
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: Title or field length out of range
/// - `401`: Missing, expired, or invalid token
pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<TaskPayload>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;
    if let Some(tags) = &req.tags {
        check_tags(tags)?;
    }

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: identity.user_id,
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            due_date: req.due_date,
            tags: req.tags.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, user_id = %identity.user_id, "task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get task
///
/// Fetches a single task through the ownership guard.
///
/// # Errors
///
/// - `404 TASK_NOT_FOUND`: No task with this id
/// - `403 TASK_NOT_AUTHORIZED`: Task belongs to another user
pub async fn get_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = require_task_owner(&state.db, id, identity.user_id).await?;

    Ok(Json(task))
}

/// Replace task
///
/// Full update with PUT semantics: the payload shape matches create, and
/// omitted optional fields reset (description and due date to null, status
/// and priority to their defaults, tags to empty).
///
/// # Errors
///
/// - `404 TASK_NOT_FOUND`: No task with this id
/// - `403 TASK_NOT_AUTHORIZED`: Task belongs to another user
/// - `422 VALIDATION_ERROR`: Field length out of range
pub async fn replace_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(req): Json<TaskPayload>,
) -> ApiResult<Json<Task>> {
    req.validate()?;
    if let Some(tags) = &req.tags {
        check_tags(tags)?;
    }

    require_task_owner(&state.db, id, identity.user_id).await?;

    let task = Task::replace(
        &state.db,
        id,
        ReplaceTask {
            title: req.title,
            description: req.description,
            status: req.status.unwrap_or_default(),
            priority: req.priority.unwrap_or_default(),
            due_date: req.due_date,
            tags: req.tags.unwrap_or_default(),
        },
    )
    .await?
    .ok_or(ApiError::TaskNotFound)?;

    Ok(Json(task))
}

/// Partially update task
///
/// PATCH semantics with an absent-vs-null distinction: omitted fields stay
/// untouched, an explicit `null` clears a nullable field. An empty patch
/// is a no-op that still refreshes `updated_at`.
///
/// # Endpoint
///
/// ```text
/// PATCH /api/tasks/:id
/// Authorization: Bearer <access_token>
/// Content-Type: application/json
///
/// { "status": "completed", "due_date": null }
/// ```
///
/// # Errors
///
/// - `404 TASK_NOT_FOUND`: No task with this id
/// - `403 TASK_NOT_AUTHORIZED`: Task belongs to another user
/// - `422 VALIDATION_ERROR`: Field length out of range
pub async fn patch_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    check_patch(&patch)?;

    require_task_owner(&state.db, id, identity.user_id).await?;

    let task = Task::apply_patch(&state.db, id, patch)
        .await?
        .ok_or(ApiError::TaskNotFound)?;

    Ok(Json(task))
}

/// Delete task
///
/// # Response
///
/// `204 No Content` on success.
///
/// # Errors
///
/// - `404 TASK_NOT_FOUND`: No task with this id
/// - `403 TASK_NOT_AUTHORIZED`: Task belongs to another user
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_task_owner(&state.db, id, identity.user_id).await?;

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::TaskNotFound);
    }

    tracing::info!(task_id = %id, user_id = %identity.user_id, "task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Parses the status and priority filter strings
fn parse_filter(query: &ListTasksQuery) -> Result<TaskFilter, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            TaskStatus::parse(s).ok_or_else(|| invalid_field("status", format!("Unknown status: {}", s)))
        })
        .transpose()?;

    let priority = query
        .priority
        .as_deref()
        .map(|p| {
            TaskPriority::parse(p)
                .ok_or_else(|| invalid_field("priority", format!("Unknown priority: {}", p)))
        })
        .transpose()?;

    Ok(TaskFilter { status, priority })
}

/// Rejects tags longer than the column allows
fn check_tags(tags: &[String]) -> Result<(), ApiError> {
    if tags.iter().any(|tag| tag.chars().count() > 50) {
        return Err(invalid_field(
            "tags",
            "Tags must be at most 50 characters".to_string(),
        ));
    }

    Ok(())
}

/// Length checks for patch fields, mirroring the create/replace schema
///
/// The patch struct deserializes through the absent-vs-null machinery, so
/// the bounds are checked here rather than through a validator derive.
fn check_patch(patch: &TaskPatch) -> Result<(), ApiError> {
    let mut details = Vec::new();

    if let Some(title) = &patch.title {
        let chars = title.chars().count();
        if chars == 0 || chars > 255 {
            details.push(ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title must be 1-255 characters".to_string(),
            });
        }
    }

    if let Some(Some(description)) = &patch.description {
        if description.chars().count() > 5000 {
            details.push(ValidationErrorDetail {
                field: "description".to_string(),
                message: "Description must be at most 5000 characters".to_string(),
            });
        }
    }

    if let Some(tags) = &patch.tags {
        if tags.iter().any(|tag| tag.chars().count() > 50) {
            details.push(ValidationErrorDetail {
                field: "tags".to_string(),
                message: "Tags must be at most 50 characters".to_string(),
            });
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(details))
    }
}

/// Builds a single-field validation error
fn invalid_field(field: &str, message: String) -> ApiError {
    ApiError::Validation(vec![ValidationErrorDetail {
        field: field.to_string(),
        message,
    }])
}
