/// Resource-level authorization checks
///
/// TaskNest's authorization model is deliberately small: every task has
/// exactly one owner, and only the owner may read or modify it. There are
/// no roles, no sharing, no admin override.
///
/// Existence is checked before ownership. A caller probing a task id that
/// does not exist gets "not found"; probing someone else's existing task
/// gets "access denied". The two cases stay distinguishable on purpose so
/// 404 never turns into an ownership oracle for ids that were never real.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::auth::authorization::require_task_owner;
/// use tasknest_shared::models::id::UserId;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, task_id: Uuid, user_id: UserId) -> Result<(), Box<dyn std::error::Error>> {
/// let task = require_task_owner(&pool, task_id, user_id).await?;
/// println!("authorized for task: {}", task.title);
/// # Ok(())
/// # }
/// ```
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::id::UserId;
use crate::models::task::Task;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// No task with the given id exists
    #[error("Task not found")]
    TaskNotFound,

    /// The task exists but belongs to someone else
    #[error("Access denied")]
    NotOwner,

    /// Database error while loading the task
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks that a task belongs to the given user
///
/// Pure half of [`require_task_owner`]; useful when the task row is
/// already in hand.
pub fn ensure_owner(task: &Task, user_id: UserId) -> Result<(), AuthzError> {
    if task.user_id != user_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

/// Loads a task and verifies the caller owns it
///
/// The task row is returned on success so handlers don't fetch it twice.
///
/// # Errors
///
/// - `AuthzError::TaskNotFound` - no such task (checked first)
/// - `AuthzError::NotOwner` - task exists, different owner
/// - `AuthzError::Database` - the lookup itself failed
pub async fn require_task_owner(
    pool: &PgPool,
    task_id: Uuid,
    user_id: UserId,
) -> Result<Task, AuthzError> {
    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or(AuthzError::TaskNotFound)?;

    ensure_owner(&task, user_id)?;

    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn task_owned_by(user_id: UserId) -> Task {
        Task {
            id: Uuid::new_v4(),
            user_id,
            title: "Water the plants".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            due_date: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_ensure_owner_accepts_owner() {
        let owner = UserId::new();
        let task = task_owned_by(owner);

        assert!(ensure_owner(&task, owner).is_ok());
    }

    #[test]
    fn test_ensure_owner_rejects_other_user() {
        let task = task_owned_by(UserId::new());

        let result = ensure_owner(&task, UserId::new());
        assert!(matches!(result, Err(AuthzError::NotOwner)));
    }

    #[test]
    fn test_authz_error_display() {
        assert_eq!(AuthzError::TaskNotFound.to_string(), "Task not found");
        assert_eq!(AuthzError::NotOwner.to_string(), "Access denied");
    }

    // The existence-before-ownership ordering of require_task_owner is
    // covered by the API integration tests, which need a database.
}
