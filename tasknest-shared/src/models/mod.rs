/// Database models for TaskNest
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `id`: Strongly typed entity identifiers
/// - `user`: User accounts and authentication
/// - `task`: User-owned tasks
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Jo Doe".to_string()),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```
pub mod id;
pub mod task;
pub mod user;
