/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Service banner and health check endpoints
/// - `auth`: Authentication endpoints (signup, signin)
/// - `tasks`: Owner-scoped task CRUD endpoints
pub mod auth;
pub mod health;
pub mod tasks;
