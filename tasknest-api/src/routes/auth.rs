/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Signup (account creation)
/// - Signin (credential exchange for tokens)
///
/// Both return the same `{ user, tokens }` shape so clients have one code
/// path for session establishment. The email format is checked at the
/// schema layer here; the password length policy lives in the auth
/// service, which is the single owner of that rule.
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Register a new account
/// - `POST /api/auth/signin` - Sign in and get tokens
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tasknest_shared::{auth::service::TokenPair, models::user::User};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password; the length policy is enforced by the auth service
    pub password: String,

    /// Optional display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Signin request
#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Session establishment response, shared by signup and signin
///
/// The user representation never includes the password hash; the model
/// skips it during serialization.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The account the session belongs to
    pub user: User,

    /// Freshly issued token pair
    pub tokens: TokenPair,
}

/// Signup endpoint
///
/// Creates a new user account and signs it in immediately.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/signup
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "hunter2hunter2",
///   "name": "Sam"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "user": {
///     "id": "uuid",
///     "email": "user@example.com",
///     "name": "Sam",
///     "is_active": true,
///     "created_at": "2025-01-03T12:00:00Z",
///     "updated_at": "2025-01-03T12:00:00Z"
///   },
///   "tokens": {
///     "access_token": "eyJ...",
///     "refresh_token": "eyJ...",
///     "token_type": "bearer",
///     "expires_in": 604800
///   }
/// }
/// ```
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: Malformed email or over-long name
/// - `422 AUTH_WEAK_PASSWORD`: Password outside the accepted length range
/// - `409 AUTH_EMAIL_EXISTS`: Email already registered
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let user = state.auth.signup(&req.email, &req.password, req.name).await?;
    let tokens = state.auth.generate_tokens(user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { user, tokens })))
}

/// Signin endpoint
///
/// Authenticates a user and returns a fresh token pair.
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/signin
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "hunter2hunter2"
/// }
/// ```
///
/// # Response (200)
///
/// Same `{ user, tokens }` shape as signup.
///
/// # Errors
///
/// - `422 VALIDATION_ERROR`: Malformed email
/// - `401 AUTH_INVALID_CREDENTIALS`: Unknown email, wrong password, or
///   deactivated account; the three cases are indistinguishable in the
///   response
pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = state.auth.signin(&req.email, &req.password).await?;
    let tokens = state.auth.generate_tokens(user.id)?;

    Ok(Json(AuthResponse { user, tokens }))
}
