/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the
/// appropriate status code and a JSON body of the shape
/// `{ "error": CODE, "message": text, "status_code": n }`. Validation
/// failures additionally carry a `details` array of per-field messages.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::error::ApiResult;
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Ok(Json(json!({ "status": "ok" })))
/// }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tasknest_shared::auth::authorization::AuthzError;
use tasknest_shared::auth::jwt::JwtError;
use tasknest_shared::auth::service::{AuthServiceError, MAX_PASSWORD_CHARS, MIN_PASSWORD_CHARS};
use tasknest_shared::models::task::InvalidSortField;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Unknown sort field in a list request (400)
    InvalidSortField(String),

    /// Signin rejected (401); deliberately does not say which part was wrong
    InvalidCredentials,

    /// Token past its expiry (401)
    TokenExpired,

    /// Token failed verification (401)
    TokenInvalid,

    /// Authenticated user does not own the task (403)
    NotTaskOwner,

    /// Task absent, or hidden behind the ownership check (404)
    TaskNotFound,

    /// Signup with an email that is already registered (409)
    EmailExists,

    /// Unique or foreign key constraint violation (409)
    IntegrityViolation,

    /// Password outside the accepted length range (422)
    WeakPassword,

    /// Request body failed schema validation (422)
    Validation(Vec<ValidationErrorDetail>),

    /// Internal server error (500); detail is logged, not exposed
    Internal(String),

    /// Database unreachable (503); detail is logged, not exposed
    DatabaseUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code (e.g., "AUTH_INVALID_CREDENTIALS")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code, repeated in the body
    pub status_code: u16,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidSortField(field) => write!(f, "Invalid sort field: {}", field),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::TokenExpired => write!(f, "Token expired"),
            ApiError::TokenInvalid => write!(f, "Invalid token"),
            ApiError::NotTaskOwner => write!(f, "Access denied"),
            ApiError::TaskNotFound => write!(f, "Task not found"),
            ApiError::EmailExists => write!(f, "Email already registered"),
            ApiError::IntegrityViolation => write!(f, "Resource already exists"),
            ApiError::WeakPassword => write!(
                f,
                "Password must be between {} and {} characters",
                MIN_PASSWORD_CHARS, MAX_PASSWORD_CHARS
            ),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::DatabaseUnavailable(msg) => write!(f, "Database unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Returns the status code and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidSortField(_) => (StatusCode::BAD_REQUEST, "INVALID_SORT_FIELD"),
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "AUTH_INVALID_CREDENTIALS")
            }
            ApiError::TokenExpired => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN_EXPIRED"),
            ApiError::TokenInvalid => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN_INVALID"),
            ApiError::NotTaskOwner => (StatusCode::FORBIDDEN, "TASK_NOT_AUTHORIZED"),
            ApiError::TaskNotFound => (StatusCode::NOT_FOUND, "TASK_NOT_FOUND"),
            ApiError::EmailExists => (StatusCode::CONFLICT, "AUTH_EMAIL_EXISTS"),
            ApiError::IntegrityViolation => (StatusCode::CONFLICT, "INTEGRITY_VIOLATION"),
            ApiError::WeakPassword => (StatusCode::UNPROCESSABLE_ENTITY, "AUTH_WEAK_PASSWORD"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
            ApiError::DatabaseUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "DATABASE_UNAVAILABLE")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let (message, details) = match self {
            ApiError::Validation(errors) => {
                ("Request validation failed".to_string(), Some(errors))
            }
            ApiError::Internal(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
            ApiError::DatabaseUnavailable(msg) => {
                tracing::warn!("Database unavailable: {}", msg);
                ("Database temporarily unavailable".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            status_code: status.as_u16(),
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::DatabaseUnavailable(err.to_string())
            }
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                    return ApiError::IntegrityViolation;
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert authentication service errors to API errors
impl From<AuthServiceError> for ApiError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::WeakPassword => ApiError::WeakPassword,
            AuthServiceError::EmailExists => ApiError::EmailExists,
            AuthServiceError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthServiceError::Password(e) => {
                ApiError::Internal(format!("Password operation failed: {}", e))
            }
            AuthServiceError::Jwt(e) => e.into(),
            AuthServiceError::Database(e) => e.into(),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::TokenExpired,
            JwtError::Invalid(_) | JwtError::MissingSubject => ApiError::TokenInvalid,
            JwtError::WeakSecret | JwtError::CreateError(_) => {
                ApiError::Internal(format!("Token operation failed: {}", err))
            }
        }
    }
}

/// Convert ownership check errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::TaskNotFound => ApiError::TaskNotFound,
            AuthzError::NotOwner => ApiError::NotTaskOwner,
            AuthzError::Database(e) => e.into(),
        }
    }
}

/// Convert sort spec parse errors to API errors
impl From<InvalidSortField> for ApiError {
    fn from(err: InvalidSortField) -> Self {
        ApiError::InvalidSortField(err.0)
    }
}

/// Convert request schema validation errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .iter()
            .flat_map(|(field, field_errors)| {
                field_errors.iter().map(|err| ValidationErrorDetail {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Validation failed: {}", err.code)),
                })
            })
            .collect();

        ApiError::Validation(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::InvalidSortField("owner".to_string());
        assert_eq!(err.to_string(), "Invalid sort field: owner");

        let err = ApiError::TaskNotFound;
        assert_eq!(err.to_string(), "Task not found");

        let err = ApiError::WeakPassword;
        assert_eq!(
            err.to_string(),
            "Password must be between 8 and 72 characters"
        );
    }

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (ApiError::InvalidCredentials, 401, "AUTH_INVALID_CREDENTIALS"),
            (ApiError::TokenExpired, 401, "AUTH_TOKEN_EXPIRED"),
            (ApiError::NotTaskOwner, 403, "TASK_NOT_AUTHORIZED"),
            (ApiError::TaskNotFound, 404, "TASK_NOT_FOUND"),
            (ApiError::EmailExists, 409, "AUTH_EMAIL_EXISTS"),
            (ApiError::WeakPassword, 422, "AUTH_WEAK_PASSWORD"),
        ];

        for (err, status, code) in cases {
            let (got_status, got_code) = err.status_and_code();
            assert_eq!(got_status.as_u16(), status);
            assert_eq!(got_code, code);
        }
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ApiError::DatabaseUnavailable(_)));
        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_authz_errors_map_to_http_semantics() {
        let err: ApiError = AuthzError::TaskNotFound.into();
        assert!(matches!(err, ApiError::TaskNotFound));

        let err: ApiError = AuthzError::NotOwner.into();
        assert!(matches!(err, ApiError::NotTaskOwner));
    }

    #[test]
    fn test_validation_details_flattened() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("email", validator::ValidationError::new("email"));

        let err: ApiError = errors.into();
        match &err {
            ApiError::Validation(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "email");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(err.status_and_code().1, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["error"], "AUTH_INVALID_CREDENTIALS");
        assert_eq!(body["message"], "Invalid credentials");
        assert_eq!(body["status_code"], 401);
        assert!(body.get("details").is_none());
    }
}
