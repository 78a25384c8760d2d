/// Identity extraction middleware for Axum
///
/// This module turns `Authorization: Bearer <token>` headers into an
/// [`Identity`] in request extensions. Two composable policies share the
/// same verification path:
///
/// - **Strict** (`require_identity`): rejects the request with 401 before
///   the handler runs unless a valid token is present. Applied to protected
///   route groups.
/// - **Permissive** (`attach_identity`): attaches an identity when a valid
///   token is present and forwards the request either way. Applied
///   globally so any handler can ask "who is this, if anyone?".
///
/// The layers verify independently; neither consults the other's output.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use tasknest_shared::auth::middleware::{create_require_identity, Identity};
///
/// async fn protected_handler(Extension(identity): Extension<Identity>) -> String {
///     format!("Hello, user {}!", identity.user_id)
/// }
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef")?;
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .layer(middleware::from_fn(create_require_identity(codec)));
/// # Ok(())
/// # }
/// ```
use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::jwt::{Claims, JwtError, TokenCodec};
use crate::models::id::UserId;

/// Paths served without any token inspection
///
/// Health and banner endpoints plus the two endpoints that exist to hand
/// out tokens in the first place. The permissive layer skips these
/// entirely, so a stale token in the header cannot break a signin.
pub const PUBLIC_PATHS: &[&str] = &["/", "/health", "/api/auth/signup", "/api/auth/signin"];

/// Authenticated caller, extracted from a verified token
///
/// Handlers on protected routes extract it with Axum's `Extension`:
///
/// ```
/// use axum::Extension;
/// use tasknest_shared::auth::middleware::Identity;
///
/// async fn handler(Extension(identity): Extension<Identity>) -> String {
///     format!("User: {}", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// The verified token's subject
    pub user_id: UserId,
}

impl Identity {
    /// Builds an identity from verified claims
    ///
    /// Returns `None` when the subject is absent or not a parseable user
    /// id; callers treat that the same as an invalid token.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        let user_id = claims.subject()?.parse().ok()?;
        Some(Self { user_id })
    }
}

/// Rejection produced by the strict layer
///
/// Serializes to the API's uniform error body so a middleware rejection is
/// indistinguishable in shape from a handler error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or not a `Bearer` scheme
    #[error("Token required")]
    TokenMissing,

    /// Signature valid but the token is past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Malformed token, bad signature, or unusable subject
    #[error("Invalid token")]
    TokenInvalid,
}

impl AuthError {
    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "AUTH_TOKEN_MISSING",
            AuthError::TokenExpired => "AUTH_TOKEN_EXPIRED",
            AuthError::TokenInvalid => "AUTH_TOKEN_INVALID",
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
            "status_code": StatusCode::UNAUTHORIZED.as_u16(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Pulls the bearer token out of the Authorization header
///
/// `None` covers both a missing header and a non-Bearer scheme.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Strict identity middleware
///
/// Verifies the bearer token and inserts an [`Identity`] into request
/// extensions before calling the handler.
///
/// # Errors
///
/// Short-circuits with 401 when:
/// - the Authorization header is missing or not `Bearer` (`TokenMissing`)
/// - the token is expired (`TokenExpired`)
/// - the token is malformed, forged, or carries no usable subject
///   (`TokenInvalid`)
pub async fn require_identity(
    codec: TokenCodec,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers()).ok_or(AuthError::TokenMissing)?;

    let claims = codec.verify(token)?;
    let identity = Identity::from_claims(&claims).ok_or(AuthError::TokenInvalid)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Permissive identity middleware
///
/// Attaches an [`Identity`] when the request carries a valid token and
/// forwards the request untouched otherwise. Requests to `exempt` paths
/// skip extraction entirely, whatever their headers say.
pub async fn attach_identity(
    codec: TokenCodec,
    exempt: &'static [&'static str],
    mut req: Request,
    next: Next,
) -> Response {
    if exempt.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    if let Some(token) = bearer_token(req.headers()) {
        if let Ok(claims) = codec.verify(token) {
            if let Some(identity) = Identity::from_claims(&claims) {
                req.extensions_mut().insert(identity);
            }
        }
    }

    next.run(req).await
}

/// Creates a strict identity middleware closure
///
/// Captures the codec so the result can be handed straight to
/// `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use tasknest_shared::auth::middleware::create_require_identity;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef")?;
///
/// let app: Router = Router::new()
///     .route("/api/tasks", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_require_identity(codec)));
/// # Ok(())
/// # }
/// ```
pub fn create_require_identity(
    codec: TokenCodec,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
> + Clone {
    move |req, next| {
        let codec = codec.clone();
        Box::pin(require_identity(codec, req, next))
    }
}

/// Creates a permissive identity middleware closure
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, Router};
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use tasknest_shared::auth::middleware::{create_attach_identity, PUBLIC_PATHS};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef")?;
///
/// let app: Router = Router::new()
///     .layer(middleware::from_fn(create_attach_identity(codec, PUBLIC_PATHS)));
/// # Ok(())
/// # }
/// ```
pub fn create_attach_identity(
    codec: TokenCodec,
    exempt: &'static [&'static str],
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone {
    move |req, next| {
        let codec = codec.clone();
        Box::pin(attach_identity(codec, exempt, req, next))
    }
}
