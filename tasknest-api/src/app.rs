/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use tasknest_api::{app::{build_router, AppState}, config::Config};
/// use tasknest_shared::auth::{jwt::TokenCodec, service::AuthService};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let codec = TokenCodec::new(&config.auth.jwt_secret)?;
/// let auth = AuthService::new(pool.clone(), codec);
/// let app = build_router(AppState::new(pool, config, auth));
/// # Ok(())
/// # }
/// ```
use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasknest_shared::auth::{
    middleware::{create_attach_identity, create_require_identity, PUBLIC_PATHS},
    service::AuthService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Authentication service (signup, signin, token issuance)
    pub auth: AuthService,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, auth: AuthService) -> Self {
        Self {
            db,
            config: Arc::new(config),
            auth,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── GET  /                    # Service banner (public)
/// ├── GET  /health              # Health check (public)
/// ├── /api/auth/                # Authentication endpoints (public)
/// │   ├── POST /signup
/// │   └── POST /signin
/// └── /api/tasks/               # Task CRUD (authenticated)
///     ├── GET    /              # List tasks (paginated)
///     ├── POST   /              # Create task
///     ├── GET    /:id           # Get task
///     ├── PUT    /:id           # Replace task
///     ├── PATCH  /:id           # Partially update task
///     └── DELETE /:id           # Delete task
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Permissive identity extraction (all routes, skips public paths)
/// 4. Strict identity requirement (task routes only)
///
/// The permissive and strict layers verify tokens independently; a request
/// to `/api/tasks` must satisfy the strict layer no matter what the
/// permissive one attached.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let codec = state.auth.codec().clone();

    // Banner and health check (public, no auth)
    let public_routes = Router::new()
        .route("/", get(routes::health::banner))
        .route("/health", get(routes::health::health_check));

    // Auth routes (public, these hand out the tokens)
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/signin", post(routes::auth::signin));

    // Task routes (require a verified identity)
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::replace_task)
                .patch(routes::tasks::patch_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn(create_require_identity(
            codec.clone(),
        )));

    // Configure CORS based on environment
    let cors = if state.config.cors_allow_any() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(public_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/tasks", task_routes)
        .layer(axum::middleware::from_fn(create_attach_identity(
            codec,
            PUBLIC_PATHS,
        )))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
