/// Configuration management for the API server
///
/// This module loads configuration from environment variables once at
/// startup and provides a type-safe configuration struct. Nothing reads
/// the environment after boot; everything downstream receives the loaded
/// values by injection.
///
/// # Environment Variables
///
/// - `HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 8000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
/// - `JWT_SECRET`: Token signing secret (required; minimum length is
///   enforced when the token codec is built)
/// - `ACCESS_TOKEN_EXPIRE_SECONDS`: Access token lifetime (default: 604800)
/// - `REFRESH_TOKEN_EXPIRE_SECONDS`: Refresh token lifetime (default: 2592000)
/// - `RUST_LOG`: Log filter (default: `tasknest_api=debug,tower_http=debug`)
///
/// # Example
///
/// ```no_run
/// use tasknest_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; a `*` entry means any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes; the codec rejects shorter secrets at
    /// startup. Generate with: `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Access token lifetime in seconds (default: 7 days)
    pub access_token_expire_seconds: i64,

    /// Refresh token lifetime in seconds (default: 30 days)
    pub refresh_token_expire_seconds: i64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first when
    /// present, for development convenience.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - A numeric variable fails to parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()?;

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let access_token_expire_seconds = env::var("ACCESS_TOKEN_EXPIRE_SECONDS")
            .unwrap_or_else(|_| "604800".to_string())
            .parse::<i64>()?;

        let refresh_token_expire_seconds = env::var("REFRESH_TOKEN_EXPIRE_SECONDS")
            .unwrap_or_else(|_| "2592000".to_string())
            .parse::<i64>()?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                access_token_expire_seconds,
                refresh_token_expire_seconds,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// True when CORS should allow any origin
    pub fn cors_allow_any(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

/// Splits a comma-separated origin list, dropping empty entries
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
