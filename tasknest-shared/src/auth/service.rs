/// Signup, signin, and token generation
///
/// `AuthService` orchestrates the credential hasher, the token codec, and
/// the user store. It owns the password policy and the email normalization
/// rule; nothing else in the codebase hashes passwords or mints tokens for
/// users.
///
/// # Failure taxonomy
///
/// Signin collapses every underlying cause (unknown email, deactivated
/// account, wrong password) into one `InvalidCredentials` value so the
/// response cannot be used to enumerate accounts. Response timing is an
/// accepted residual difference.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::auth::jwt::TokenCodec;
/// use tasknest_shared::auth::service::AuthService;
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef")?;
/// let auth = AuthService::new(pool, codec);
///
/// let user = auth.signup("new@example.com", "hunter2hunter2", None).await?;
/// let tokens = auth.generate_tokens(user.id)?;
/// println!("access token: {}", tokens.access_token);
/// # Ok(())
/// # }
/// ```
use chrono::Duration;
use serde::Serialize;
use sqlx::PgPool;

use super::jwt::{JwtError, TokenCodec, TokenType};
use super::password::{hash_password, verify_password, PasswordError};
use crate::models::id::UserId;
use crate::models::user::{CreateUser, User};

/// Minimum password length in characters
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Maximum password length in characters
pub const MAX_PASSWORD_CHARS: usize = 72;

/// Error type for auth service operations
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    /// Password length outside the accepted range
    #[error("Password must be between {MIN_PASSWORD_CHARS} and {MAX_PASSWORD_CHARS} characters")]
    WeakPassword,

    /// Another account already uses this email
    #[error("Email already registered")]
    EmailExists,

    /// Signin failed; the cause is deliberately not surfaced
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token issuance failed
    #[error(transparent)]
    Jwt(#[from] JwtError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Freshly issued access/refresh token pair
///
/// `expires_in` is the access token lifetime in seconds, for clients that
/// schedule a refresh without decoding the token.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Always `"bearer"`
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Authentication orchestrator
///
/// Holds the user store handle, the token codec, and the configured token
/// lifetimes. Cheap to clone; shared across request handlers.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

/// Lowercases and trims an email address
///
/// The single normalization point: every lookup and every insert goes
/// through this, so `"  A@Ex.com "` and `"a@ex.com"` are the same account.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks password length in characters (not bytes)
///
/// Both bounds are inclusive: 8 and 72 pass, 7 and 73 fail.
fn password_length_ok(password: &str) -> bool {
    let chars = password.chars().count();
    (MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&chars)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

impl AuthService {
    /// Creates a service with the default token lifetimes
    pub fn new(pool: PgPool, codec: TokenCodec) -> Self {
        Self::with_token_lifetimes(
            pool,
            codec,
            TokenType::Access.default_expiration(),
            TokenType::Refresh.default_expiration(),
        )
    }

    /// Creates a service with configured token lifetimes
    pub fn with_token_lifetimes(
        pool: PgPool,
        codec: TokenCodec,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            pool,
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Registers a new user
    ///
    /// Normalizes the email, enforces the password policy, hashes the
    /// password, and persists the user row.
    ///
    /// # Errors
    ///
    /// - `AuthServiceError::WeakPassword` - length outside [8, 72] chars
    /// - `AuthServiceError::EmailExists` - normalized email already taken
    /// - hashing and database failures pass through
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<User, AuthServiceError> {
        if !password_length_ok(password) {
            return Err(AuthServiceError::WeakPassword);
        }

        let email = normalize_email(email);
        let password_hash = hash_password(password)?;

        let data = CreateUser {
            email,
            password_hash,
            name,
        };

        match User::create(&self.pool, data).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "user registered");
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => Err(AuthServiceError::EmailExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticates an existing user
    ///
    /// # Errors
    ///
    /// Returns `AuthServiceError::InvalidCredentials` whether the email is
    /// unknown, the account is inactive, or the password is wrong. Callers
    /// cannot tell which.
    pub async fn signin(&self, email: &str, password: &str) -> Result<User, AuthServiceError> {
        let email = normalize_email(email);

        let user = User::find_by_email(&self.pool, &email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthServiceError::InvalidCredentials);
        }

        if !verify_password(password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user signed in");
        Ok(user)
    }

    /// Issues a fresh access/refresh token pair
    ///
    /// Every call mints new tokens; two consecutive calls for the same
    /// user yield distinct strings even within one wall-clock second.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if token encoding fails
    pub fn generate_tokens(&self, user_id: UserId) -> Result<TokenPair, JwtError> {
        let access_token =
            self.codec
                .issue_with_expiration(user_id, TokenType::Access, self.access_ttl)?;
        let refresh_token =
            self.codec
                .issue_with_expiration(user_id, TokenType::Refresh, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// The codec this service issues tokens with
    ///
    /// The API layer shares it with the identity middleware so both ends
    /// of the token lifecycle use the same secret.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("User@Example.COM"), "user@example.com");
        assert_eq!(normalize_email("  a@b.com  "), "a@b.com");
        assert_eq!(normalize_email(" A@B.com "), "a@b.com");
    }

    #[test]
    fn test_password_length_boundaries() {
        // Inclusive bounds: 8 and 72 pass, 7 and 73 fail
        assert!(!password_length_ok(&"x".repeat(7)));
        assert!(password_length_ok(&"x".repeat(8)));
        assert!(password_length_ok(&"x".repeat(72)));
        assert!(!password_length_ok(&"x".repeat(73)));
    }

    #[test]
    fn test_password_length_counts_chars_not_bytes() {
        // 8 two-byte characters: 16 bytes, 8 chars, must pass
        let password = "é".repeat(8);
        assert_eq!(password.len(), 16);
        assert!(password_length_ok(&password));
    }

    #[test]
    fn test_weak_password_message_names_bounds() {
        let msg = AuthServiceError::WeakPassword.to_string();
        assert!(msg.contains('8'));
        assert!(msg.contains("72"));
    }

    #[test]
    fn test_error_messages_stay_generic() {
        assert_eq!(
            AuthServiceError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
        assert_eq!(
            AuthServiceError::EmailExists.to_string(),
            "Email already registered"
        );
    }

    #[test]
    fn test_token_pair_shape() {
        let pair = TokenPair {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 604_800,
        };

        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["expires_in"], 604_800);
    }

    // signup/signin against a live store are covered by the API crate's
    // integration tests.
}
