//! JWT issuing and verification.
//!
//! Tokens are signed with HS256 (HMAC-SHA256) over a shared secret and carry
//! the authenticated user's identity. All signing and verification goes
//! through a [`TokenCodec`] constructed once at startup from the configured
//! secret; nothing in this module reads configuration ambiently.
//!
//! # Security
//!
//! - **Algorithm**: HS256 (HMAC with SHA-256)
//! - **Secret**: at least 32 bytes (256 bits), enforced when the codec is
//!   built, never per token
//! - **Expiration**: checked with zero leeway on verification
//!
//! # Token Types
//!
//! - **Access Token**: 7 days by default, used for API authentication
//! - **Refresh Token**: 30 days by default
//!
//! The `type` claim is carried and returned but verification accepts either
//! kind; route policy decides what to do with it.
//!
//! # Example
//!
//! ```
//! use tasknest_shared::auth::jwt::{TokenCodec, TokenType};
//! use tasknest_shared::models::id::UserId;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = TokenCodec::new("an-example-secret-of-32-bytes!!!")?;
//! let user_id = UserId::new();
//!
//! let token = codec.issue(user_id, TokenType::Access)?;
//! let claims = codec.verify(&token)?;
//! assert_eq!(claims.subject(), Some(user_id.to_string().as_str()));
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::id::UserId;

/// Minimum signing secret length in bytes for HS256.
pub const MIN_SECRET_BYTES: usize = 32;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Signing secret shorter than [`MIN_SECRET_BYTES`]
    #[error("JWT secret must be at least {MIN_SECRET_BYTES} bytes")]
    WeakSecret,

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired (signature was valid)
    #[error("Token has expired")]
    Expired,

    /// Malformed token, bad signature, or wrong algorithm
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Signature was valid but the token carries no `sub` claim
    #[error("Token missing 'sub' claim")]
    MissingSubject,
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token (7 days)
    Access,

    /// Refresh token (30 days)
    Refresh,
}

impl TokenType {
    /// Gets default expiration duration for token type
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::days(7),
            TokenType::Refresh => Duration::days(30),
        }
    }

    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims structure
///
/// # Claims
///
/// - `sub`: Subject - canonical string form of the user id. Optional on the
///   wire; [`TokenCodec::verify`] rejects tokens without it.
/// - `iat`: Issued at timestamp (Unix seconds)
/// - `exp`: Expiration timestamp (Unix seconds)
/// - `type`: Access or refresh token
/// - `jti`: Random per-issue id, so two tokens minted for the same subject
///   within the same second are still distinct strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID in canonical string form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Token type (serialized as `type`)
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Per-issue token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<Uuid>,
}

impl Claims {
    /// Creates new claims with the token type's default expiration
    ///
    /// # Example
    ///
    /// ```
    /// use tasknest_shared::auth::jwt::{Claims, TokenType};
    /// use tasknest_shared::models::id::UserId;
    ///
    /// let claims = Claims::new(UserId::new(), TokenType::Access);
    /// assert!(!claims.is_expired());
    /// ```
    pub fn new(user_id: UserId, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Creates claims with a custom expiration
    ///
    /// # Example
    ///
    /// ```
    /// use tasknest_shared::auth::jwt::{Claims, TokenType};
    /// use tasknest_shared::models::id::UserId;
    /// use chrono::Duration;
    ///
    /// let claims = Claims::with_expiration(
    ///     UserId::new(),
    ///     TokenType::Access,
    ///     Duration::hours(1),
    /// );
    /// ```
    pub fn with_expiration(user_id: UserId, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: Some(user_id.to_string()),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            token_type,
            jti: Some(Uuid::new_v4()),
        }
    }

    /// Gets the subject claim, if present
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Checks if the claims are past their expiration
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration, or `None` when already expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// HS256 token codec bound to a single signing secret
///
/// Constructed once from configuration and injected wherever tokens are
/// issued or verified. Construction fails for secrets shorter than
/// [`MIN_SECRET_BYTES`]; after that the codec is immutable.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Builds a codec from the signing secret
    ///
    /// # Errors
    ///
    /// Returns `JwtError::WeakSecret` when the secret is shorter than 32
    /// bytes. This is the boot-time check; issuing and verification assume
    /// it has passed.
    ///
    /// # Example
    ///
    /// ```
    /// use tasknest_shared::auth::jwt::TokenCodec;
    ///
    /// assert!(TokenCodec::new("too-short").is_err());
    /// assert!(TokenCodec::new("0123456789abcdef0123456789abcdef").is_ok());
    /// ```
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(JwtError::WeakSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Issues a token with the token type's default lifetime
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    ///
    /// # Example
    ///
    /// ```
    /// use tasknest_shared::auth::jwt::{TokenCodec, TokenType};
    /// use tasknest_shared::models::id::UserId;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef")?;
    /// let token = codec.issue(UserId::new(), TokenType::Access)?;
    /// assert!(!token.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn issue(&self, user_id: UserId, token_type: TokenType) -> Result<String, JwtError> {
        self.issue_with_expiration(user_id, token_type, token_type.default_expiration())
    }

    /// Issues a token with a caller-chosen lifetime
    ///
    /// Used where configuration overrides the default lifetimes.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue_with_expiration(
        &self,
        user_id: UserId,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims::with_expiration(user_id, token_type, expires_in);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and extracts its claims
    ///
    /// Checks, in order: signature and structure, expiration (zero leeway),
    /// then presence of the `sub` claim. The three failure shapes stay
    /// distinguishable so callers can answer "expired" differently from
    /// "forged" or "subject-less".
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` - valid signature, `exp` in the past
    /// - `JwtError::Invalid` - malformed token, wrong signature or algorithm
    /// - `JwtError::MissingSubject` - valid signature, no `sub` claim
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(format!("Token validation failed: {}", e)),
            })?;

        if token_data.claims.sub.is_none() {
            return Err(JwtError::MissingSubject);
        }

        Ok(token_data.claims)
    }

    /// Decodes claims without verifying the signature or expiration
    ///
    /// For display purposes only (e.g. telling a client its session will
    /// lapse soon). The result is attacker-controlled data and must never
    /// feed an authorization decision; that is what [`TokenCodec::verify`]
    /// is for.
    pub fn peek_unverified(token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims = std::collections::HashSet::new();

        // The key is unused once signature validation is off
        let key = DecodingKey::from_secret(&[]);

        let token_data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| JwtError::Invalid(format!("Token decoding failed: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Reports whether a token is past its expiration without verifying it
    ///
    /// Undecodable tokens count as expired. Same caveat as
    /// [`TokenCodec::peek_unverified`]: display only.
    pub fn is_expired(token: &str) -> bool {
        match Self::peek_unverified(token) {
            Ok(claims) => claims.is_expired(),
            Err(_) => true,
        }
    }
}
