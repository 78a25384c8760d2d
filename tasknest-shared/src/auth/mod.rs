/// Authentication and authorization for TaskNest
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 token codec (access + refresh tokens)
/// - [`middleware`]: bearer-token identity extraction for Axum
/// - [`service`]: signup, signin, and token issuance
/// - [`authorization`]: task ownership checks
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Tokens**: HS256 signing, secret length enforced at startup
/// - **Identity**: verified per request; strict and permissive policies
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::auth::jwt::{TokenCodec, TokenType};
/// use tasknest_shared::auth::password::{hash_password, verify_password};
/// use tasknest_shared::models::id::UserId;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// // Token issuance
/// let codec = TokenCodec::new("0123456789abcdef0123456789abcdef")?;
/// let token = codec.issue(UserId::new(), TokenType::Access)?;
/// # Ok(())
/// # }
/// ```
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
