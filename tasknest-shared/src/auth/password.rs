//! Password hashing using Argon2id.
//!
//! Passwords are hashed with Argon2id (the Password Hashing Competition
//! winner) and stored as PHC strings, so the algorithm, version, cost
//! parameters, and salt all travel with the digest.
//!
//! # Security
//!
//! - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
//! - **Memory**: 64 MB (65536 KiB)
//! - **Iterations**: 3 passes
//! - **Parallelism**: 4 lanes
//! - **Output**: 32-byte hash
//!
//! Verification never fails: a digest that cannot be parsed is treated the
//! same as a wrong password. Plaintext passwords are never logged and never
//! embedded in errors.
//!
//! # Example
//!
//! ```
//! use tasknest_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("super_secret_password_123")?;
//!
//! assert!(verify_password("super_secret_password_123", &hash));
//! assert!(!verify_password("wrong_password", &hash));
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Memory cost in KiB (64 MB).
const MEMORY_COST_KIB: u32 = 65536;
/// Number of passes over memory.
const ITERATIONS: u32 = 3;
/// Degree of parallelism.
const PARALLELISM: u32 = 4;
/// Digest length in bytes.
const OUTPUT_LEN: usize = 32;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// Hashes a password using Argon2id with fixed cost parameters
///
/// A fresh 16-byte salt is drawn from the OS RNG on every call, so hashing
/// the same password twice produces different digests.
///
/// # Returns
///
/// PHC string format hash (includes algorithm, parameters, salt, and hash)
///
/// Example output:
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails. The error carries
/// only the underlying algorithm failure, never the password itself.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    // Generate a random salt using OS RNG
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(MEMORY_COST_KIB)
        .t_cost(ITERATIONS)
        .p_cost(PARALLELISM)
        .output_len(OUTPUT_LEN)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored digest
///
/// Returns `true` only when the password matches. A mismatch, a digest that
/// is not a PHC string, or a digest produced by an unsupported algorithm all
/// yield `false`; stored data can never turn verification into a hard error.
///
/// The underlying comparison is constant-time.
///
/// # Example
///
/// ```
/// use tasknest_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct_password")?;
///
/// assert!(verify_password("correct_password", &hash));
/// assert!(!verify_password("wrong_password", &hash));
/// assert!(!verify_password("correct_password", "not-a-phc-string"));
/// # Ok(())
/// # }
/// ```
pub fn verify_password(password: &str, hash: &str) -> bool {
    // A digest we cannot parse is a non-match, not an error
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    // Parameters are embedded in the hash
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "test_password_123";
        let hash = hash_password(password).expect("Hash should succeed");

        // Hash should start with $argon2id$
        assert!(hash.starts_with("$argon2id$"));

        // Hash should contain version
        assert!(hash.contains("v=19"));

        // Hash should contain parameters
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let password = "same_password";

        let hash1 = hash_password(password).expect("Hash 1 should succeed");
        let hash2 = hash_password(password).expect("Hash 2 should succeed");

        // Different salts = different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = hash_password(password).expect("Hash should succeed");

        assert!(verify_password(password, &hash), "Correct password should verify");
    }

    #[test]
    fn test_verify_password_incorrect() {
        let password = "correct_password";
        let hash = hash_password(password).expect("Hash should succeed");

        assert!(!verify_password("wrong_password", &hash), "Wrong password should not verify");
    }

    #[test]
    fn test_verify_password_empty_input() {
        let password = "password";
        let hash = hash_password(password).expect("Hash should succeed");

        assert!(!verify_password("", &hash), "Empty password should not verify");
    }

    #[test]
    fn test_empty_password_roundtrip() {
        // Policy on minimum length lives elsewhere; the hasher itself must
        // handle the empty string like any other input
        let hash = hash_password("").expect("Hash should succeed");

        assert!(verify_password("", &hash));
        assert!(!verify_password("not-empty", &hash));
    }

    #[test]
    fn test_verify_password_invalid_hash_is_false() {
        assert!(!verify_password("password", "invalid_hash"));
    }

    #[test]
    fn test_verify_password_malformed_phc_is_false() {
        assert!(!verify_password("password", "$argon2id$invalid"));
    }

    #[test]
    fn test_verify_password_empty_hash_is_false() {
        assert!(!verify_password("password", ""));
    }

    #[test]
    fn test_verify_password_unsupported_algorithm_is_false() {
        // bcrypt-style digest; the PHC parser rejects it
        assert!(!verify_password(
            "password",
            "$2b$12$GhvMmNVjRW29ulnudl.LbuAnUtN/LRfe1JsBm1Xu6LE3059z5Tr8m"
        ));
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
            "very_long_password_that_is_longer_than_usual_passwords_123456789",
        ];

        for password in passwords {
            let hash = hash_password(password).expect("Hash should succeed");
            assert!(verify_password(password, &hash), "Password '{}' should verify", password);
        }
    }

    #[test]
    fn test_timing_attack_resistance() {
        // This test verifies that verification time doesn't leak information
        // about password correctness. In practice, Argon2 is designed to be
        // constant-time for verification.

        let password = "correct_password";
        let hash = hash_password(password).expect("Hash should succeed");

        // Verify with correct password
        let start = std::time::Instant::now();
        let _ = verify_password(password, &hash);
        let correct_duration = start.elapsed();

        // Verify with incorrect password of same length
        let start = std::time::Instant::now();
        let _ = verify_password("incorrect_pwd_", &hash);
        let incorrect_duration = start.elapsed();

        // Durations should be similar (within 50% variance due to system noise)
        // This is a rough check - proper timing attack resistance is built into Argon2
        let ratio = correct_duration.as_micros() as f64 / incorrect_duration.as_micros() as f64;
        assert!(
            ratio > 0.5 && ratio < 2.0,
            "Timing difference too large: correct={:?}, incorrect={:?}",
            correct_duration,
            incorrect_duration
        );
    }
}
