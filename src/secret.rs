//! Signing Secret Management (IA-5, SC-12)
//!
//! Validation and generation of the process-wide symmetric secret used to
//! sign session tokens.
//!
//! The secret is validated once at startup and is immutable for the process
//! lifetime. Validation enforces the HMAC-SHA256 key-size requirement
//! (RFC 7518 §3.2: the key must be at least as long as the hash output)
//! and rejects known-weak filler values.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::secret::SigningSecret;
//!
//! // From configuration
//! let secret = SigningSecret::new(std::env::var("JWT_SECRET")?)?;
//!
//! // Or generated (e.g. for tests and provisioning tooling)
//! let secret = SigningSecret::generate(64);
//! ```

use std::fmt;

use thiserror::Error;

/// Minimum secret length in bytes for HMAC-SHA256 (RFC 7518 §3.2).
pub const MIN_SECRET_LEN: usize = 32;

/// Error type for signing-secret validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretError {
    /// Secret is shorter than the signing algorithm's key-size requirement
    #[error("secret length ({actual} bytes) is below the HMAC-SHA256 minimum ({minimum} bytes)")]
    TooShort { actual: usize, minimum: usize },

    /// Secret contains a weak/common filler value
    #[error("secret contains weak pattern: '{pattern}'")]
    WeakPattern { pattern: &'static str },
}

/// A validated process-wide symmetric signing secret.
///
/// Construction is the only place validation happens; once built, the key
/// material never changes. `Debug` output is redacted.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    /// Validate and wrap a secret.
    pub fn new(secret: impl Into<String>) -> Result<Self, SecretError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LEN {
            return Err(SecretError::TooShort {
                actual: secret.len(),
                minimum: MIN_SECRET_LEN,
            });
        }

        if let Some(pattern) = find_weak_pattern(&secret) {
            return Err(SecretError::WeakPattern { pattern });
        }

        Ok(Self(secret))
    }

    /// Generate a cryptographically secure random secret.
    ///
    /// Lengths below [`MIN_SECRET_LEN`] are rounded up so the result always
    /// passes validation.
    pub fn generate(length: usize) -> Self {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()_+-=[]{}|;:,.<>?/~";

        let length = length.max(MIN_SECRET_LEN);
        let mut rng = rand::thread_rng();
        let secret: String = (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        Self(secret)
    }

    /// Key material for signing and verification.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
    }
}

/// Check for weak filler values in the secret.
fn find_weak_pattern(secret: &str) -> Option<&'static str> {
    const WEAK_PATTERNS: &[&str] = &[
        "secret", "password", "changeme", "default", "example",
        "letmein", "qwerty", "123456",
    ];

    let secret_lower = secret.to_lowercase();
    WEAK_PATTERNS
        .iter()
        .find(|pattern| secret_lower.contains(*pattern))
        .copied()
}
