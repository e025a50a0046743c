//! # Portcullis
//!
//! Brute-force-aware authentication core: signed session tokens, failed
//! login attempt tracking, and one-shot alerting.
//!
//! Credential storage, user lookup, notification delivery, and the
//! transport layer stay outside — consumed through the traits in
//! [`authn`]. This crate owns the parts with real invariants:
//!
//! - **Token Codec**: HMAC-SHA256 signed, time-bounded session tokens with
//!   a fixed claim set; forged, foreign-algorithm, and expired tokens are
//!   always rejected.
//! - **Attempt Tracker**: process-wide per-identifier failure counters and
//!   an alert-deduplication set, safe under unbounded concurrency.
//! - **Authentication Orchestrator**: reset-before-return on success,
//!   record/alert/re-raise on failure, at most one brute-force alert per
//!   failure streak.
//! - **Session Accessor**: explicit per-request authentication context with
//!   "current caller" and "primary role" queries.
//! - **Security Events**: every state change is logged through
//!   [`security_event!`] with `tracing`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use portcullis::{Authenticator, SigningSecret, TokenCodec};
//!
//! let secret = SigningSecret::new(std::env::var("JWT_SECRET")?)?;
//! let codec = TokenCodec::new(&secret);
//! let authn = Authenticator::new(verifier, directory, notifier);
//!
//! let identity = authn.authenticate(&email, &password)?;
//! let token = codec.issue(&identity, &identity.identifier)?;
//!
//! // later, per request:
//! let subject = codec.extract_subject(&token)?;
//! ```

pub mod authn;
pub mod context;
pub mod events;
pub mod secret;
pub mod token;
pub mod tracker;

// Re-exports
pub use authn::{
    AuthError, Authenticator, CredentialVerifier, Identity, LoginAlertNotifier, NotifyError,
    UserDirectory, DEFAULT_ALERT_THRESHOLD,
};
pub use context::{current_identifier, current_role, AuthContext, ContextError};
pub use events::{SecurityEvent, Severity};
pub use secret::{SecretError, SigningSecret, MIN_SECRET_LEN};
pub use token::{Claims, TokenCodec, TokenError, DEFAULT_VALIDITY_SECS};
pub use tracker::AttemptTracker;
