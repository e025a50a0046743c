//! Per-Request Authentication Context
//!
//! Stateless accessors over the authentication context the surrounding
//! transport layer establishes for each request (typically from a validated
//! session token).
//!
//! # Design Philosophy
//!
//! No ambient state. The context is an explicit value passed down the call
//! chain; a request that never authenticated simply has `None`. This keeps
//! the "who is the current caller" query testable and free of thread-local
//! surprises, while the contract stays the same: asking for the caller
//! without an established context is a programming error, fatal to the
//! request.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::context::{self, AuthContext};
//!
//! let ctx = AuthContext::new(claims.sub, claims.authorities);
//!
//! let who = context::current_identifier(Some(&ctx))?;
//! let role = context::current_role(Some(&ctx))?;
//! ```

use thiserror::Error;

/// Error type for session-accessor misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No authentication context was established for this request
    #[error("no authentication context established for this request")]
    NoAuthenticationContext,

    /// The context carries an empty authority list
    #[error("role not found")]
    RoleNotFound,
}

/// The per-request authentication context.
///
/// Populated by the transport layer after token validation; read-only from
/// the core's perspective.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    /// Subject identifier of the authenticated caller
    pub subject: String,
    /// Granted authorities, primary role first
    pub authorities: Vec<String>,
}

impl AuthContext {
    pub fn new(subject: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            authorities,
        }
    }
}

/// Identifier of the currently authenticated caller.
pub fn current_identifier(ctx: Option<&AuthContext>) -> Result<&str, ContextError> {
    let ctx = ctx.ok_or(ContextError::NoAuthenticationContext)?;
    Ok(&ctx.subject)
}

/// Primary role of the currently authenticated caller: the first entry of
/// the authority list.
pub fn current_role(ctx: Option<&AuthContext>) -> Result<&str, ContextError> {
    let ctx = ctx.ok_or(ContextError::NoAuthenticationContext)?;
    ctx.authorities
        .first()
        .map(String::as_str)
        .ok_or(ContextError::RoleNotFound)
}
