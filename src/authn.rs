//! Authentication Orchestration
//!
//! Coordinates credential verification against the external verifier,
//! failed-attempt bookkeeping, and the one-shot brute-force alert.
//!
//! # Design Philosophy
//!
//! This core does not store credentials, look up users, or deliver
//! notifications. Those concerns stay behind the [`CredentialVerifier`],
//! [`UserDirectory`], and [`LoginAlertNotifier`] traits, implemented by the
//! embedding application (database-backed verifier, LDAP directory, SMTP
//! notifier, ...). The orchestrator owns only the ordering contract:
//!
//! - success: tracker state is cleared *before* success is returned;
//! - failure: the attempt is recorded, the alert side-path may run, and the
//!   original failure is always re-raised. Alerting never converts a failure
//!   into a success, and a notifier error never replaces the authentication
//!   result.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use portcullis::authn::Authenticator;
//!
//! let authn = Authenticator::new(verifier, directory, notifier);
//!
//! match authn.authenticate("user@example.com", password) {
//!     Ok(identity) => {
//!         let token = codec.issue(&identity, &identity.identifier)?;
//!         // hand the token to the client
//!     }
//!     Err(err) => {
//!         // 401; the brute-force side-path already ran
//!     }
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

use crate::events::SecurityEvent;
use crate::tracker::AttemptTracker;

/// Failed-attempt count at which the brute-force alert fires.
pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

/// Error type for authentication failures.
///
/// Deliberately carries no detail: unknown identifier, wrong credential and
/// locked account are indistinguishable to the caller, so responses cannot
/// be used to probe which accounts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credential verification failed
    #[error("authentication failed")]
    AuthenticationFailed,
}

/// Error type for login-alert delivery failures.
///
/// Contained by the orchestrator: logged, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("login alert delivery failed: {0}")]
pub struct NotifyError(pub String);

/// An authenticated principal, owned by the external user directory.
///
/// The core reads it to build token claims and address alerts; it never
/// mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Unique identifier (email), also the token subject and alert address
    pub identifier: String,
    /// Numeric internal id
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Primary role
    pub role: String,
    /// Nationality
    pub nationality: String,
    /// Personal-number string
    pub personal_no: String,
    /// Whether this principal has already cast a vote
    pub has_voted: bool,
    /// Granted authorities, primary role first
    pub authorities: Vec<String>,
}

impl Identity {
    /// Display name used when addressing the principal in alerts.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Credential verification capability (consumed).
///
/// Any failure reason (unknown identifier, wrong credential, locked
/// account) surfaces as [`AuthError::AuthenticationFailed`].
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, identifier: &str, credential: &str) -> Result<(), AuthError>;
}

/// User lookup capability (consumed).
pub trait UserDirectory: Send + Sync {
    fn find_by_identifier(&self, identifier: &str) -> Option<Identity>;
}

/// Outbound login-alert capability (consumed).
///
/// Fire-and-forget from the core's perspective; delivery errors are logged
/// and swallowed by the orchestrator.
pub trait LoginAlertNotifier: Send + Sync {
    fn send_login_alert(&self, address: &str, display_name: &str) -> Result<(), NotifyError>;
}

/// Authentication orchestrator.
///
/// Cloning shares the tracker state and collaborators.
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn CredentialVerifier>,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn LoginAlertNotifier>,
    tracker: AttemptTracker,
    threshold: u32,
}

impl Authenticator {
    /// Create an orchestrator with a fresh tracker and the default alert
    /// threshold.
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn LoginAlertNotifier>,
    ) -> Self {
        Self {
            verifier,
            directory,
            notifier,
            tracker: AttemptTracker::new(),
            threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }

    /// Override the alert threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Share an existing tracker (e.g. one also consulted by admin tooling).
    pub fn with_tracker(mut self, tracker: AttemptTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// The tracker backing this orchestrator.
    pub fn tracker(&self) -> &AttemptTracker {
        &self.tracker
    }

    /// Authenticate an identifier/credential pair.
    ///
    /// On success the identifier's tracker state is cleared and the
    /// directory-backed [`Identity`] is returned for token issuance. On
    /// failure the attempt is recorded, the brute-force alert may fire
    /// (at most once per failure streak), and the failure is re-raised.
    pub fn authenticate(&self, identifier: &str, credential: &str) -> Result<Identity, AuthError> {
        match self.verifier.verify(identifier, credential) {
            Ok(()) => {
                self.tracker.reset(identifier);

                // The verifier and directory disagreeing on an identifier is
                // a collaborator inconsistency; never return a
                // half-authenticated success.
                let identity = self
                    .directory
                    .find_by_identifier(identifier)
                    .ok_or(AuthError::AuthenticationFailed)?;

                crate::security_event!(
                    SecurityEvent::AuthenticationSuccess,
                    identifier = %identifier,
                    "Authentication succeeded"
                );

                Ok(identity)
            }
            Err(err) => {
                let count = self.tracker.record_failure(identifier);

                if self.tracker.should_alert(identifier, self.threshold) {
                    self.dispatch_alert(identifier, count);
                }

                Err(err)
            }
        }
    }

    /// Brute-force alert side-path.
    ///
    /// Strictly subordinate to the authentication result: nothing in here
    /// may mask or replace the original failure. Unknown identifiers are
    /// skipped silently and left unmarked, so a later directory hit within
    /// the same streak can still alert.
    fn dispatch_alert(&self, identifier: &str, count: u32) {
        let Some(user) = self.directory.find_by_identifier(identifier) else {
            return;
        };

        // Insert-if-absent: exactly one concurrent caller proceeds.
        if !self.tracker.claim_alert(identifier, self.threshold) {
            return;
        }

        crate::security_event!(
            SecurityEvent::BruteForceDetected,
            identifier = %identifier,
            failed_count = count,
            threshold = self.threshold,
            "Failure threshold reached, dispatching login alert"
        );

        match self
            .notifier
            .send_login_alert(&user.identifier, &user.display_name())
        {
            Ok(()) => {
                crate::security_event!(
                    SecurityEvent::LoginAlertSent,
                    identifier = %identifier,
                    "Login alert handed to notifier"
                );
            }
            Err(err) => {
                crate::security_event!(
                    SecurityEvent::LoginAlertFailed,
                    identifier = %identifier,
                    error = %err,
                    "Login alert delivery failed"
                );
            }
        }
    }
}
