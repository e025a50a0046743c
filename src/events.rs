//! Security Event Logging
//!
//! Structured logging for security-relevant events as required by
//! NIST SP 800-53 AU-2 (Audit Events) and AU-3 (Content of Audit Records).
//!
//! Every state change in the authentication core (attempt recorded, tracker
//! reset, alert dispatched, token issued or rejected) is logged through the
//! [`security_event!`] macro so audit pipelines can filter on the
//! `security_event`, `category`, and `severity` fields.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::events::SecurityEvent;
//!
//! portcullis::security_event!(
//!     SecurityEvent::AuthenticationFailure,
//!     identifier = %email,
//!     failed_count = count,
//!     "Authentication failed"
//! );
//! ```

use std::fmt;

/// Security event categories for audit logging.
///
/// Scoped to the events this core can emit. Application-specific events
/// (registration, password resets, etc.) belong to the embedding
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    // Authentication events
    /// Successful credential verification
    AuthenticationSuccess,
    /// Failed authentication attempt
    AuthenticationFailure,
    /// Attempt-tracker state cleared for an identifier
    TrackerReset,

    // Brute-force / alerting events
    /// Failure count reached the alert threshold
    BruteForceDetected,
    /// Login alert handed to the notifier
    LoginAlertSent,
    /// Notifier failed to deliver a login alert
    LoginAlertFailed,

    // Token events
    /// Session token issued
    TokenIssued,
    /// Token failed signature, expiration, or structural checks
    TokenRejected,
}

impl SecurityEvent {
    /// Get the event category for filtering/grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess
            | Self::AuthenticationFailure
            | Self::TrackerReset => "authentication",

            Self::BruteForceDetected
            | Self::LoginAlertSent
            | Self::LoginAlertFailed => "security",

            Self::TokenIssued | Self::TokenRejected => "token",
        }
    }

    /// Get the severity level for the event
    pub fn severity(&self) -> Severity {
        match self {
            // Critical - immediate attention required
            Self::BruteForceDetected => Severity::Critical,

            // High - security-relevant failures
            Self::AuthenticationFailure
            | Self::LoginAlertSent
            | Self::LoginAlertFailed
            | Self::TokenRejected => Severity::High,

            // Medium - important state changes
            Self::AuthenticationSuccess => Severity::Medium,

            // Low - routine operations
            Self::TrackerReset | Self::TokenIssued => Severity::Low,
        }
    }

    /// Get the event name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::TrackerReset => "tracker_reset",
            Self::BruteForceDetected => "brute_force_detected",
            Self::LoginAlertSent => "login_alert_sent",
            Self::LoginAlertFailed => "login_alert_failed",
            Self::TokenIssued => "token_issued",
            Self::TokenRejected => "token_rejected",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
    /// Immediate attention required
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Log a security event with structured fields.
///
/// Automatically stamps every record with:
/// - `security_event`: Event type name
/// - `category`: Event category
/// - `severity`: Event severity level
///
/// and routes to the `tracing` level matching the severity.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let severity = event.severity();
        let category = event.category();
        let event_name = event.name();

        match severity {
            $crate::events::Severity::Critical => {
                ::tracing::error!(
                    security_event = event_name,
                    category = category,
                    severity = "critical",
                    $($field)*
                );
            }
            $crate::events::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::events::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::events::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}

pub use security_event;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_categories() {
        assert_eq!(SecurityEvent::AuthenticationFailure.category(), "authentication");
        assert_eq!(SecurityEvent::BruteForceDetected.category(), "security");
        assert_eq!(SecurityEvent::TokenIssued.category(), "token");
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(SecurityEvent::BruteForceDetected.severity(), Severity::Critical);
        assert_eq!(SecurityEvent::AuthenticationFailure.severity(), Severity::High);
        assert_eq!(SecurityEvent::AuthenticationSuccess.severity(), Severity::Medium);
        assert_eq!(SecurityEvent::TrackerReset.severity(), Severity::Low);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_event_name() {
        assert_eq!(SecurityEvent::LoginAlertSent.name(), "login_alert_sent");
        assert_eq!(SecurityEvent::TokenRejected.name(), "token_rejected");
    }
}
