//! Failed-Attempt Tracking (AC-7)
//!
//! Per-identifier failed-authentication counters plus the deduplication set
//! that guarantees at most one brute-force alert per failure streak.
//!
//! # Design Philosophy
//!
//! State is process-wide and in-memory by contract: counters are best-effort
//! and do not survive restarts. For distributed deployments, put the same
//! operations in front of Redis or a database; the orchestrator only depends
//! on the operations below.
//!
//! The check-then-mark sequence around alerting is the one spot that needs
//! care under concurrency. [`AttemptTracker::claim_alert`] makes it a single
//! insert-if-absent, so two requests failing at the same instant for the
//! same identifier cannot both win the alert.
//!
//! # Usage
//!
//! ```ignore
//! use portcullis::tracker::AttemptTracker;
//!
//! let tracker = AttemptTracker::new();
//!
//! let count = tracker.record_failure("user@example.com");
//! if tracker.claim_alert("user@example.com", 3) {
//!     // this caller, and only this caller, dispatches the alert
//! }
//!
//! // on successful authentication
//! tracker.reset("user@example.com");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::events::SecurityEvent;

/// In-memory tracker for failed authentication attempts (AC-7).
///
/// Cloning produces another handle to the same shared state.
#[derive(Debug, Default)]
pub struct AttemptTracker {
    counts: Arc<RwLock<HashMap<String, u32>>>,
    alerted: Arc<RwLock<HashSet<String>>>,
}

impl AttemptTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed attempt and return the new count.
    ///
    /// Increments start from 0 for unseen identifiers. The increment happens
    /// under the write lock; concurrent callers never lose updates.
    pub fn record_failure(&self, identifier: &str) -> u32 {
        let count = {
            let mut counts = self.counts.write().unwrap();
            let count = counts.entry(identifier.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        crate::security_event!(
            SecurityEvent::AuthenticationFailure,
            identifier = %identifier,
            failed_count = count,
            "Failed authentication attempt recorded"
        );

        count
    }

    /// Current failed-attempt count for an identifier.
    pub fn failure_count(&self, identifier: &str) -> u32 {
        self.counts
            .read()
            .unwrap()
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    /// Whether an alert is due: count reached `threshold` and no alert has
    /// fired for this identifier since its last success.
    ///
    /// Read-only. Callers that go on to dispatch an alert should use
    /// [`claim_alert`](Self::claim_alert) to make the decision atomic.
    pub fn should_alert(&self, identifier: &str, threshold: u32) -> bool {
        if self.failure_count(identifier) < threshold {
            return false;
        }
        !self.alerted.read().unwrap().contains(identifier)
    }

    /// Mark that an alert has fired for this identifier.
    pub fn mark_alerted(&self, identifier: &str) {
        self.alerted.write().unwrap().insert(identifier.to_string());
    }

    /// Atomically check the threshold and mark the identifier as alerted.
    ///
    /// Returns `true` for exactly one caller per failure streak: the set
    /// insert is the deciding step, so concurrent over-threshold failures
    /// race on a single insert-if-absent rather than on check-then-mark.
    pub fn claim_alert(&self, identifier: &str, threshold: u32) -> bool {
        if self.failure_count(identifier) < threshold {
            return false;
        }
        self.alerted.write().unwrap().insert(identifier.to_string())
    }

    /// Clear all tracked state for an identifier.
    ///
    /// Called once per successful authentication, before success is
    /// returned. Removes both the attempt count and the alert mark, so the
    /// next failure streak can alert again.
    pub fn reset(&self, identifier: &str) {
        self.counts.write().unwrap().remove(identifier);
        self.alerted.write().unwrap().remove(identifier);

        crate::security_event!(
            SecurityEvent::TrackerReset,
            identifier = %identifier,
            "Attempt-tracker state cleared"
        );
    }
}

impl Clone for AttemptTracker {
    fn clone(&self) -> Self {
        Self {
            counts: Arc::clone(&self.counts),
            alerted: Arc::clone(&self.alerted),
        }
    }
}
