//! Per-provider failure accounting.
//!
//! Counters are atomics; the last-failure mark sits behind a mutex that is
//! only ever held for a copy, never across a network call.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{ErrorKind, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FailureMark {
    kind: ErrorKind,
    at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ProviderHealth {
    failures: AtomicU32,
    last_failure: Mutex<Option<FailureMark>>,
}

/// Read-only view of one provider's health.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub failure_count: u32,
    pub healthy: bool,
    pub last_error: Option<ErrorKind>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

pub struct HealthTracker {
    entries: Vec<ProviderHealth>,
    threshold: u32,
    recovery_after: Option<Duration>,
}

impl HealthTracker {
    /// `threshold` is exclusive: a provider is unhealthy once its count exceeds it.
    pub fn new(providers: usize, threshold: u32) -> Self {
        Self {
            entries: (0..providers).map(|_| ProviderHealth::default()).collect(),
            threshold,
            recovery_after: None,
        }
    }

    /// Let unhealthy providers back in once their last failure is this old.
    pub fn with_recovery(mut self, window: Option<Duration>) -> Self {
        self.recovery_after = window;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn record_success(&self, index: usize) {
        let Some(entry) = self.entries.get(index) else {
            return;
        };
        entry.failures.store(0, Ordering::Relaxed);
        if let Ok(mut mark) = entry.last_failure.lock() {
            *mark = None;
        }
    }

    /// Charge `severity` against the provider and remember `kind` as its last error.
    pub fn record_failure(&self, index: usize, severity: Severity, kind: ErrorKind) {
        let Some(entry) = self.entries.get(index) else {
            return;
        };
        let weight = severity.weight();
        let _ = entry
            .failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_add(weight))
            });
        if let Ok(mut mark) = entry.last_failure.lock() {
            *mark = Some(FailureMark {
                kind,
                at: Utc::now(),
            });
        }
    }

    pub fn failure_count(&self, index: usize) -> u32 {
        self.entries
            .get(index)
            .map(|entry| entry.failures.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn last_error(&self, index: usize) -> Option<ErrorKind> {
        self.last_mark(index).map(|mark| mark.kind)
    }

    pub fn is_healthy(&self, index: usize) -> bool {
        self.is_healthy_at(index, Utc::now())
    }

    pub fn is_healthy_at(&self, index: usize, now: DateTime<Utc>) -> bool {
        if self.failure_count(index) <= self.threshold {
            return true;
        }
        let (Some(window), Some(mark)) = (self.recovery_after, self.last_mark(index)) else {
            return false;
        };
        match chrono::Duration::from_std(window) {
            Ok(window) => now - mark.at >= window,
            Err(_) => false,
        }
    }

    pub fn snapshot(&self, index: usize) -> HealthSnapshot {
        let mark = self.last_mark(index);
        HealthSnapshot {
            failure_count: self.failure_count(index),
            healthy: self.is_healthy(index),
            last_error: mark.map(|m| m.kind),
            last_failure_at: mark.map(|m| m.at),
        }
    }

    fn last_mark(&self, index: usize) -> Option<FailureMark> {
        let entry = self.entries.get(index)?;
        let mark = entry.last_failure.lock().ok()?;
        *mark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_accumulate_per_kind() {
        let tracker = HealthTracker::new(1, 4);
        tracker.record_failure(0, ErrorKind::RateLimited.severity(), ErrorKind::RateLimited);
        assert_eq!(tracker.failure_count(0), 1);
        tracker.record_failure(0, ErrorKind::Quota.severity(), ErrorKind::Quota);
        assert_eq!(tracker.failure_count(0), 4);
        assert!(tracker.is_healthy(0));
        tracker.record_failure(0, ErrorKind::Network.severity(), ErrorKind::Network);
        assert_eq!(tracker.failure_count(0), 5);
        assert!(!tracker.is_healthy(0));
        assert_eq!(tracker.last_error(0), Some(ErrorKind::Network));
    }

    #[test]
    fn test_single_auth_failure_exiles_provider() {
        let tracker = HealthTracker::new(2, 4);
        tracker.record_failure(0, ErrorKind::Auth.severity(), ErrorKind::Auth);
        assert!(!tracker.is_healthy(0));
        assert!(tracker.is_healthy(1));
    }

    #[test]
    fn test_success_resets_counter_and_error() {
        let tracker = HealthTracker::new(1, 4);
        for _ in 0..6 {
            tracker.record_failure(0, ErrorKind::RateLimited.severity(), ErrorKind::RateLimited);
        }
        assert!(!tracker.is_healthy(0));
        tracker.record_success(0);
        assert_eq!(tracker.failure_count(0), 0);
        assert_eq!(tracker.last_error(0), None);
        assert!(tracker.is_healthy(0));
    }

    #[test]
    fn test_counter_saturates() {
        let tracker = HealthTracker::new(1, 4);
        tracker.entries[0].failures.store(u32::MAX - 2, Ordering::Relaxed);
        tracker.record_failure(0, ErrorKind::Auth.severity(), ErrorKind::Auth);
        assert_eq!(tracker.failure_count(0), u32::MAX);
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let tracker = HealthTracker::new(1, 4);
        tracker.record_failure(7, ErrorKind::Auth.severity(), ErrorKind::Auth);
        assert_eq!(tracker.failure_count(7), 0);
        assert!(tracker.is_healthy(7));
    }

    #[test]
    fn test_no_recovery_without_window() {
        let tracker = HealthTracker::new(1, 4);
        tracker.record_failure(0, ErrorKind::Auth.severity(), ErrorKind::Auth);
        let later = Utc::now() + chrono::Duration::days(30);
        assert!(!tracker.is_healthy_at(0, later));
    }

    #[test]
    fn test_recovery_window_reopens_provider() {
        let tracker = HealthTracker::new(1, 4).with_recovery(Some(Duration::from_secs(60)));
        tracker.record_failure(0, ErrorKind::Auth.severity(), ErrorKind::Auth);
        assert!(!tracker.is_healthy_at(0, Utc::now()));
        let later = Utc::now() + chrono::Duration::seconds(61);
        assert!(tracker.is_healthy_at(0, later));
        assert_eq!(tracker.failure_count(0), 5);
    }

    #[test]
    fn test_generic_severity_keeps_real_kind() {
        let tracker = HealthTracker::new(1, 4);
        tracker.record_failure(0, Severity::Generic, ErrorKind::Auth);
        assert_eq!(tracker.failure_count(0), 1);
        assert_eq!(tracker.last_error(0), Some(ErrorKind::Auth));
    }

    #[test]
    fn test_snapshot() {
        let tracker = HealthTracker::new(1, 4);
        tracker.record_failure(0, ErrorKind::Quota.severity(), ErrorKind::Quota);
        let snap = tracker.snapshot(0);
        assert_eq!(snap.failure_count, 3);
        assert!(snap.healthy);
        assert_eq!(snap.last_error, Some(ErrorKind::Quota));
        assert!(snap.last_failure_at.is_some());
    }
}
