//! Thread-safe accounting for pull/push/delete operations.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use grafanactl_resource::ResourceRef;

/// A single recorded failure. `resource` is `None` for batch-level
/// failures (e.g. listing an entire kind failed outright).
#[derive(Debug, Clone)]
pub struct OperationFailure {
    pub resource: Option<ResourceRef>,
    pub error: String,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource {
            Some(r) => write!(f, "{r}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Atomic success/failure counters plus a mutex-guarded failure list,
/// safe to share across concurrently spawned workers.
#[derive(Default)]
pub struct OperationSummary {
    success: AtomicU64,
    failed: AtomicU64,
    failures: Mutex<Vec<OperationFailure>>,
}

impl OperationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, resource: Option<ResourceRef>, error: impl fmt::Display) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.failures.lock().expect("summary mutex poisoned").push(OperationFailure {
            resource,
            error: error.to_string(),
        });
    }

    pub fn success_count(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> Vec<OperationFailure> {
        self.failures.lock().expect("summary mutex poisoned").clone()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn concurrent_recording_keeps_counts_consistent() {
        let summary = Arc::new(OperationSummary::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let summary = summary.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    summary.record_success();
                } else {
                    summary.record_failure(None, "boom");
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(summary.success_count() + summary.failed_count(), 50);
        assert_eq!(summary.failures().len() as u64, summary.failed_count());
    }

    #[test]
    fn is_success_reflects_failure_count() {
        let summary = OperationSummary::new();
        assert!(summary.is_success());
        summary.record_failure(None, "nope");
        assert!(!summary.is_success());
    }
}
