//! Hub counters.
//!
//! Plain atomics, exported as JSON by the `/metrics` endpoint.

use crate::domain::DeliveryOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hub metrics
#[derive(Debug, Default)]
pub struct HubMetrics {
    // Verification counters
    pub verifications_succeeded: AtomicU64,
    pub verifications_failed: AtomicU64,
    pub subscriptions_added: AtomicU64,
    pub subscriptions_removed: AtomicU64,

    // Publish counters
    pub publishes_total: AtomicU64,
    pub publishes_empty: AtomicU64,

    // Delivery counters
    pub deliveries_succeeded: AtomicU64,
    pub deliveries_rejected: AtomicU64,
    pub deliveries_failed: AtomicU64,
    pub deliveries_timed_out: AtomicU64,
    pub bytes_delivered: AtomicU64,
}

impl HubMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful handshake
    pub fn record_verification_success(&self, added: bool) {
        self.verifications_succeeded.fetch_add(1, Ordering::Relaxed);
        if added {
            self.subscriptions_added.fetch_add(1, Ordering::Relaxed);
        } else {
            self.subscriptions_removed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a failed handshake
    pub fn record_verification_failure(&self) {
        self.verifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a publish call; `subscribers` is the snapshot size
    pub fn record_publish(&self, subscribers: usize) {
        self.publishes_total.fetch_add(1, Ordering::Relaxed);
        if subscribers == 0 {
            self.publishes_empty.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a single delivery outcome
    pub fn record_delivery(&self, outcome: &DeliveryOutcome, payload_len: usize) {
        let counter = match outcome {
            DeliveryOutcome::Delivered { .. } => {
                self.bytes_delivered
                    .fetch_add(payload_len as u64, Ordering::Relaxed);
                &self.deliveries_succeeded
            }
            DeliveryOutcome::Rejected { .. } => &self.deliveries_rejected,
            DeliveryOutcome::Failed { .. } => &self.deliveries_failed,
            DeliveryOutcome::TimedOut => &self.deliveries_timed_out,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Export all counters as JSON
    pub fn to_json(&self) -> serde_json::Value {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        serde_json::json!({
            "verifications": {
                "succeeded": load(&self.verifications_succeeded),
                "failed": load(&self.verifications_failed),
                "subscriptions_added": load(&self.subscriptions_added),
                "subscriptions_removed": load(&self.subscriptions_removed),
            },
            "publishes": {
                "total": load(&self.publishes_total),
                "empty": load(&self.publishes_empty),
            },
            "deliveries": {
                "succeeded": load(&self.deliveries_succeeded),
                "rejected": load(&self.deliveries_rejected),
                "failed": load(&self.deliveries_failed),
                "timed_out": load(&self.deliveries_timed_out),
                "bytes": load(&self.bytes_delivered),
            },
        })
    }
}
