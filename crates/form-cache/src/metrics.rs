//! Counters for form cache activity
//!
//! Thread-safe so a [`SharedFormCache`](crate::adapters::SharedFormCache) can
//! record outcomes after releasing its lock.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Form cache counters
#[derive(Debug, Default)]
pub struct FormCacheMetrics {
    /// Request packets sent for newly displayed forms
    pub displayed: AtomicU64,
    /// Request packets sent again for already pending forms
    pub resent: AtomicU64,
    /// Replies delivered to a listener
    pub resolved: AtomicU64,
    /// Replies with no pending form
    pub unmatched: AtomicU64,
    /// Replies for a pending form without listener
    pub missing_listener: AtomicU64,
    /// Listeners dropped unfired because their id was displayed again
    pub abandoned_listeners: AtomicU64,
    /// Replies that failed to parse
    pub malformed: AtomicU64,
    /// Forms removed without a reply (orphan eviction, discard)
    pub evicted: AtomicU64,
}

impl FormCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            displayed: self.displayed.load(Ordering::Relaxed),
            resent: self.resent.load(Ordering::Relaxed),
            resolved: self.resolved.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            missing_listener: self.missing_listener.load(Ordering::Relaxed),
            abandoned_listeners: self.abandoned_listeners.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`FormCacheMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub displayed: u64,
    pub resent: u64,
    pub resolved: u64,
    pub unmatched: u64,
    pub missing_listener: u64,
    pub abandoned_listeners: u64,
    pub malformed: u64,
    pub evicted: u64,
}

impl MetricsSnapshot {
    /// Replies received, whatever their outcome
    pub fn replies(&self) -> u64 {
        self.resolved + self.unmatched + self.missing_listener + self.malformed
    }
}
