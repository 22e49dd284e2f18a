//! Per-provider call accounting.
//!
//! Counters are run-scoped state owned by the pipeline, not ambient
//! singletons, so concurrent runs (and tests) stay independent.

use super::Provider;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Outcome of asking for one provider call slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryAcquire {
    /// Call permitted; the counter was incremented
    Granted,
    /// Limit reached and this is the first denial for the provider,
    /// worth one warning
    ExhaustedFirst,
    /// Limit reached, already warned
    Exhausted,
}

/// Race-free per-provider call counters with a shared per-run limit
pub struct QuotaTracker {
    limit: usize,
    calls: [AtomicUsize; 3],
    warned: [AtomicBool; 3],
}

impl QuotaTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: Default::default(),
            warned: Default::default(),
        }
    }

    /// The configured per-provider limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Attempt to reserve one call for the provider.
    ///
    /// Atomic check-and-increment: at most `limit` calls are ever
    /// granted per provider, no matter how many threads race here.
    pub fn try_acquire(&self, provider: Provider) -> TryAcquire {
        let counter = &self.calls[provider.index()];
        let granted = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                if count < self.limit {
                    Some(count + 1)
                } else {
                    None
                }
            })
            .is_ok();

        if granted {
            TryAcquire::Granted
        } else if !self.warned[provider.index()].swap(true, Ordering::SeqCst) {
            TryAcquire::ExhaustedFirst
        } else {
            TryAcquire::Exhausted
        }
    }

    /// Calls recorded for the provider so far
    pub fn calls(&self, provider: Provider) -> usize {
        self.calls[provider.index()].load(Ordering::SeqCst)
    }
}
