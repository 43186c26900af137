//! Per-provider fixed-window call counters.
//!
//! Counters are plain atomics so concurrent searches sharing one
//! [`RateLimiter`] never block each other on the hot path; the map lock is
//! only held to find or create a provider's counter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::Instant;

use crate::types::{RateLimit, SourceDescriptor, SourceId};

/// One provider's fixed window.
///
/// The window index (low 32 bits) and the calls taken in it share one word,
/// so moving to a new window and taking its first call is a single update.
#[derive(Debug)]
struct WindowCounter {
    max_calls: u32,
    window_ms: u64,
    state: AtomicU64,
}

fn pack(window: u32, count: u32) -> u64 {
    (u64::from(window) << 32) | u64::from(count)
}

fn unpack(state: u64) -> (u32, u32) {
    ((state >> 32) as u32, state as u32)
}

impl WindowCounter {
    fn new(limit: RateLimit) -> Self {
        Self {
            max_calls: limit.max_calls,
            window_ms: u64::try_from(limit.window.as_millis()).unwrap_or(u64::MAX).max(1),
            state: AtomicU64::new(0),
        }
    }

    fn try_acquire(&self, now_ms: u64) -> bool {
        let index = (now_ms / self.window_ms) as u32;
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                let (window, count) = unpack(state);
                // Wrapping distance keeps a late caller from reopening an old window.
                if (index.wrapping_sub(window) as i32) > 0 {
                    (self.max_calls > 0).then(|| pack(index, 1))
                } else {
                    (count < self.max_calls).then(|| pack(window, count + 1))
                }
            })
            .is_ok()
    }

    fn used(&self) -> u32 {
        unpack(self.state.load(Ordering::Acquire)).1
    }
}

/// Fixed-window rate limiter keyed by provider.
#[derive(Debug)]
pub struct RateLimiter {
    epoch: Instant,
    counters: Mutex<HashMap<SourceId, Arc<WindowCounter>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Create a limiter whose windows start now.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Take one call from the provider's window.
    ///
    /// Returns `false` when the window is exhausted. Providers without a
    /// declared rate limit are always allowed.
    pub fn try_acquire(&self, descriptor: &SourceDescriptor) -> bool {
        let Some(limit) = descriptor.rate_limit else {
            return true;
        };
        let counter = {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                counters
                    .entry(descriptor.id.clone())
                    .or_insert_with(|| Arc::new(WindowCounter::new(limit))),
            )
        };
        let now_ms = u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
        counter.try_acquire(now_ms)
    }

    /// Calls taken in the provider's current window (0 if never called).
    pub fn used(&self, source: &SourceId) -> u32 {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(source)
            .map_or(0, |c| c.used())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CostTier;
    use std::time::Duration;

    fn limited(max_calls: u32, window: Duration) -> SourceDescriptor {
        SourceDescriptor::new("limited", CostTier::Free, 0.5).with_rate_limit(max_calls, window)
    }

    #[tokio::test(start_paused = true)]
    async fn window_caps_calls() {
        let limiter = RateLimiter::new();
        let d = limited(2, Duration::from_secs(60));
        assert!(limiter.try_acquire(&d));
        assert!(limiter.try_acquire(&d));
        assert!(!limiter.try_acquire(&d));
        assert_eq!(limiter.used(&d.id), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn next_window_resets() {
        let limiter = RateLimiter::new();
        let d = limited(1, Duration::from_secs(10));
        assert!(limiter.try_acquire(&d));
        assert!(!limiter.try_acquire(&d));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.try_acquire(&d));
    }

    #[test]
    fn unlimited_provider_always_allowed() {
        let limiter = RateLimiter::new();
        let d = SourceDescriptor::new("free", CostTier::Free, 0.5);
        for _ in 0..1000 {
            assert!(limiter.try_acquire(&d));
        }
        assert_eq!(limiter.used(&d.id), 0);
    }

    #[test]
    fn concurrent_acquires_never_exceed_limit() {
        let limiter = Arc::new(RateLimiter::new());
        let d = limited(50, Duration::from_secs(3600));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let d = d.clone();
                std::thread::spawn(move || (0..20).filter(|_| limiter.try_acquire(&d)).count())
            })
            .collect();
        let granted: usize = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .sum();
        assert_eq!(granted, 50);
    }

    #[test]
    fn concurrent_window_rollover_grants_one_fresh_window() {
        let counter = Arc::new(WindowCounter::new(RateLimit {
            max_calls: 10,
            window: Duration::from_millis(100),
        }));
        for _ in 0..10 {
            assert!(counter.try_acquire(50));
        }
        assert!(!counter.try_acquire(99));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || (0..10).filter(|_| counter.try_acquire(150)).count())
            })
            .collect();
        let granted: usize = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .sum();
        assert_eq!(granted, 10);
        assert_eq!(counter.used(), 10);
    }

    #[test]
    fn late_caller_does_not_reopen_previous_window() {
        let counter = WindowCounter::new(RateLimit {
            max_calls: 1,
            window: Duration::from_millis(100),
        });
        assert!(counter.try_acquire(250));
        assert!(!counter.try_acquire(180));
        assert!(!counter.try_acquire(299));
        assert!(counter.try_acquire(300));
    }
}
