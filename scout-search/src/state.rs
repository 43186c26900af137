//! Mutable state shared by concurrent searches.
//!
//! [`SharedState`] is a cheap `Arc` handle; clone it into every search that
//! should share the cache, rate-limit windows, and circuit health.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::cache::ResultCache;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::rate_limit::RateLimiter;
use crate::types::{SourceDescriptor, SourceId};

#[derive(Debug)]
struct Inner {
    cache: ResultCache,
    rate_limiter: RateLimiter,
    breaker: Mutex<CircuitBreaker>,
    unconfigured_logged: Mutex<HashSet<SourceId>>,
}

/// Cache, rate-limit counters, circuit breaker, and log-once bookkeeping.
#[derive(Debug, Clone)]
pub struct SharedState {
    inner: Arc<Inner>,
}

impl SharedState {
    /// Create state sized from the search configuration.
    pub fn new(config: &SearchConfig) -> Self {
        Self::with_breaker_config(config, CircuitBreakerConfig::default())
    }

    /// Create state with a custom circuit breaker configuration.
    pub fn with_breaker_config(config: &SearchConfig, breaker: CircuitBreakerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                cache: ResultCache::new(config.cache_ttl_seconds),
                rate_limiter: RateLimiter::new(),
                breaker: Mutex::new(CircuitBreaker::new(breaker)),
                unconfigured_logged: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// The report cache.
    pub fn cache(&self) -> &ResultCache {
        &self.inner.cache
    }

    /// The rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.rate_limiter
    }

    /// Whether the provider's circuit allows a call.
    pub fn circuit_allows(&self, source: &SourceId) -> bool {
        self.inner
            .breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .should_attempt(source)
    }

    /// Current circuit state of a provider.
    pub fn circuit_state(&self, source: &SourceId) -> CircuitState {
        self.inner
            .breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state(source)
    }

    /// Feed a call result into the circuit breaker, and log unconfigured
    /// providers once per state lifetime.
    pub fn record_call<T>(&self, descriptor: &SourceDescriptor, result: &Result<T, ProviderError>) {
        let mut breaker = self
            .inner
            .breaker
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(_) => breaker.record_success(&descriptor.id),
            Err(e) if e.counts_as_failure() => breaker.record_failure(&descriptor.id),
            Err(e) => {
                drop(breaker);
                if self.first_unconfigured(&descriptor.id) {
                    tracing::info!(provider = %descriptor.id, reason = %e, "provider not configured, skipping");
                }
            }
        }
    }

    /// Returns `true` the first time it is called for a source.
    fn first_unconfigured(&self, source: &SourceId) -> bool {
        self.inner
            .unconfigured_logged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source.clone())
    }
}
