//! Per-provider circuit breaker.
//!
//! Tracks consecutive failures per source and temporarily skips providers
//! that keep failing. After a cooldown a tripped provider enters a half-open
//! state where the next call decides whether it is restored or re-tripped.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  N failures   ┌────────┐  cooldown   ┌──────────┐
//! │ Closed ├──────────────►│  Open  ├────────────►│ HalfOpen │
//! └───▲────┘               └────────┘             └────┬─────┘
//!     │                         ▲                      │
//!     │  success                │  failure              │
//!     └─────────────────────────┴──────────────────────┘
//! ```
//!
//! Time is read from [`tokio::time::Instant`] so a paused test runtime can
//! drive the cooldown deterministically.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::types::SourceId;

/// Circuit state for a single provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Provider is healthy and calls go through.
    Closed,
    /// Provider failed too often; calls are skipped until the cooldown expires.
    Open,
    /// Cooldown elapsed; the next call is a probe.
    HalfOpen,
}

/// Health tracking data for one provider.
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    /// Current circuit state.
    pub state: CircuitState,
    /// Consecutive failures since the last success.
    pub consecutive_failures: u32,
    /// When the last failure happened.
    pub last_failure_at: Option<Instant>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
        }
    }
}

/// Circuit breaker tuning.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the circuit.
    pub failure_threshold: u32,
    /// Time spent Open before a probe is allowed.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Per-provider circuit breaker. Providers are tracked independently.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    providers: HashMap<SourceId, ProviderHealth>,
}

impl CircuitBreaker {
    /// Create a breaker with the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
        }
    }

    /// Record a successful call: the circuit closes and the failure count resets.
    pub fn record_success(&mut self, source: &SourceId) {
        let health = self.providers.entry(source.clone()).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
    }

    /// Record a failed call. Trips the circuit once the threshold is reached,
    /// and immediately when a half-open probe fails.
    pub fn record_failure(&mut self, source: &SourceId) {
        let health = self.providers.entry(source.clone()).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        health.last_failure_at = Some(Instant::now());

        if health.state == CircuitState::HalfOpen
            || health.consecutive_failures >= self.config.failure_threshold
        {
            health.state = CircuitState::Open;
        }
    }

    /// Whether a call to the provider should be attempted now.
    ///
    /// An Open circuit whose cooldown has elapsed moves to HalfOpen and
    /// allows the call.
    pub fn should_attempt(&mut self, source: &SourceId) -> bool {
        let Some(health) = self.providers.get_mut(source) else {
            return true;
        };

        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooldown_elapsed = health
                    .last_failure_at
                    .is_none_or(|t| t.elapsed() >= self.config.cooldown);
                if cooldown_elapsed {
                    health.state = CircuitState::HalfOpen;
                }
                cooldown_elapsed
            }
        }
    }

    /// Current state for a provider (Closed if never seen).
    pub fn state(&self, source: &SourceId) -> CircuitState {
        self.providers
            .get(source)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// `(source, state, consecutive_failures)` for every tracked provider,
    /// sorted by source id.
    pub fn health_report(&self) -> Vec<(SourceId, CircuitState, u32)> {
        let mut report: Vec<_> = self
            .providers
            .iter()
            .map(|(id, h)| (id.clone(), h.state, h.consecutive_failures))
            .collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        report
    }
}
