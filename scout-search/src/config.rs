//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls the wall-clock budget, per-provider timeouts,
//! the sufficiency threshold that gates the metered tier, caching, and
//! request behaviour. The defaults are tuned for an interactive request.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SearchError;

/// Configuration for one search.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Deserialises from TOML with every
/// field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Global wall-clock budget for the whole orchestration, in milliseconds.
    pub budget_ms: u64,
    /// Sub-timeout for a single provider call, in milliseconds.
    pub provider_timeout_ms: u64,
    /// Validated, deduplicated people needed to skip the metered tier.
    pub sufficiency_threshold: usize,
    /// Fraction of the budget after which enrichment is skipped entirely.
    pub enrichment_soft_fraction: f64,
    /// Secondary deadline for enrichment, in milliseconds.
    pub enrichment_timeout_ms: u64,
    /// Maximum number of people returned after ranking.
    pub max_results: usize,
    /// Maximum number of candidates requested from each provider.
    pub max_results_per_provider: usize,
    /// How long to cache reports in seconds. Set to 0 to disable caching.
    pub cache_ttl_seconds: u64,
    /// Random delay range in milliseconds `(min, max)` between HTTP requests
    /// issued by one provider.
    pub request_delay_ms: (u64, u64),
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget_ms: 8_000,
            provider_timeout_ms: 5_000,
            sufficiency_threshold: 10,
            enrichment_soft_fraction: 0.8,
            enrichment_timeout_ms: 1_000,
            max_results: 50,
            max_results_per_provider: 25,
            cache_ttl_seconds: 600,
            request_delay_ms: (100, 500),
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `budget_ms`, `provider_timeout_ms` and `max_results` must be greater than 0
    /// - `max_results_per_provider` must be greater than 0
    /// - `enrichment_soft_fraction` must be in `(0, 1]`
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.budget_ms == 0 {
            return Err(SearchError::Config(
                "budget_ms must be greater than 0".into(),
            ));
        }
        if self.provider_timeout_ms == 0 {
            return Err(SearchError::Config(
                "provider_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.max_results == 0 {
            return Err(SearchError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.max_results_per_provider == 0 {
            return Err(SearchError::Config(
                "max_results_per_provider must be greater than 0".into(),
            ));
        }
        if !(self.enrichment_soft_fraction > 0.0 && self.enrichment_soft_fraction <= 1.0) {
            return Err(SearchError::Config(
                "enrichment_soft_fraction must be in (0, 1]".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        Ok(())
    }

    /// Global budget as a [`Duration`].
    pub fn budget(&self) -> Duration {
        Duration::from_millis(self.budget_ms)
    }

    /// Per-provider sub-timeout as a [`Duration`].
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    /// Enrichment secondary deadline as a [`Duration`].
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }

    /// Elapsed time after which enrichment is skipped.
    pub fn enrichment_cutoff(&self) -> Duration {
        self.budget().mul_f64(self.enrichment_soft_fraction)
    }
}
