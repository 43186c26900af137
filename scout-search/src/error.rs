//! Error types for the scout-search crate.
//!
//! Two families live here. [`SearchError`] is what a caller can see: it is
//! only raised for contract violations in the input or configuration.
//! [`ProviderError`] is what a single source lookup reports; the orchestrator
//! records it per source and never lets it escape.

use serde::{Deserialize, Serialize};

/// Errors surfaced to the caller of a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search context is missing a mandatory field (company or job title).
    #[error("invalid search context: {0}")]
    InvalidContext(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A keyword or company table could not be parsed.
    #[error("table error: {0}")]
    Table(String),
}

/// Errors a single provider call can report.
///
/// The variants are distinguishable so the orchestrator can decide whether a
/// provider should be retried later, skipped, or counted against its circuit.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Provider is not configured (missing credentials, disabled upstream).
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Provider refused the request because of rate limiting or bot detection.
    #[error("provider rate limited: {0}")]
    RateLimited(String),

    /// Provider did not answer within its sub-timeout.
    #[error("provider timed out: {0}")]
    Timeout(String),

    /// Network or parse failure that may succeed on a later search.
    #[error("provider transient error: {0}")]
    Transient(String),
}

impl ProviderError {
    /// Returns the serialisable kind of this error, for diagnostics.
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::Unavailable(_) => ProviderErrorKind::Unavailable,
            Self::RateLimited(_) => ProviderErrorKind::RateLimited,
            Self::Timeout(_) => ProviderErrorKind::Timeout,
            Self::Transient(_) => ProviderErrorKind::Transient,
        }
    }

    /// Whether this error should count against the provider's circuit.
    ///
    /// An unconfigured provider is not unhealthy, it is simply absent.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// Data-only mirror of [`ProviderError`] used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// See [`ProviderError::Unavailable`].
    Unavailable,
    /// See [`ProviderError::RateLimited`].
    RateLimited,
    /// See [`ProviderError::Timeout`].
    Timeout,
    /// See [`ProviderError::Transient`].
    Transient,
}

/// Convenience type alias for scout-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_context() {
        let err = SearchError::InvalidContext("company must not be empty".into());
        assert_eq!(
            err.to_string(),
            "invalid search context: company must not be empty"
        );
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("budget_ms must be greater than 0".into());
        assert_eq!(err.to_string(), "config error: budget_ms must be greater than 0");
    }

    #[test]
    fn display_provider_errors() {
        assert_eq!(
            ProviderError::Unavailable("no API key".into()).to_string(),
            "provider unavailable: no API key"
        );
        assert_eq!(
            ProviderError::RateLimited("HTTP 429".into()).to_string(),
            "provider rate limited: HTTP 429"
        );
        assert_eq!(
            ProviderError::Timeout("5s".into()).to_string(),
            "provider timed out: 5s"
        );
        assert_eq!(
            ProviderError::Transient("connection reset".into()).to_string(),
            "provider transient error: connection reset"
        );
    }

    #[test]
    fn kinds_map_one_to_one() {
        assert_eq!(
            ProviderError::Unavailable(String::new()).kind(),
            ProviderErrorKind::Unavailable
        );
        assert_eq!(
            ProviderError::RateLimited(String::new()).kind(),
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            ProviderError::Timeout(String::new()).kind(),
            ProviderErrorKind::Timeout
        );
        assert_eq!(
            ProviderError::Transient(String::new()).kind(),
            ProviderErrorKind::Transient
        );
    }

    #[test]
    fn unavailable_does_not_count_as_failure() {
        assert!(!ProviderError::Unavailable("x".into()).counts_as_failure());
        assert!(ProviderError::Timeout("x".into()).counts_as_failure());
        assert!(ProviderError::RateLimited("x".into()).counts_as_failure());
    }

    #[test]
    fn kind_serialises_snake_case() {
        let json = serde_json::to_string(&ProviderErrorKind::RateLimited).expect("serialize");
        assert_eq!(json, "\"rate_limited\"");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
        assert_send_sync::<ProviderError>();
    }
}
