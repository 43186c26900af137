//! Shared HTTP plumbing for providers: client construction with User-Agent
//! rotation, request jitter, and mapping transport failures onto
//! [`ProviderError`] kinds.

use crate::config::SearchConfig;
use crate::error::ProviderError;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] for provider requests.
///
/// The client has a cookie store, the per-provider sub-timeout from config,
/// gzip/brotli decompression, and either the configured User-Agent or one
/// picked from the rotation list.
///
/// # Errors
///
/// Returns [`ProviderError::Unavailable`] if the client cannot be constructed;
/// a provider without a working client cannot be called at all.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, ProviderError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(config.provider_timeout())
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Random pause within `(min, max)` milliseconds, used between consecutive
/// requests to the same upstream.
pub fn jitter(range_ms: (u64, u64)) -> Duration {
    let (min, max) = range_ms;
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}

/// Map a transport-level failure onto a provider error kind.
pub fn classify_request_error(provider: &str, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(format!("{provider} request timed out"))
    } else {
        ProviderError::Transient(format!("{provider} request failed: {err}"))
    }
}

/// Map a non-success HTTP status onto a provider error kind.
pub fn classify_status(provider: &str, status: StatusCode) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::RateLimited(format!("{provider} returned HTTP 429"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::PAYMENT_REQUIRED => {
            ProviderError::Unavailable(format!("{provider} rejected credentials (HTTP {status})"))
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::Timeout(format!("{provider} returned HTTP {status}"))
        }
        _ => ProviderError::Transient(format!("{provider} returned HTTP {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        assert!(build_client(&SearchConfig::default()).is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = SearchConfig {
            user_agent: Some("ScoutBot/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn jitter_stays_in_range() {
        for _ in 0..50 {
            let d = jitter((100, 200));
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(200));
        }
        assert_eq!(jitter((0, 0)), Duration::ZERO);
    }

    #[test]
    fn status_classification() {
        assert_eq!(
            classify_status("x", StatusCode::TOO_MANY_REQUESTS).kind(),
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            classify_status("x", StatusCode::UNAUTHORIZED).kind(),
            ProviderErrorKind::Unavailable
        );
        assert_eq!(
            classify_status("x", StatusCode::FORBIDDEN).kind(),
            ProviderErrorKind::Unavailable
        );
        assert_eq!(
            classify_status("x", StatusCode::GATEWAY_TIMEOUT).kind(),
            ProviderErrorKind::Timeout
        );
        assert_eq!(
            classify_status("x", StatusCode::INTERNAL_SERVER_ERROR).kind(),
            ProviderErrorKind::Transient
        );
    }
}
