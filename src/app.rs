//! Assembles the provider registry and orchestrator from configuration.

use std::sync::Arc;

use scout_search::providers::{ApolloProvider, DuckDuckGoProvider, StaticProvider};
use scout_search::{SearchContext, SearchOrchestrator, SearchReport, SharedState, SourceProvider};

use crate::config::ScoutConfig;
use crate::error::{Result, ScoutError};

/// Providers enabled by `config`, free providers first.
///
/// Apollo is registered even without an API key; its searches then report
/// the provider as unavailable in diagnostics.
///
/// # Errors
///
/// Returns [`ScoutError::Config`] if an HTTP client cannot be built or the
/// fixtures file cannot be loaded.
pub fn build_providers(config: &ScoutConfig) -> Result<Vec<Arc<dyn SourceProvider>>> {
    let settings = &config.providers;
    let mut providers: Vec<Arc<dyn SourceProvider>> = Vec::new();

    if let Some(path) = &settings.fixtures.path {
        let fixtures = StaticProvider::from_json_file(path)
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        tracing::info!(path = %path.display(), records = fixtures.len(), "loaded fixture records");
        providers.push(Arc::new(fixtures));
    }

    if settings.duckduckgo.enabled {
        let ddg =
            DuckDuckGoProvider::new(&config.search).map_err(|e| ScoutError::Config(e.to_string()))?;
        providers.push(Arc::new(ddg));
    }

    if settings.apollo.enabled {
        let mut apollo = ApolloProvider::new(&config.search, settings.apollo.api_key())
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        if let Some(base_url) = &settings.apollo.base_url {
            apollo = apollo.with_base_url(base_url.clone());
        }
        if !apollo.is_configured() {
            tracing::debug!(env = %settings.apollo.api_key_env, "apollo API key not set");
        }
        providers.push(Arc::new(apollo));
    }

    Ok(providers)
}

/// Build an orchestrator with a fresh shared state.
///
/// # Errors
///
/// Returns an error for an invalid configuration, unreadable tables, or a
/// provider that cannot be constructed.
pub fn build_orchestrator(config: &ScoutConfig) -> Result<SearchOrchestrator> {
    config.validate()?;
    let tables = config.tables.load()?;
    let providers = build_providers(config)?;
    let state = SharedState::new(&config.search);
    let orchestrator =
        SearchOrchestrator::new(config.search.clone(), providers, state)?.with_tables(tables);
    tracing::info!(providers = ?orchestrator.provider_ids(), "provider registry assembled");
    Ok(orchestrator)
}

/// Parse a search context from JSON.
///
/// # Errors
///
/// Returns [`ScoutError::Parse`] if the input is not a JSON object of
/// context fields.
pub fn parse_context(input: &str) -> Result<SearchContext> {
    serde_json::from_str(input).map_err(|e| ScoutError::Parse(e.to_string()))
}

/// Run one search for the JSON context in `input`.
///
/// # Errors
///
/// Returns an error for bad input or configuration. Provider failures are
/// reported in the diagnostics instead.
pub async fn run_search(config: &ScoutConfig, input: &str) -> Result<SearchReport> {
    let ctx = parse_context(input)?;
    let orchestrator = build_orchestrator(config)?;
    Ok(orchestrator.search(&ctx).await?)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn offline() -> ScoutConfig {
        let mut config = ScoutConfig::default();
        config.providers.duckduckgo.enabled = false;
        config.providers.apollo.enabled = false;
        config
    }

    fn ids(providers: &[Arc<dyn SourceProvider>]) -> Vec<String> {
        providers
            .iter()
            .map(|p| p.descriptor().id.to_string())
            .collect()
    }

    #[test]
    fn default_registry_is_free_then_metered() {
        let providers = build_providers(&ScoutConfig::default()).unwrap();
        assert_eq!(ids(&providers), ["duckduckgo", "apollo"]);
    }

    #[test]
    fn disabled_providers_are_not_registered() {
        assert!(build_providers(&offline()).unwrap().is_empty());
    }

    #[test]
    fn missing_fixtures_file_is_config_error() {
        let mut config = offline();
        config.providers.fixtures.path = Some("/nonexistent/people.json".into());
        assert!(matches!(
            build_providers(&config),
            Err(ScoutError::Config(_))
        ));
    }

    #[test]
    fn context_requires_json_object() {
        assert!(matches!(parse_context("[1, 2]"), Err(ScoutError::Parse(_))));
        let ctx = parse_context(r#"{"company": "Stripe", "job_title": "Engineer"}"#).unwrap();
        assert_eq!(ctx.company, "Stripe");
        assert!(ctx.required_skills.is_empty());
    }

    #[tokio::test]
    async fn blank_context_is_a_search_error() {
        let err = run_search(&offline(), r#"{"company": "Stripe"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoutError::Search(_)));
    }
}
