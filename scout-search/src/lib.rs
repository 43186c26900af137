//! # scout-search
//!
//! Finds people plausibly employed at a target company, for outreach.
//!
//! Given a [`SearchContext`] (company, job title, and optional context about
//! the company and the requester), the pipeline:
//!
//! 1. plans up to five query variants ([`planner`])
//! 2. fans them out to free providers, then to metered providers only when
//!    the free tier came up short and the budget allows ([`orchestrator::search`])
//! 3. merges duplicates across sources ([`orchestrator::aggregate`])
//! 4. drops former employees and namesake companies ([`orchestrator::validate`])
//! 5. sorts people into recruiter / manager / senior / peer ([`orchestrator::categorize`])
//! 6. scores personal relevance and orders the result ([`orchestrator::rank`])
//!
//! Provider failures never fail a search: they are recorded in the
//! [`Diagnostics`] of the returned [`SearchReport`].
//!
//! ## Shared state
//!
//! Result cache, rate-limit windows, and circuit breakers live in a
//! [`SharedState`] handle injected into the orchestrator, so concurrent
//! searches share them and tests can supply a fresh one.
//!
//! ## Privacy
//!
//! Queries and candidate names are logged only at trace level.

pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod enrich;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod planner;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod report;
pub mod state;
pub mod tables;
pub mod text;
pub mod types;

pub use config::SearchConfig;
pub use enrich::Enricher;
pub use error::{ProviderError, ProviderErrorKind, Result, SearchError};
pub use orchestrator::SearchOrchestrator;
pub use planner::{plan_queries, QueryKind, QueryVariant};
pub use provider::SourceProvider;
pub use report::{
    Diagnostics, EnrichmentOutcome, OrchestratorState, ProviderOutcome, ProviderStatus,
    SearchReport, SkipReason,
};
pub use state::SharedState;
pub use tables::{CompanyTable, KeywordTable, Tables};
pub use types::{
    CandidateRecord, Capabilities, Category, CostTier, PersonRecord, SearchContext,
    SourceDescriptor, SourceId,
};

/// Run one search with a fresh shared state and the built-in tables.
///
/// Long-lived callers should build a [`SearchOrchestrator`] once and reuse it
/// so the cache, rate limits, and circuit breakers carry over between
/// searches.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration and
/// [`SearchError::InvalidContext`] when company or job title is blank.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> scout_search::Result<()> {
/// use std::sync::Arc;
/// use scout_search::{SearchConfig, SearchContext, SourceProvider};
/// use scout_search::providers::DuckDuckGoProvider;
///
/// let config = SearchConfig::default();
/// let ddg = DuckDuckGoProvider::new(&config)
///     .map_err(|e| scout_search::SearchError::Config(e.to_string()))?;
/// let providers: Vec<Arc<dyn SourceProvider>> = vec![Arc::new(ddg)];
///
/// let ctx = SearchContext::new("Root", "AI Engineer").with_domain("root.io");
/// let report = scout_search::search(&ctx, config, providers).await?;
/// for (category, people) in report.grouped() {
///     println!("{category}: {}", people.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    ctx: &SearchContext,
    config: SearchConfig,
    providers: Vec<std::sync::Arc<dyn SourceProvider>>,
) -> Result<SearchReport> {
    let state = SharedState::new(&config);
    SearchOrchestrator::new(config, providers, state)?
        .search(ctx)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config() {
        let config = SearchConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = search(&SearchContext::new("Stripe", "Engineer"), config, vec![])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[tokio::test]
    async fn search_validates_context() {
        let err = search(
            &SearchContext::new("Stripe", "  "),
            SearchConfig::default(),
            vec![],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidContext(_)));
    }

    #[tokio::test]
    async fn search_without_providers_is_empty_not_an_error() {
        let report = search(
            &SearchContext::new("Stripe", "Engineer"),
            SearchConfig::default(),
            vec![],
        )
        .await
        .expect("search");
        assert!(report.is_empty());
    }
}
