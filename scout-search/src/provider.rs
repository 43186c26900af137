//! Trait definition for pluggable source providers.
//!
//! Each external lookup (web search scrape, people-data API, fixture file)
//! implements [`SourceProvider`] so the orchestrator can fan out over a
//! heterogeneous `Vec<Arc<dyn SourceProvider>>`.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::ProviderError;
use crate::planner::QueryVariant;
use crate::types::{CandidateRecord, SourceDescriptor};

/// A pluggable people lookup.
///
/// Implementors handle their own:
///
/// - request construction from the planned query variants
/// - transport and authentication
/// - parsing into [`CandidateRecord`] values tagged with their source id
/// - mapping failures onto the four [`ProviderError`] kinds
///
/// An empty result is `Ok(vec![])`, never an error. Implementations must be
/// `Send + Sync` because one provider instance serves concurrent searches.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Static description: id, quality weight, cost tier, capabilities.
    fn descriptor(&self) -> &SourceDescriptor;

    /// Look up people for the planned query variants.
    ///
    /// # Arguments
    ///
    /// * `queries`: Variants in priority order; a provider may use only a prefix.
    /// * `max_results`: Upper bound on returned records.
    /// * `remaining`: Time left in the global budget. Providers should not
    ///   start work they cannot finish within it.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] describing why the lookup failed.
    async fn search(
        &self,
        queries: &[QueryVariant],
        max_results: usize,
        remaining: Duration,
    ) -> Result<Vec<CandidateRecord>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::QueryKind;
    use crate::types::CostTier;
    use std::sync::Arc;

    /// A mock provider for testing trait bounds and dynamic dispatch.
    struct MockProvider {
        descriptor: SourceDescriptor,
        records: Vec<CandidateRecord>,
        error: Option<ProviderError>,
    }

    impl MockProvider {
        fn new(id: &str, records: Vec<CandidateRecord>) -> Self {
            Self {
                descriptor: SourceDescriptor::new(id, CostTier::Free, 0.6),
                records,
                error: None,
            }
        }

        fn failing(id: &str, error: ProviderError) -> Self {
            Self {
                descriptor: SourceDescriptor::new(id, CostTier::Metered, 0.9),
                records: vec![],
                error: Some(error),
            }
        }
    }

    #[async_trait]
    impl SourceProvider for MockProvider {
        fn descriptor(&self) -> &SourceDescriptor {
            &self.descriptor
        }

        async fn search(
            &self,
            _queries: &[QueryVariant],
            max_results: usize,
            _remaining: Duration,
        ) -> Result<Vec<CandidateRecord>, ProviderError> {
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            Ok(self.records.iter().take(max_results).cloned().collect())
        }
    }

    fn query() -> QueryVariant {
        QueryVariant {
            kind: QueryKind::Fallback,
            text: "\"Stripe\" Engineer".into(),
            company: "Stripe".into(),
            title: "Engineer".into(),
            domain: None,
        }
    }

    #[test]
    fn trait_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SourceProvider>();
    }

    #[tokio::test]
    async fn mock_provider_respects_max_results() {
        let records = (0..5)
            .map(|i| CandidateRecord::new(format!("Person {i}"), "Stripe", "mock"))
            .collect();
        let provider: Arc<dyn SourceProvider> = Arc::new(MockProvider::new("mock", records));

        let found = provider
            .search(&[query()], 3, Duration::from_secs(1))
            .await
            .expect("should succeed");
        assert_eq!(found.len(), 3);
        assert_eq!(provider.descriptor().id.as_str(), "mock");
    }

    #[tokio::test]
    async fn empty_result_is_ok() {
        let provider = MockProvider::new("mock", vec![]);
        let found = provider
            .search(&[query()], 10, Duration::from_secs(1))
            .await
            .expect("empty is not an error");
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn mock_provider_propagates_errors() {
        let provider = MockProvider::failing("paid", ProviderError::RateLimited("HTTP 429".into()));
        let err = provider
            .search(&[query()], 10, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP 429"));
        assert_eq!(provider.descriptor().cost_tier, CostTier::Metered);
    }
}
