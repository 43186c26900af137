//! Offline provider serving preloaded candidate records.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::ProviderError;
use crate::planner::QueryVariant;
use crate::provider::SourceProvider;
use crate::tables::company::strip_suffixes;
use crate::types::{Capabilities, CandidateRecord, CostTier, SourceDescriptor, SourceId};

/// Provider id.
pub const ID: &str = "fixtures";

/// Serves a fixed set of candidates, filtered to the queried company.
///
/// Records keep their own `source` if they carry one other than this
/// provider's id, so a fixture file can replay several upstreams.
pub struct StaticProvider {
    descriptor: SourceDescriptor,
    records: Vec<CandidateRecord>,
}

impl StaticProvider {
    /// Create a provider from in-memory records.
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self {
            descriptor: SourceDescriptor::new(ID, CostTier::Free, 0.5).with_capabilities(
                Capabilities {
                    profile_urls: true,
                    contact_info: true,
                    snippets: true,
                },
            ),
            records,
        }
    }

    /// Load records from a JSON array of candidate records.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, ProviderError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Unavailable(format!("cannot read fixtures {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse records from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the JSON is malformed.
    pub fn from_json_str(content: &str) -> Result<Self, ProviderError> {
        let records: Vec<CandidateRecord> = serde_json::from_str(content)
            .map_err(|e| ProviderError::Unavailable(format!("invalid fixtures: {e}")))?;
        Ok(Self::new(records))
    }

    /// Replace the descriptor (id, tier, weight).
    pub fn with_descriptor(mut self, descriptor: SourceDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SourceProvider for StaticProvider {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        queries: &[QueryVariant],
        max_results: usize,
        _remaining: Duration,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        let Some(query) = queries.first() else {
            return Ok(Vec::new());
        };
        let target = strip_suffixes(&query.company);
        let own_id = SourceId::new(ID);

        Ok(self
            .records
            .iter()
            .filter(|r| strip_suffixes(&r.company) == target)
            .take(max_results)
            .cloned()
            .map(|mut r| {
                if r.source.as_str().is_empty() || r.source == own_id {
                    r.source = self.descriptor.id.clone();
                }
                r
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::QueryKind;

    fn query(company: &str) -> QueryVariant {
        QueryVariant {
            kind: QueryKind::Fallback,
            text: format!("\"{company}\" Engineer"),
            company: company.into(),
            title: "Engineer".into(),
            domain: None,
        }
    }

    const FIXTURES: &str = r#"[
        {"name": "Jane Doe", "company": "Stripe, Inc.", "source": "fixtures", "title": "Recruiter"},
        {"name": "Sam Lee", "company": "stripe", "source": "fixtures"},
        {"name": "Ana Ruiz", "company": "Root", "source": "replayed"}
    ]"#;

    #[tokio::test]
    async fn filters_by_company() {
        let provider = StaticProvider::from_json_str(FIXTURES).expect("parse");
        assert_eq!(provider.len(), 3);

        let found = provider
            .search(&[query("Stripe")], 10, Duration::from_secs(1))
            .await
            .expect("search");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|c| c.source.as_str() == ID));
    }

    #[tokio::test]
    async fn keeps_foreign_source_ids() {
        let provider = StaticProvider::from_json_str(FIXTURES).expect("parse");
        let found = provider
            .search(&[query("Root")], 10, Duration::from_secs(1))
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source.as_str(), "replayed");
    }

    #[tokio::test]
    async fn custom_descriptor_relabels_records() {
        let provider = StaticProvider::from_json_str(FIXTURES)
            .expect("parse")
            .with_descriptor(SourceDescriptor::new("offline", CostTier::Free, 0.4));
        let found = provider
            .search(&[query("Stripe")], 1, Duration::from_secs(1))
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source.as_str(), "offline");
    }

    #[test]
    fn malformed_json_is_unavailable() {
        let err = StaticProvider::from_json_str("{not json").err().expect("error");
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
