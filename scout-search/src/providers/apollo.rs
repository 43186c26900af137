//! Apollo people-search API: the metered tier.
//!
//! Every call spends credits, so the orchestrator only reaches this provider
//! when the free tier came back short. Requests are JSON `POST`s authenticated
//! with an `X-Api-Key` header.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::http;
use crate::planner::QueryVariant;
use crate::provider::SourceProvider;
use crate::types::{Capabilities, CandidateRecord, CostTier, SourceDescriptor};

/// Provider id.
pub const ID: &str = "apollo";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.apollo.io";

const SEARCH_PATH: &str = "/v1/contacts/search";

/// Apollo returns page sizes up to this.
const MAX_PAGE_SIZE: usize = 100;

/// Confidence given to Apollo records: structured, curated employment data.
const APOLLO_CONFIDENCE: f64 = 0.7;

/// Apollo people-search client.
pub struct ApolloProvider {
    descriptor: SourceDescriptor,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApolloProvider {
    /// Create a provider. A missing key is not an error here; every search
    /// then reports [`ProviderError::Unavailable`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            descriptor: SourceDescriptor::new(ID, CostTier::Metered, 0.95)
                .with_capabilities(Capabilities {
                    profile_urls: true,
                    contact_info: true,
                    snippets: false,
                })
                .with_min_latency(Duration::from_millis(800))
                .with_rate_limit(50, Duration::from_secs(60)),
            client: http::build_client(config)?,
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Point the provider at a different base URL (a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q_organization_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    q_organization_domains: Option<&'a str>,
    person_titles: Vec<&'a str>,
    page: u32,
    per_page: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    contacts: Vec<ApolloPerson>,
    people: Vec<ApolloPerson>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApolloPerson {
    name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    title: Option<String>,
    headline: Option<String>,
    linkedin_url: Option<String>,
    email: Option<String>,
    city: Option<String>,
    state: Option<String>,
    departments: Vec<String>,
    organization_name: Option<String>,
    organization: Option<ApolloOrganization>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApolloOrganization {
    name: Option<String>,
}

impl ApolloPerson {
    fn into_candidate(self, fallback_company: &str) -> Option<CandidateRecord> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
                    .iter()
                    .flatten()
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ");
                (!joined.trim().is_empty()).then_some(joined)
            })?;

        let company = self
            .organization_name
            .or_else(|| self.organization.and_then(|o| o.name))
            .unwrap_or_else(|| fallback_company.to_owned());

        let mut candidate =
            CandidateRecord::new(name.trim(), company, ID).with_confidence(APOLLO_CONFIDENCE);
        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            candidate = candidate.with_title(title);
        }
        if let Some(url) = self.linkedin_url.filter(|u| !u.trim().is_empty()) {
            candidate = candidate.with_profile_url(url);
        }
        // Locked emails come back as placeholders.
        if let Some(email) = self
            .email
            .filter(|e| e.contains('@') && !e.contains("not_unlocked"))
        {
            candidate = candidate.with_email(email);
        }
        let location = match (self.city, self.state) {
            (Some(city), Some(state)) => Some(format!("{city}, {state}")),
            (Some(city), None) => Some(city),
            (None, state) => state,
        };
        if let Some(location) = location {
            candidate = candidate.with_location(location);
        }
        if let Some(department) = self.departments.into_iter().next() {
            candidate = candidate.with_department(department.replace('_', " "));
        }
        if let Some(headline) = self.headline {
            candidate = candidate.with_snippet(headline);
        }
        Some(candidate)
    }
}

#[async_trait]
impl SourceProvider for ApolloProvider {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        queries: &[QueryVariant],
        max_results: usize,
        remaining: Duration,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        let Some(api_key) = &self.api_key else {
            return Err(ProviderError::Unavailable("Apollo API key not configured".into()));
        };
        // One structured request covers the whole plan.
        let Some(query) = queries.first() else {
            return Ok(Vec::new());
        };

        let body = SearchRequest {
            q_organization_name: &query.company,
            q_organization_domains: query.domain.as_deref(),
            person_titles: vec![query.title.as_str()],
            page: 1,
            per_page: max_results.clamp(1, MAX_PAGE_SIZE),
        };

        tracing::trace!(company = %query.company, title = %query.title, "Apollo search");

        let response = self
            .client
            .post(format!("{}{SEARCH_PATH}", self.base_url))
            .header("X-Api-Key", api_key)
            .header("Cache-Control", "no-cache")
            .timeout(remaining)
            .json(&body)
            .send()
            .await
            .map_err(|e| http::classify_request_error("Apollo", &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(http::classify_status("Apollo", status));
        }

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transient(format!("Apollo response parse failed: {e}")))?;
        if let Some(error) = data.error {
            return Err(ProviderError::Unavailable(format!("Apollo refused search: {error}")));
        }

        let candidates: Vec<CandidateRecord> = data
            .contacts
            .into_iter()
            .chain(data.people)
            .filter_map(|p| p.into_candidate(&query.company))
            .take(max_results)
            .collect();

        tracing::debug!(count = candidates.len(), "Apollo candidates parsed");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_maps_to_candidate() {
        let person: ApolloPerson = serde_json::from_str(
            r#"{
                "first_name": "Jane",
                "last_name": "Doe",
                "title": "Talent Partner",
                "linkedin_url": "http://www.linkedin.com/in/janedoe",
                "email": "jane@stripe.com",
                "city": "Dublin",
                "departments": ["human_resources"],
                "organization": {"name": "Stripe"}
            }"#,
        )
        .expect("deserialize");

        let c = person.into_candidate("fallback").expect("has a name");
        assert_eq!(c.name, "Jane Doe");
        assert_eq!(c.company, "Stripe");
        assert_eq!(c.title.as_deref(), Some("Talent Partner"));
        assert_eq!(c.contact.email.as_deref(), Some("jane@stripe.com"));
        assert_eq!(c.location.as_deref(), Some("Dublin"));
        assert_eq!(c.department.as_deref(), Some("human resources"));
        assert!((c.confidence - APOLLO_CONFIDENCE).abs() < f64::EPSILON);
    }

    #[test]
    fn locked_email_is_dropped() {
        let person = ApolloPerson {
            name: Some("Sam Lee".into()),
            email: Some("email_not_unlocked@domain.com".into()),
            ..Default::default()
        };
        let c = person.into_candidate("Stripe").expect("has a name");
        assert!(c.contact.email.is_none());
        assert_eq!(c.company, "Stripe");
    }

    #[test]
    fn nameless_person_is_skipped() {
        let person = ApolloPerson {
            title: Some("Engineer".into()),
            ..Default::default()
        };
        assert!(person.into_candidate("Stripe").is_none());
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let provider = ApolloProvider::new(&SearchConfig::default(), None).expect("client");
        assert!(!provider.is_configured());
        let err = provider
            .search(&[], 10, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let provider =
            ApolloProvider::new(&SearchConfig::default(), Some("  ".into())).expect("client");
        assert!(!provider.is_configured());
    }

    #[test]
    fn descriptor_is_metered() {
        let provider =
            ApolloProvider::new(&SearchConfig::default(), Some("k".into())).expect("client");
        assert_eq!(provider.descriptor().cost_tier, CostTier::Metered);
        assert!(provider.descriptor().capabilities.contact_info);
    }
}
