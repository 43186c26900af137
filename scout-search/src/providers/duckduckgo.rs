//! DuckDuckGo profile search: the free tier's workhorse.
//!
//! Uses the HTML-only endpoint at `https://html.duckduckgo.com/html/`, which
//! requires no JavaScript, and restricts every query to public LinkedIn
//! profile pages with a `site:` operator. Result titles follow the shape
//! `Name - Title - Company | LinkedIn` and are parsed into candidates.

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::http;
use crate::planner::QueryVariant;
use crate::provider::SourceProvider;
use crate::types::{Capabilities, CandidateRecord, CostTier, SourceDescriptor};

/// Provider id.
pub const ID: &str = "duckduckgo";

const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const SITE_FILTER: &str = "site:linkedin.com/in";

/// Queries sent per search. The rest of the plan is ignored.
const MAX_QUERIES: usize = 3;

/// DuckDuckGo HTML scraper restricted to LinkedIn profiles.
pub struct DuckDuckGoProvider {
    descriptor: SourceDescriptor,
    client: reqwest::Client,
    endpoint: String,
    request_delay_ms: (u64, u64),
}

impl DuckDuckGoProvider {
    /// Create a provider against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            descriptor: SourceDescriptor::new(ID, CostTier::Free, 0.7)
                .with_capabilities(Capabilities {
                    profile_urls: true,
                    contact_info: false,
                    snippets: true,
                })
                .with_min_latency(Duration::from_millis(400))
                .with_rate_limit(30, Duration::from_secs(60)),
            client: http::build_client(config)?,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            request_delay_ms: config.request_delay_ms,
        })
    }

    /// Point the provider at a different endpoint (a local mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch(&self, query: &str) -> Result<String, ProviderError> {
        tracing::trace!(query, "DuckDuckGo search");

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| http::classify_request_error("DuckDuckGo", &e))?;

        let status = response.status();
        if !status.is_success() {
            // DDG answers bot suspicion with 403 rather than 429.
            if status == StatusCode::FORBIDDEN {
                return Err(ProviderError::RateLimited(
                    "DuckDuckGo returned HTTP 403".into(),
                ));
            }
            return Err(http::classify_status("DuckDuckGo", status));
        }

        let html = response
            .text()
            .await
            .map_err(|e| http::classify_request_error("DuckDuckGo", &e))?;
        if html.contains("anomaly-modal") {
            return Err(ProviderError::RateLimited(
                "DuckDuckGo served a bot challenge".into(),
            ));
        }

        tracing::trace!(bytes = html.len(), "DuckDuckGo response received");
        Ok(html)
    }
}

#[async_trait]
impl SourceProvider for DuckDuckGoProvider {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn search(
        &self,
        queries: &[QueryVariant],
        max_results: usize,
        remaining: Duration,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        let deadline = Instant::now() + remaining;
        let mut candidates: Vec<CandidateRecord> = Vec::new();

        for (i, query) in queries.iter().take(MAX_QUERIES).enumerate() {
            if i > 0 {
                let pause = http::jitter(self.request_delay_ms);
                if Instant::now() + pause >= deadline {
                    break;
                }
                tokio::time::sleep(pause).await;
            }

            let text = format!("{SITE_FILTER} {}", query.text);
            let html = match self.fetch(&text).await {
                Ok(html) => html,
                // Later queries only add recall; keep what the first ones found.
                Err(e) if !candidates.is_empty() => {
                    tracing::debug!(error = %e, "DuckDuckGo follow-up query failed");
                    break;
                }
                Err(e) => return Err(e),
            };

            let hits = parse_duckduckgo_html(&html, max_results)?;
            for hit in hits {
                if candidates.len() >= max_results {
                    break;
                }
                if candidates
                    .iter()
                    .any(|c| c.profile_url.as_deref() == Some(hit.url.as_str()))
                {
                    continue;
                }
                if let Some(candidate) = hit.into_candidate(&query.company) {
                    candidates.push(candidate);
                }
            }
            if candidates.len() >= max_results {
                break;
            }
        }

        tracing::debug!(count = candidates.len(), "DuckDuckGo candidates parsed");
        Ok(candidates)
    }
}

/// One organic search hit before it is interpreted as a person.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchHit {
    /// Interpret the hit as a profile page. Returns `None` for anything that
    /// is not a LinkedIn `/in/` page or has no plausible person name.
    fn into_candidate(self, query_company: &str) -> Option<CandidateRecord> {
        if !self.url.contains("linkedin.com/in/") {
            return None;
        }
        let parsed = parse_profile_title(&self.title)?;
        let company = parsed.company.unwrap_or_else(|| query_company.to_owned());

        let mut candidate = CandidateRecord::new(parsed.name, company, ID)
            .with_profile_url(self.url)
            .with_snippet(self.snippet);
        if let Some(title) = parsed.title {
            candidate = candidate.with_title(title);
        }
        Some(candidate)
    }
}

/// Pieces of a LinkedIn result title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProfileTitle {
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
}

/// Parse `Name - Title - Company | LinkedIn` (any of the trailing parts may
/// be missing).
pub(crate) fn parse_profile_title(raw: &str) -> Option<ProfileTitle> {
    let trimmed = raw.trim();
    let without_site = ["| LinkedIn", "- LinkedIn", "| Linkedin"]
        .iter()
        .find_map(|suffix| trimmed.strip_suffix(suffix))
        .unwrap_or(trimmed)
        .trim();

    let parts: Vec<&str> = without_site
        .split(" - ")
        .flat_map(|p| p.split(" – "))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let name = (*parts.first()?).to_owned();
    if !looks_like_name(&name) {
        return None;
    }
    let title = parts.get(1).map(|t| (*t).to_owned());
    let company = if parts.len() > 2 {
        Some(parts[2..].join(" - "))
    } else {
        None
    };
    Some(ProfileTitle {
        name,
        title,
        company,
    })
}

fn looks_like_name(name: &str) -> bool {
    let words = name.split_whitespace().count();
    let lower = name.to_lowercase();
    (1..=5).contains(&words)
        && !name.chars().any(|c| c.is_ascii_digit())
        && !["linkedin", "jobs", "profiles", "people"]
            .iter()
            .any(|w| lower.contains(w))
}

/// Extract the actual URL from DuckDuckGo's redirect wrapper.
///
/// DDG wraps URLs like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
fn extract_url(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}

/// Parse a DuckDuckGo HTML response into organic hits.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    max_results: usize,
) -> Result<Vec<SearchHit>, ProviderError> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(
        ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    )
    .map_err(|e| ProviderError::Transient(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(".result__a")
        .map_err(|e| ProviderError::Transient(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".result__snippet")
        .map_err(|e| ProviderError::Transient(format!("invalid snippet selector: {e:?}")))?;

    let mut hits = Vec::new();

    for element in document.select(&result_sel) {
        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };

        let title = title_el.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(url) = title_el.value().attr("href").and_then(extract_url) else {
            continue;
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
        });

        if hits.len() >= max_results {
            break;
        }
    }

    Ok(hits)
}
