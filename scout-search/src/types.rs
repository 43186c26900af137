//! Core types: search input, source descriptors, candidate and person records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::error::{Result, SearchError};

/// Everything the pipeline knows about one outreach search.
///
/// Produced upstream by document and job-posting parsers. Only `company` and
/// `job_title` are mandatory; every optional field degrades the rule that
/// uses it instead of failing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchContext {
    /// Target company name as the requester wrote it.
    pub company: String,
    /// Additional names the company is known by.
    pub company_aliases: Vec<String>,
    /// Company web domain, the strongest disambiguator when present.
    pub domain: Option<String>,
    /// Job title the requester is applying for.
    pub job_title: String,
    /// Team or department of the role.
    pub department: Option<String>,
    /// Role location.
    pub location: Option<String>,
    /// Skills the role requires.
    pub required_skills: Vec<String>,
    /// Skills the role would like.
    pub nice_to_have_skills: Vec<String>,
    /// Schools the requester attended.
    pub requester_schools: Vec<String>,
    /// Companies the requester worked at before.
    pub requester_past_employers: Vec<String>,
}

impl SearchContext {
    /// Create a context with the two mandatory fields set.
    pub fn new(company: impl Into<String>, job_title: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            job_title: job_title.into(),
            ..Default::default()
        }
    }

    /// Set the company domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the required skills.
    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set the requester's schools.
    pub fn with_schools<I, S>(mut self, schools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requester_schools = schools.into_iter().map(Into::into).collect();
        self
    }

    /// Set the requester's past employers.
    pub fn with_past_employers<I, S>(mut self, employers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requester_past_employers = employers.into_iter().map(Into::into).collect();
        self
    }

    /// Checks the mandatory fields.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidContext`] if the company or job title is blank.
    pub fn validate(&self) -> Result<()> {
        if self.company.trim().is_empty() {
            return Err(SearchError::InvalidContext(
                "company must not be empty".into(),
            ));
        }
        if self.job_title.trim().is_empty() {
            return Err(SearchError::InvalidContext(
                "job_title must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Required skills followed by nice-to-have skills, case-insensitively deduplicated.
    pub fn all_skills(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.required_skills
            .iter()
            .chain(self.nice_to_have_skills.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
            .collect()
    }
}

/// Stable identifier of a source provider (`"duckduckgo"`, `"apollo"`, …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Create a source id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Cost class of a provider. Free providers run first; metered ones only
/// when the free tier did not produce enough validated people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostTier {
    /// Tier 0: no per-call cost.
    Free,
    /// Tier 1: every call is billed or quota-limited.
    Metered,
}

impl CostTier {
    /// Returns the human-readable name of this tier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Metered => "metered",
        }
    }
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What kind of data a provider can return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Returns profile URLs.
    pub profile_urls: bool,
    /// Returns email or phone contact details.
    pub contact_info: bool,
    /// Returns free-text context snippets.
    pub snippets: bool,
}

/// Fixed-window call budget for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Calls allowed per window.
    pub max_calls: u32,
    /// Window length.
    pub window: Duration,
}

/// Static description of a provider.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Provider id.
    pub id: SourceId,
    /// Relative trust in `[0, 1]`, used by the ranker.
    pub quality_weight: f64,
    /// Cost tier.
    pub cost_tier: CostTier,
    /// Disabled providers are never called.
    pub enabled: bool,
    /// Data the provider can return.
    pub capabilities: Capabilities,
    /// Estimated minimum latency of one call. A metered tier is only started
    /// when the remaining budget exceeds this.
    pub min_latency: Duration,
    /// Optional per-provider rate limit.
    pub rate_limit: Option<RateLimit>,
}

impl SourceDescriptor {
    /// Create an enabled descriptor with no capabilities and no rate limit.
    pub fn new(id: impl Into<SourceId>, cost_tier: CostTier, quality_weight: f64) -> Self {
        Self {
            id: id.into(),
            quality_weight: clamp_unit(quality_weight),
            cost_tier,
            enabled: true,
            capabilities: Capabilities::default(),
            min_latency: Duration::ZERO,
            rate_limit: None,
        }
    }

    /// Set the capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the minimum expected latency.
    pub fn with_min_latency(mut self, min_latency: Duration) -> Self {
        self.min_latency = min_latency;
        self
    }

    /// Set a fixed-window rate limit.
    pub fn with_rate_limit(mut self, max_calls: u32, window: Duration) -> Self {
        self.rate_limit = Some(RateLimit { max_calls, window });
        self
    }

    /// Enable or disable the provider.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Contact details attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
}

impl ContactInfo {
    /// Returns `true` when no contact field is set.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// Raw result of exactly one provider call, before merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Person's full name.
    pub name: String,
    /// Job title as found.
    #[serde(default)]
    pub title: Option<String>,
    /// Company as the provider found it.
    pub company: String,
    /// Profile URL, if any.
    #[serde(default)]
    pub profile_url: Option<String>,
    /// Contact details.
    #[serde(default)]
    pub contact: ContactInfo,
    /// Location, if any.
    #[serde(default)]
    pub location: Option<String>,
    /// Department, if any.
    #[serde(default)]
    pub department: Option<String>,
    /// Listed skills.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Provider that produced this record.
    pub source: SourceId,
    /// Raw text around the match (search snippet, bio line, …).
    #[serde(default)]
    pub snippet: String,
    /// Provider's own confidence in `[0, 1]`.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

/// Confidence assumed when a provider does not supply one.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

impl CandidateRecord {
    /// Create a record with the mandatory fields set.
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        source: impl Into<SourceId>,
    ) -> Self {
        Self {
            name: name.into(),
            title: None,
            company: company.into(),
            profile_url: None,
            contact: ContactInfo::default(),
            location: None,
            department: None,
            skills: Vec::new(),
            source: source.into(),
            snippet: String::new(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the profile URL.
    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = Some(url.into());
        self
    }

    /// Set the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.contact.email = Some(email.into());
        self
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Set the skills.
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set the context snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    /// Set the initial confidence, clamped to `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }
}

/// Role category of a person relative to the target role.
///
/// The derived ordering is total and ascending in outreach priority:
/// `Unknown < Peer < Senior < Manager < Recruiter`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Could not be classified.
    #[default]
    Unknown,
    /// Same role as the target.
    Peer,
    /// More senior than the target role.
    Senior,
    /// Manager, director, head of, VP or executive.
    Manager,
    /// Recruiting or talent acquisition.
    Recruiter,
}

impl Category {
    /// Returns the human-readable name of this category.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Peer => "peer",
            Self::Senior => "senior",
            Self::Manager => "manager",
            Self::Recruiter => "recruiter",
        }
    }

    /// All categories in output order (highest priority first).
    pub fn all() -> &'static [Category] {
        &[
            Self::Recruiter,
            Self::Manager,
            Self::Senior,
            Self::Peer,
            Self::Unknown,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deduplication key of a person.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DedupKey {
    /// Canonical profile URL.
    Profile(String),
    /// Lowercased, trimmed `(name, company)` pair.
    NameCompany(String, String),
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(url) => write!(f, "profile:{url}"),
            Self::NameCompany(name, company) => write!(f, "name:{name}|{company}"),
        }
    }
}

/// A deduplicated person, enriched in place by the later pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Unique key within one result set.
    pub key: DedupKey,
    /// Full name.
    pub name: String,
    /// Job title.
    pub title: Option<String>,
    /// Company as found.
    pub company: String,
    /// Canonical profile URL.
    pub profile_url: Option<String>,
    /// Contact details.
    pub contact: ContactInfo,
    /// Location.
    pub location: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Union of all listed skills, sorted.
    pub skills: Vec<String>,
    /// Every provider that contributed. Never empty.
    pub sources: BTreeSet<SourceId>,
    /// Every distinct context snippet, sorted.
    pub snippets: Vec<String>,
    /// Highest quality weight among the contributing sources.
    pub source_quality: f64,
    /// Data completeness and corroboration, in `[0, 1]`.
    pub confidence: f64,
    /// Whether the company domain was found in this person's data.
    pub domain_corroborated: bool,
    /// Role category.
    pub category: Category,
    /// Personal fit for the requester, in `[0, 1]`.
    pub relevance: f64,
    /// Machine-readable reasons behind `relevance`, in the order they were added.
    pub match_reasons: Vec<String>,
}

impl PersonRecord {
    /// All free text known about this person, lowercased, for keyword checks.
    pub fn background_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(title) = &self.title {
            parts.push(title);
        }
        parts.push(&self.company);
        if let Some(location) = &self.location {
            parts.push(location);
        }
        if let Some(department) = &self.department {
            parts.push(department);
        }
        parts.extend(self.snippets.iter().map(String::as_str));
        parts.extend(self.skills.iter().map(String::as_str));
        parts.join(" \n ").to_lowercase()
    }

    /// Returns `true` if a profile URL is present.
    pub fn has_profile_url(&self) -> bool {
        self.profile_url.is_some()
    }
}

/// Clamp a score to `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
