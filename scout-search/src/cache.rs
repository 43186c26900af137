//! Request-keyed report cache shared across concurrent searches.
//!
//! Reports are keyed by the normalised search context and the sorted set of
//! provider ids. Writes are insert-if-absent: the first report stored for a
//! key wins until it expires, so racing searches never overwrite each other.
//! Uses [`moka`] for async-friendly caching with TTL and automatic eviction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use moka::future::Cache;

use crate::report::SearchReport;
use crate::text::{normalize, normalize_domain};
use crate::types::{SearchContext, SourceId};

/// Maximum number of cached reports.
const MAX_CACHE_ENTRIES: u64 = 500;

/// Composite cache key: normalised context hash + provider set hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    context_hash: u64,
    provider_hash: u64,
}

impl CacheKey {
    /// Build a deterministic key.
    ///
    /// Text fields are lowercased and whitespace-collapsed, list fields are
    /// sorted, and the domain is normalised, so cosmetic differences in the
    /// context map to the same key. Provider order does not matter.
    pub fn new(ctx: &SearchContext, providers: &[SourceId]) -> Self {
        Self {
            context_hash: hash_context(ctx),
            provider_hash: hash_providers(providers),
        }
    }
}

fn sorted_normalized(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values
        .iter()
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn hash_context(ctx: &SearchContext) -> u64 {
    let mut hasher = DefaultHasher::new();
    normalize(&ctx.company).hash(&mut hasher);
    sorted_normalized(&ctx.company_aliases).hash(&mut hasher);
    ctx.domain.as_deref().map(normalize_domain).hash(&mut hasher);
    normalize(&ctx.job_title).hash(&mut hasher);
    ctx.department.as_deref().map(normalize).hash(&mut hasher);
    ctx.location.as_deref().map(normalize).hash(&mut hasher);
    sorted_normalized(&ctx.required_skills).hash(&mut hasher);
    sorted_normalized(&ctx.nice_to_have_skills).hash(&mut hasher);
    sorted_normalized(&ctx.requester_schools).hash(&mut hasher);
    sorted_normalized(&ctx.requester_past_employers).hash(&mut hasher);
    hasher.finish()
}

/// Deterministic hash of a provider set, independent of order.
fn hash_providers(providers: &[SourceId]) -> u64 {
    let mut sorted: Vec<&SourceId> = providers.iter().collect();
    sorted.sort();
    sorted.dedup();
    let mut hasher = DefaultHasher::new();
    for id in sorted {
        id.hash(&mut hasher);
    }
    hasher.finish()
}

/// Report cache. A TTL of zero disables it entirely.
#[derive(Clone)]
pub struct ResultCache {
    inner: Option<Cache<CacheKey, SearchReport>>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("enabled", &self.inner.is_some())
            .finish()
    }
}

impl ResultCache {
    /// Create a cache with the given TTL in seconds.
    pub fn new(ttl_seconds: u64) -> Self {
        let inner = (ttl_seconds > 0).then(|| {
            Cache::builder()
                .max_capacity(MAX_CACHE_ENTRIES)
                .time_to_live(Duration::from_secs(ttl_seconds))
                .build()
        });
        Self { inner }
    }

    /// Whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Look up a cached report.
    pub async fn get(&self, key: &CacheKey) -> Option<SearchReport> {
        match &self.inner {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    /// Store a report unless one is already cached for the key.
    ///
    /// Returns `true` if this call stored the report.
    pub async fn insert_if_absent(&self, key: CacheKey, report: SearchReport) -> bool {
        match &self.inner {
            Some(cache) => cache.entry(key).or_insert(report).await.is_fresh(),
            None => false,
        }
    }
}
