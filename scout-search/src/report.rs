//! Search output: the ranked people list plus diagnostics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ProviderErrorKind;
use crate::orchestrator::validate::RejectionRule;
use crate::planner::QueryVariant;
use crate::types::{Category, CostTier, PersonRecord, SourceId};

/// Orchestrator states, in the order a search can pass through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    /// Context validated, queries planned.
    Init,
    /// Providers of one tier are in flight.
    Running(CostTier),
    /// Enough validated people were found.
    Sufficient,
    /// Every eligible provider has been tried and the result is still short.
    Exhausted,
    /// The global deadline was hit with providers still in flight.
    BudgetExceeded,
    /// Report assembled.
    Done,
}

/// What happened to one provider during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Returned candidates (possibly none).
    Succeeded,
    /// Returned an error.
    Failed,
    /// Not called.
    Skipped,
    /// Still running when the deadline hit; its result was dropped.
    Abandoned,
}

/// Why a provider was not called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Descriptor is disabled.
    Disabled,
    /// Circuit breaker is open.
    CircuitOpen,
    /// Local rate-limit window is exhausted.
    RateLimited,
    /// Free tier was already sufficient.
    Sufficient,
    /// Remaining budget is below the provider's minimum latency.
    InsufficientBudget,
}

/// Per-provider diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutcome {
    /// Provider id.
    pub source: SourceId,
    /// Provider tier.
    pub tier: CostTier,
    /// Outcome.
    pub status: ProviderStatus,
    /// Candidates returned.
    pub result_count: usize,
    /// Error kind when `status` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderErrorKind>,
    /// Human-readable error or skip detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Why the provider was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<SkipReason>,
    /// Wall-clock time spent in the call.
    pub elapsed_ms: u64,
}

impl ProviderOutcome {
    pub(crate) fn skipped(source: SourceId, tier: CostTier, reason: SkipReason) -> Self {
        Self {
            source,
            tier,
            status: ProviderStatus::Skipped,
            result_count: 0,
            error: None,
            detail: None,
            skip_reason: Some(reason),
            elapsed_ms: 0,
        }
    }

    /// Whether the provider's data is missing for a reason that may clear
    /// on the next search. An unconfigured provider is not such a reason.
    pub fn missed_transiently(&self) -> bool {
        match self.status {
            ProviderStatus::Succeeded => false,
            ProviderStatus::Abandoned => true,
            ProviderStatus::Failed => self.error != Some(ProviderErrorKind::Unavailable),
            ProviderStatus::Skipped => matches!(
                self.skip_reason,
                Some(SkipReason::CircuitOpen | SkipReason::RateLimited)
            ),
        }
    }
}

/// Result of the optional enrichment step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// No enricher was supplied.
    #[default]
    NotConfigured,
    /// Skipped because elapsed time passed the soft cutoff.
    Skipped,
    /// Ran to completion.
    Completed,
    /// Hit its secondary deadline; records were left unchanged.
    TimedOut,
    /// Returned an error; records were left unchanged.
    Failed,
}

/// Everything an operator needs to understand one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Planned query variants.
    pub queries: Vec<QueryVariant>,
    /// One entry per provider, in registration order.
    pub providers: Vec<ProviderOutcome>,
    /// Candidates returned by all providers.
    pub raw_count: usize,
    /// People after deduplication.
    pub deduplicated_count: usize,
    /// People that passed validation.
    pub validated_count: usize,
    /// Rejections per validator rule.
    pub rejections: BTreeMap<RejectionRule, usize>,
    /// States the orchestrator passed through.
    pub state_trace: Vec<OrchestratorState>,
    /// Last state before `Done`.
    pub terminal_state: OrchestratorState,
    /// Enrichment result.
    pub enrichment: EnrichmentOutcome,
    /// Whether the report was served from the cache.
    pub cache_hit: bool,
    /// Total wall-clock time.
    pub elapsed_ms: u64,
}

impl Diagnostics {
    /// Outcome for one provider.
    pub fn provider(&self, source: &str) -> Option<&ProviderOutcome> {
        self.providers.iter().find(|p| p.source.as_str() == source)
    }

    /// Total rejections across all rules.
    pub fn rejected_count(&self) -> usize {
        self.rejections.values().sum()
    }

    /// Whether the run was cut off by the deadline or lost a provider to a
    /// transient failure. Degraded reports are not cached.
    pub fn is_degraded(&self) -> bool {
        self.terminal_state == OrchestratorState::BudgetExceeded
            || self.providers.iter().any(ProviderOutcome::missed_transiently)
    }
}

/// Final answer of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    /// Ranked people, highest category first.
    pub people: Vec<PersonRecord>,
    /// People per category.
    pub category_counts: BTreeMap<Category, usize>,
    /// Diagnostics.
    pub diagnostics: Diagnostics,
}

impl SearchReport {
    pub(crate) fn new(people: Vec<PersonRecord>, diagnostics: Diagnostics) -> Self {
        let mut category_counts = BTreeMap::new();
        for person in &people {
            *category_counts.entry(person.category).or_insert(0) += 1;
        }
        Self {
            people,
            category_counts,
            diagnostics,
        }
    }

    /// People grouped by category, highest priority category first. Empty
    /// categories are omitted; ranking order is kept within each group.
    pub fn grouped(&self) -> Vec<(Category, Vec<&PersonRecord>)> {
        Category::all()
            .iter()
            .filter_map(|category| {
                let members: Vec<&PersonRecord> = self
                    .people
                    .iter()
                    .filter(|p| p.category == *category)
                    .collect();
                (!members.is_empty()).then_some((*category, members))
            })
            .collect()
    }

    /// Whether no person survived the pipeline.
    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}
