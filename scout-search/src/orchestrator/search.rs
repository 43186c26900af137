//! Tiered search orchestrator: free providers first, metered providers only
//! when the free tier came up short and the budget allows.
//!
//! ```text
//! Init → Running(Free) → { Sufficient | Exhausted | BudgetExceeded }
//!                      → [Running(Metered) → { … }] → Done
//! ```
//!
//! One global deadline governs the whole run. Each call additionally carries
//! a sub-timeout; calls still in flight when the deadline passes are dropped
//! and whatever arrived so far is used.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{timeout, timeout_at, Instant};

use crate::cache::CacheKey;
use crate::config::SearchConfig;
use crate::enrich::Enricher;
use crate::error::{ProviderError, Result};
use crate::planner::{plan_queries, QueryVariant};
use crate::provider::SourceProvider;
use crate::report::{
    Diagnostics, EnrichmentOutcome, OrchestratorState, ProviderOutcome, ProviderStatus,
    SearchReport, SkipReason,
};
use crate::state::SharedState;
use crate::tables::Tables;
use crate::types::{clamp_unit, CandidateRecord, CostTier, PersonRecord, SearchContext, SourceId};

use super::aggregate::{aggregate, SourceWeights};
use super::categorize::Categorizer;
use super::rank::Ranker;
use super::validate::{RejectionRule, Validator};

/// Runs searches over a fixed provider registry.
pub struct SearchOrchestrator {
    config: SearchConfig,
    tables: Tables,
    providers: Vec<Arc<dyn SourceProvider>>,
    state: SharedState,
    enricher: Option<Arc<dyn Enricher>>,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("providers", &self.provider_ids())
            .field("enricher", &self.enricher.as_ref().map(|e| e.name().to_owned()))
            .finish_non_exhaustive()
    }
}

/// Mutable bookkeeping of one run.
struct Run {
    trace: Vec<OrchestratorState>,
    outcomes: Vec<Option<ProviderOutcome>>,
    candidates: Vec<CandidateRecord>,
}

/// How one provider call ended.
enum Call {
    Finished(std::result::Result<Vec<CandidateRecord>, ProviderError>),
    /// Still running when the global deadline passed.
    CutOff,
}

/// Validated people and the counts behind them.
struct Evaluation {
    people: Vec<PersonRecord>,
    deduplicated: usize,
    rejections: BTreeMap<RejectionRule, usize>,
}

impl SearchOrchestrator {
    /// Create an orchestrator with the built-in tables.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::Config`] if `config` is invalid.
    pub fn new(
        config: SearchConfig,
        providers: Vec<Arc<dyn SourceProvider>>,
        state: SharedState,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tables: Tables::builtin(),
            providers,
            state,
            enricher: None,
        })
    }

    /// Replace the company and keyword tables. Keyword entries are normalised.
    pub fn with_tables(mut self, mut tables: Tables) -> Self {
        tables.keywords = tables.keywords.normalized();
        self.tables = tables;
        self
    }

    /// Install an enrichment step.
    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// The shared state handle.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Registered provider ids, in registration order.
    pub fn provider_ids(&self) -> Vec<SourceId> {
        self.providers
            .iter()
            .map(|p| p.descriptor().id.clone())
            .collect()
    }

    /// Run one search.
    ///
    /// Provider failures are recorded in the diagnostics and never returned;
    /// a search where every provider failed is an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SearchError::InvalidContext`] if the company or job
    /// title is blank.
    pub async fn search(&self, ctx: &SearchContext) -> Result<SearchReport> {
        ctx.validate()?;
        let started = Instant::now();
        let deadline = started + self.config.budget();

        let key = CacheKey::new(ctx, &self.provider_ids());
        if let Some(mut cached) = self.state.cache().get(&key).await {
            tracing::debug!(company = %ctx.company, "serving search from cache");
            cached.diagnostics.cache_hit = true;
            return Ok(cached);
        }

        let queries = plan_queries(ctx, &self.tables.companies);

        let mut run = Run {
            trace: vec![OrchestratorState::Init],
            outcomes: vec![None; self.providers.len()],
            candidates: Vec::new(),
        };

        let free_timed_out = self
            .run_tier(CostTier::Free, &queries, deadline, &mut run)
            .await;
        let mut evaluation = self.evaluate(ctx, &run.candidates);
        let threshold = self.config.sufficiency_threshold;

        let terminal = if free_timed_out {
            self.skip_tier(CostTier::Metered, SkipReason::InsufficientBudget, &mut run);
            OrchestratorState::BudgetExceeded
        } else if evaluation.people.len() >= threshold {
            self.skip_tier(CostTier::Metered, SkipReason::Sufficient, &mut run);
            OrchestratorState::Sufficient
        } else if !self.metered_fits(deadline) {
            self.skip_tier(CostTier::Metered, SkipReason::InsufficientBudget, &mut run);
            OrchestratorState::Exhausted
        } else {
            let metered_timed_out = self
                .run_tier(CostTier::Metered, &queries, deadline, &mut run)
                .await;
            evaluation = self.evaluate(ctx, &run.candidates);
            if metered_timed_out {
                OrchestratorState::BudgetExceeded
            } else if evaluation.people.len() >= threshold {
                OrchestratorState::Sufficient
            } else {
                OrchestratorState::Exhausted
            }
        };
        run.trace.push(terminal);

        let validated = evaluation.people.len();
        let mut people = evaluation.people;
        let enrichment = self.enrich(ctx, &mut people, started, deadline).await;

        Categorizer::new(&ctx.job_title, &self.tables.keywords).apply(&mut people);
        Ranker::new(ctx).rank(&mut people);
        people.truncate(self.config.max_results);

        run.trace.push(OrchestratorState::Done);
        let diagnostics = Diagnostics {
            queries,
            providers: run.outcomes.into_iter().flatten().collect(),
            raw_count: run.candidates.len(),
            deduplicated_count: evaluation.deduplicated,
            validated_count: validated,
            rejections: evaluation.rejections,
            state_trace: run.trace,
            terminal_state: terminal,
            enrichment,
            cache_hit: false,
            elapsed_ms: millis(started.elapsed()),
        };
        let report = SearchReport::new(people, diagnostics);

        tracing::info!(
            company = %ctx.company,
            people = report.people.len(),
            raw = report.diagnostics.raw_count,
            rejected = report.diagnostics.rejected_count(),
            terminal = ?terminal,
            elapsed_ms = report.diagnostics.elapsed_ms,
            "search finished"
        );

        if report.diagnostics.is_degraded() {
            tracing::debug!(company = %ctx.company, "degraded run, not cached");
        } else {
            self.state
                .cache()
                .insert_if_absent(key, report.clone())
                .await;
        }
        Ok(report)
    }

    /// Dispatch every eligible provider of a tier concurrently and collect
    /// results until all finish or the deadline passes.
    ///
    /// Returns `true` if the deadline cut the tier short.
    async fn run_tier(
        &self,
        tier: CostTier,
        queries: &[QueryVariant],
        deadline: Instant,
        run: &mut Run,
    ) -> bool {
        let eligible = self.gate(tier, run);
        if eligible.is_empty() {
            return false;
        }
        run.trace.push(OrchestratorState::Running(tier));

        let per_provider = self.config.max_results_per_provider;
        let sub_timeout = self.config.provider_timeout();
        let mut pending: FuturesUnordered<_> = eligible
            .iter()
            .map(|&index| {
                let provider = Arc::clone(&self.providers[index]);
                async move {
                    let call_started = Instant::now();
                    let remaining = deadline.saturating_duration_since(call_started);
                    let bound_by_deadline = remaining <= sub_timeout;
                    let call = match timeout(
                        sub_timeout.min(remaining),
                        provider.search(queries, per_provider, remaining),
                    )
                    .await
                    {
                        Ok(result) => Call::Finished(result),
                        Err(_) if bound_by_deadline => Call::CutOff,
                        Err(_) => Call::Finished(Err(ProviderError::Timeout(format!(
                            "no answer within {} ms",
                            sub_timeout.as_millis()
                        )))),
                    };
                    (index, call, call_started.elapsed())
                }
            })
            .collect();

        let mut in_flight = eligible;
        let mut cut_off = false;
        loop {
            match timeout_at(deadline, pending.next()).await {
                Ok(Some((index, call, elapsed))) => {
                    in_flight.retain(|&i| i != index);
                    match call {
                        Call::Finished(result) => self.record(index, result, elapsed, run),
                        Call::CutOff => {
                            self.abandon(index, elapsed, run);
                            cut_off = true;
                        }
                    }
                }
                Ok(None) => return cut_off,
                Err(_) => {
                    let elapsed = self.config.budget();
                    for index in in_flight {
                        self.abandon(index, elapsed, run);
                    }
                    return true;
                }
            }
        }
    }

    /// Indices of the tier's providers that may be called now. The rest get a
    /// skipped outcome.
    fn gate(&self, tier: CostTier, run: &mut Run) -> Vec<usize> {
        let mut eligible = Vec::new();
        for (index, provider) in self.providers.iter().enumerate() {
            let descriptor = provider.descriptor();
            if descriptor.cost_tier != tier {
                continue;
            }
            let skip = if !descriptor.enabled {
                Some(SkipReason::Disabled)
            } else if !self.state.circuit_allows(&descriptor.id) {
                Some(SkipReason::CircuitOpen)
            } else if !self.state.rate_limiter().try_acquire(descriptor) {
                Some(SkipReason::RateLimited)
            } else {
                None
            };
            match skip {
                Some(reason) => {
                    tracing::debug!(provider = %descriptor.id, ?reason, "provider skipped");
                    run.outcomes[index] = Some(ProviderOutcome::skipped(
                        descriptor.id.clone(),
                        tier,
                        reason,
                    ));
                }
                None => eligible.push(index),
            }
        }
        eligible
    }

    fn skip_tier(&self, tier: CostTier, reason: SkipReason, run: &mut Run) {
        for (index, provider) in self.providers.iter().enumerate() {
            let descriptor = provider.descriptor();
            if descriptor.cost_tier == tier {
                run.outcomes[index] =
                    Some(ProviderOutcome::skipped(descriptor.id.clone(), tier, reason));
            }
        }
    }

    /// Whether the remaining budget exceeds the fastest enabled metered call.
    fn metered_fits(&self, deadline: Instant) -> bool {
        let remaining = deadline.saturating_duration_since(Instant::now());
        self.providers
            .iter()
            .map(|p| p.descriptor())
            .filter(|d| d.cost_tier == CostTier::Metered && d.enabled)
            .map(|d| d.min_latency)
            .min()
            .is_some_and(|fastest| remaining > fastest)
    }

    fn record(
        &self,
        index: usize,
        result: std::result::Result<Vec<CandidateRecord>, ProviderError>,
        elapsed: Duration,
        run: &mut Run,
    ) {
        let descriptor = self.providers[index].descriptor();
        self.state.record_call(descriptor, &result);

        let outcome = match result {
            Ok(mut candidates) => {
                candidates.truncate(self.config.max_results_per_provider);
                tracing::debug!(
                    provider = %descriptor.id,
                    count = candidates.len(),
                    elapsed_ms = millis(elapsed),
                    "provider returned candidates"
                );
                let count = candidates.len();
                run.candidates.extend(candidates);
                ProviderOutcome {
                    source: descriptor.id.clone(),
                    tier: descriptor.cost_tier,
                    status: ProviderStatus::Succeeded,
                    result_count: count,
                    error: None,
                    detail: None,
                    skip_reason: None,
                    elapsed_ms: millis(elapsed),
                }
            }
            Err(err) => {
                if matches!(err, ProviderError::Unavailable(_)) {
                    tracing::debug!(provider = %descriptor.id, error = %err, "provider unavailable");
                } else {
                    tracing::warn!(provider = %descriptor.id, error = %err, "provider call failed");
                }
                ProviderOutcome {
                    source: descriptor.id.clone(),
                    tier: descriptor.cost_tier,
                    status: ProviderStatus::Failed,
                    result_count: 0,
                    error: Some(err.kind()),
                    detail: Some(err.to_string()),
                    skip_reason: None,
                    elapsed_ms: millis(elapsed),
                }
            }
        };
        run.outcomes[index] = Some(outcome);
    }

    fn abandon(&self, index: usize, elapsed: Duration, run: &mut Run) {
        let descriptor = self.providers[index].descriptor();
        let err = ProviderError::Timeout("global deadline reached".into());
        self.state.record_call::<()>(descriptor, &Err(err.clone()));
        tracing::warn!(provider = %descriptor.id, "provider abandoned at deadline");
        run.outcomes[index] = Some(ProviderOutcome {
            source: descriptor.id.clone(),
            tier: descriptor.cost_tier,
            status: ProviderStatus::Abandoned,
            result_count: 0,
            error: Some(err.kind()),
            detail: Some(err.to_string()),
            skip_reason: None,
            elapsed_ms: millis(elapsed),
        });
    }

    /// Aggregate and validate everything collected so far.
    fn evaluate(&self, ctx: &SearchContext, candidates: &[CandidateRecord]) -> Evaluation {
        let weights: SourceWeights = self
            .providers
            .iter()
            .map(|p| {
                let d = p.descriptor();
                (d.id.clone(), d.quality_weight)
            })
            .collect();
        let merged = aggregate(candidates.to_vec(), &weights);
        let deduplicated = merged.len();
        let (people, rejections) = Validator::new(ctx, &self.tables.companies)
            .with_keywords(&self.tables.keywords)
            .apply(merged);
        Evaluation {
            people,
            deduplicated,
            rejections,
        }
    }

    /// Run the enricher on a copy of the records, keeping the copy only if it
    /// finished in time.
    async fn enrich(
        &self,
        ctx: &SearchContext,
        people: &mut Vec<PersonRecord>,
        started: Instant,
        deadline: Instant,
    ) -> EnrichmentOutcome {
        let Some(enricher) = &self.enricher else {
            return EnrichmentOutcome::NotConfigured;
        };
        let now = Instant::now();
        if now.duration_since(started) >= self.config.enrichment_cutoff() {
            tracing::debug!(enricher = enricher.name(), "enrichment skipped, search is late");
            return EnrichmentOutcome::Skipped;
        }

        let limit = self
            .config
            .enrichment_timeout()
            .min(deadline.saturating_duration_since(now));
        let mut draft = people.clone();
        match timeout(limit, enricher.enrich(ctx, &mut draft)).await {
            Ok(Ok(())) => {
                for person in &mut draft {
                    person.confidence = clamp_unit(person.confidence);
                }
                *people = draft;
                EnrichmentOutcome::Completed
            }
            Ok(Err(err)) => {
                tracing::warn!(enricher = enricher.name(), error = %err, "enrichment failed");
                EnrichmentOutcome::Failed
            }
            Err(_) => {
                tracing::warn!(enricher = enricher.name(), "enrichment timed out");
                EnrichmentOutcome::TimedOut
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
