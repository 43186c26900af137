//! Optional post-processing hook run on validated people.
//!
//! An enricher may fill in fields (contact details, skills, location) from a
//! slower source. It is bounded by its own deadline and skipped outright when
//! the search is already late, so it can never push a search past its budget.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::{PersonRecord, SearchContext};

/// Post-processing over validated people.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Enrich `people` in place.
    ///
    /// If the call is cancelled or fails, the orchestrator continues with the
    /// records as they were before the call.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the upstream lookup failed.
    async fn enrich(
        &self,
        ctx: &SearchContext,
        people: &mut Vec<PersonRecord>,
    ) -> Result<(), ProviderError>;
}
