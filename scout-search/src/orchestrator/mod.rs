//! The search pipeline after planning: tiered provider fan-out, cross-source
//! aggregation, employment validation, categorisation, and ranking.

pub mod aggregate;
pub mod categorize;
pub mod rank;
pub mod search;
pub mod url_normalize;
pub mod validate;

pub use search::SearchOrchestrator;
