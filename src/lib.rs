//! # scout
//!
//! Finds recruiters, hiring managers, senior engineers and peers at a target
//! company. This crate wires configuration and source providers around the
//! [`scout_search`] pipeline and backs the `scout` command-line tool.

pub mod app;
pub mod config;
pub mod error;

pub use app::{build_orchestrator, build_providers, parse_context, run_search};
pub use config::ScoutConfig;
pub use error::{Result, ScoutError};
pub use scout_search;
