//! Source provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::SourceProvider`].

pub mod apollo;
pub mod duckduckgo;
pub mod fixture;

pub use apollo::ApolloProvider;
pub use duckduckgo::DuckDuckGoProvider;
pub use fixture::StaticProvider;
