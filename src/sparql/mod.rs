//! SPARQL endpoint abstraction for the query runner.
//!
//! Provides a trait-based interface for executing SPARQL queries, allowing
//! the HTTP client to be swapped for mocks or other transports.

mod http;
mod mock;
mod types;

pub use http::HttpSparqlClient;
pub use mock::{FailingSparqlClient, MockSparqlClient, NOOP_RESULTS};
pub use types::{Binding, Head, Results, SparqlResults, Term};

use crate::config::CmemConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Media type requested from the SPARQL endpoint.
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Creates a SPARQL client for the given configuration.
///
/// This is the central factory function for endpoint connections.
pub fn connect(config: &CmemConfig, timeout_secs: u64) -> Result<Box<dyn SparqlClient>> {
    let client = HttpSparqlClient::new(config.clone(), timeout_secs)?;
    Ok(Box::new(client))
}

/// Trait defining the interface for SPARQL clients.
///
/// All operations are async and return Results with RunnerError.
#[async_trait]
pub trait SparqlClient: Send + Sync {
    /// Executes a SPARQL query and returns the raw SPARQL results JSON.
    async fn execute(&self, query: &str) -> Result<String>;
}
