//! Mock SPARQL clients for testing.
//!
//! Provides in-memory endpoints for tests and offline runs.

use super::SparqlClient;
use crate::error::{RunnerError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Result document of the noop connection test query.
pub const NOOP_RESULTS: &str = r#"{"head":{"vars":["noop"]},"results":{"bindings":[{"noop":{"type":"literal","value":"noop"}}]}}"#;

/// A mock SPARQL client that returns a predefined response.
///
/// Every executed query is recorded and can be inspected with
/// [`MockSparqlClient::executed`].
#[derive(Debug, Clone)]
pub struct MockSparqlClient {
    response: String,
    executed: Arc<Mutex<Vec<String>>>,
}

impl MockSparqlClient {
    /// Creates a mock client answering every query with the noop result.
    pub fn new() -> Self {
        Self::with_response(NOOP_RESULTS)
    }

    /// Creates a mock client answering every query with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the queries executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

impl Default for MockSparqlClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SparqlClient for MockSparqlClient {
    async fn execute(&self, query: &str) -> Result<String> {
        self.executed
            .lock()
            .map_err(|_| RunnerError::internal("mock query log poisoned"))?
            .push(query.to_string());
        Ok(self.response.clone())
    }
}

/// A SPARQL client whose every query fails with a query error.
#[derive(Debug, Clone)]
pub struct FailingSparqlClient {
    message: String,
}

impl FailingSparqlClient {
    /// Creates a failing client with the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl SparqlClient for FailingSparqlClient {
    async fn execute(&self, _query: &str) -> Result<String> {
        Err(RunnerError::query(self.message.clone()))
    }
}
