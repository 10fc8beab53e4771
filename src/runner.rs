//! Query runner for eccenca Corporate Memory.
//!
//! Implements the host's query runner interface: SPARQL text goes to the
//! endpoint through a [`SparqlClient`], and the SPARQL results come back as
//! the host's tabular JSON.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::config::{CmemConfig, QueryPolicy, RunnerOptions};
use crate::environment::{self, ProcessEnvironment};
use crate::error::{RunnerError, Result};
use crate::result;
use crate::safety::SparqlClassifier;
use crate::schema;
use crate::sparql::{self, SparqlClient};

/// Type identifier of the Corporate Memory runner.
pub const RUNNER_TYPE: &str = "corporate_memory";

/// Display name of the Corporate Memory runner.
pub const RUNNER_NAME: &str = "eccenca Corporate Memory (SPARQL)";

/// Query used to test a connection.
pub const NOOP_QUERY: &str = "SELECT ?noop WHERE {BIND('noop' as ?noop)}";

/// Identity of a runner as shown to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerDescriptor {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub runner_type: &'static str,
    pub enabled: bool,
    pub should_annotate_query: bool,
}

/// Trait defining the host's interface for query runners.
#[async_trait]
pub trait QueryRunner: Send + Sync {
    /// Display name of the data source type.
    fn name(&self) -> &'static str;

    /// Type identifier of the data source.
    fn runner_type(&self) -> &'static str;

    /// Returns true if the runner can execute queries.
    fn enabled(&self) -> bool;

    /// Why the runner is disabled, if it is.
    fn disabled_reason(&self) -> Option<String> {
        None
    }

    /// Whether the host may prepend metadata comments to queries.
    fn should_annotate_query(&self) -> bool {
        true
    }

    /// A cheap query used to test the connection.
    fn noop_query(&self) -> Option<&'static str> {
        None
    }

    /// JSON schema of the configuration the host should collect.
    fn configuration_schema(&self) -> serde_json::Value;

    /// Runs a query, returning the tabular result JSON and an optional error.
    async fn run_query(&self, query: &str) -> Result<(String, Option<String>)>;

    /// Tests the connection by running the noop query.
    async fn test_connection(&self) -> Result<()> {
        let query = self
            .noop_query()
            .ok_or_else(|| RunnerError::internal("Runner does not support connection tests"))?;
        let (_, error) = self.run_query(query).await?;
        match error {
            Some(message) => Err(RunnerError::query(message)),
            None => Ok(()),
        }
    }

    /// Returns the identity of this runner.
    fn descriptor(&self) -> RunnerDescriptor {
        RunnerDescriptor {
            name: self.name(),
            runner_type: self.runner_type(),
            enabled: self.enabled(),
            should_annotate_query: self.should_annotate_query(),
        }
    }
}

/// Query runner using eccenca Corporate Memory as a data source.
pub struct CorporateMemoryRunner {
    config: CmemConfig,
    options: RunnerOptions,
    client: std::result::Result<Box<dyn SparqlClient>, String>,
    classifier: SparqlClassifier,
}

impl CorporateMemoryRunner {
    /// Creates a runner connecting over HTTP.
    ///
    /// If no client can be built from `config`, the runner is created
    /// disabled and reports the reason.
    pub fn new(config: CmemConfig, options: RunnerOptions) -> Self {
        let client = match sparql::connect(&config, options.timeout_secs) {
            Ok(client) => Ok(client),
            Err(e) => {
                warn!("{} disabled: {}", RUNNER_NAME, e);
                Err(e.to_string())
            }
        };
        Self::build(config, options, client)
    }

    /// Creates a runner from a host key/value configuration mapping.
    pub fn from_mapping(mapping: &serde_json::Value, options: RunnerOptions) -> Result<Self> {
        Ok(Self::new(CmemConfig::from_mapping(mapping)?, options))
    }

    /// Creates a runner using the given SPARQL client.
    pub fn with_client(
        config: CmemConfig,
        options: RunnerOptions,
        client: Box<dyn SparqlClient>,
    ) -> Self {
        Self::build(config, options, Ok(client))
    }

    /// Creates a runner without a client.
    pub fn disabled(config: CmemConfig, options: RunnerOptions, reason: impl Into<String>) -> Self {
        Self::build(config, options, Err(reason.into()))
    }

    fn build(
        config: CmemConfig,
        options: RunnerOptions,
        client: std::result::Result<Box<dyn SparqlClient>, String>,
    ) -> Self {
        let classifier = config
            .base_uri()
            .filter(|base| Url::parse(base).is_ok())
            .map(SparqlClassifier::with_base_iri)
            .unwrap_or_default();
        Self {
            config,
            options,
            client,
            classifier,
        }
    }

    /// Returns the connection configuration.
    pub fn config(&self) -> &CmemConfig {
        &self.config
    }

    /// Applies the query policy to `query`.
    fn check_policy(&self, query: &str) -> Result<()> {
        if self.options.policy == QueryPolicy::Allow {
            return Ok(());
        }

        let classification = self.classifier.classify(query);
        if classification.is_read_only() {
            return Ok(());
        }

        let mut message = format!(
            "{} request classified as {}",
            classification.statement_type, classification.level
        );
        if let Some(warning) = &classification.warning {
            message.push_str(": ");
            message.push_str(warning);
        }

        match self.options.policy {
            QueryPolicy::ReadOnly => Err(RunnerError::rejected(format!(
                "{message} (only read-only queries are allowed)"
            ))),
            _ => {
                warn!("{}", message);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl QueryRunner for CorporateMemoryRunner {
    fn name(&self) -> &'static str {
        RUNNER_NAME
    }

    fn runner_type(&self) -> &'static str {
        RUNNER_TYPE
    }

    fn enabled(&self) -> bool {
        self.client.is_ok()
    }

    fn disabled_reason(&self) -> Option<String> {
        self.client.as_ref().err().cloned()
    }

    // Metadata comments are not wanted in SPARQL queries
    fn should_annotate_query(&self) -> bool {
        false
    }

    fn noop_query(&self) -> Option<&'static str> {
        Some(NOOP_QUERY)
    }

    fn configuration_schema(&self) -> serde_json::Value {
        schema::configuration_schema().to_value()
    }

    async fn run_query(&self, query: &str) -> Result<(String, Option<String>)> {
        let client = self
            .client
            .as_ref()
            .map_err(|reason| RunnerError::unavailable(reason.clone()))?;

        info!("about to execute query: {}", query);
        self.check_policy(query)?;

        let raw = if self.options.stage_environment {
            let _guard = environment::staging_lock().lock().await;
            environment::stage(&self.config, &mut ProcessEnvironment);
            client.execute(query).await?
        } else {
            client.execute(query).await?
        };

        let data = result::translate(&raw)?;
        Ok((data, None))
    }
}
