//! Command-line argument parsing for cmem-query.
//!
//! Uses clap to parse CLI arguments.

use cmem_query_runner::config::{CmemConfig, ConfigKey, QueryPolicy};
use cmem_query_runner::error::{Result, RunnerError};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

/// Run SPARQL queries against eccenca Corporate Memory and print tabular JSON.
#[derive(Parser, Debug)]
#[command(name = "cmem-query")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SPARQL query text
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Read the query from a file (use "-" for stdin)
    #[arg(short = 'f', long, value_name = "PATH", conflicts_with = "query")]
    pub file: Option<String>,

    /// Use named source from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", env = "CMEM_QUERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URI of the Corporate Memory instance
    #[arg(short = 'b', long, value_name = "URL")]
    pub base_uri: Option<String>,

    /// OAuth client id
    #[arg(long, value_name = "ID")]
    pub client_id: Option<String>,

    /// OAuth client secret (OAUTH_CLIENT_SECRET is used only if no config source sets one)
    #[arg(long, value_name = "SECRET")]
    pub client_secret: Option<String>,

    /// Handling of update requests: allow, warn, or read-only
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Stage the connection keys into the process environment before each query
    #[arg(long)]
    pub stage_environment: bool,

    /// Print the configuration schema and exit
    #[arg(long)]
    pub schema: bool,

    /// Print the runner identity and exit
    #[arg(long)]
    pub info: bool,

    /// Run the noop query to test the connection
    #[arg(long)]
    pub test_connection: bool,

    /// Print the resolved connection as shell exports (without secrets) and exit
    #[arg(long)]
    pub export: bool,

    /// Pretty-print the result JSON
    #[arg(long)]
    pub pretty: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI connection arguments to a CmemConfig.
    ///
    /// Returns None if no connection argument was given.
    pub fn to_cmem_config(&self) -> Option<CmemConfig> {
        let mut config = CmemConfig::new();
        if let Some(base_uri) = &self.base_uri {
            config.set(ConfigKey::CmemBaseUri, base_uri);
        }
        if let Some(client_id) = &self.client_id {
            config.set(ConfigKey::OauthClientId, client_id);
        }
        if let Some(client_secret) = &self.client_secret {
            config.set(ConfigKey::OauthClientSecret, client_secret);
        }
        (!config.is_empty()).then_some(config)
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(cmem_query_runner::config::Config::default_path)
    }

    /// Returns the named source to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }

    /// Parses the --policy argument.
    pub fn parse_policy(&self) -> std::result::Result<Option<QueryPolicy>, String> {
        self.policy.as_deref().map(str::parse).transpose()
    }

    /// Reads the query from the positional argument, a file, or stdin.
    pub fn read_query(&self) -> Result<Option<String>> {
        if let Some(query) = &self.query {
            return Ok(Some(query.clone()));
        }

        let Some(path) = &self.file else {
            return Ok(None);
        };

        let text = if path == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| RunnerError::config(format!("Failed to read query from stdin: {e}")))?;
            text
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| RunnerError::config(format!("Failed to read query file {path}: {e}")))?
        };
        Ok(Some(text))
    }
}
