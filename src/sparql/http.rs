//! HTTP SPARQL client for Corporate Memory.
//!
//! Obtains an OAuth 2.0 access token and posts queries to the DataPlatform
//! SPARQL proxy endpoint using reqwest.

use async_trait::async_trait;
use reqwest::{Certificate, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{CmemConfig, ConfigKey, GrantType};
use crate::error::{RunnerError, Result};
use crate::sparql::{SparqlClient, SPARQL_RESULTS_JSON};

/// SPARQL client talking to a Corporate Memory instance over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSparqlClient {
    config: CmemConfig,
    client: Client,
    sparql_endpoint: String,
    token_uri: String,
}

impl HttpSparqlClient {
    /// Creates a new client for the given configuration.
    ///
    /// Fails if the configuration is incomplete or the TLS setup cannot be
    /// built.
    pub fn new(config: CmemConfig, timeout_secs: u64) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));

        if !config.ssl_verify() {
            debug!("TLS certificate verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = config.ca_bundle() {
            let pem = std::fs::read(&path).map_err(|e| {
                RunnerError::config(format!(
                    "Failed to read {} '{}': {e}",
                    ConfigKey::RequestsCaBundle,
                    path.display()
                ))
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| {
                RunnerError::config(format!("Invalid CA bundle '{}': {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| RunnerError::connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            sparql_endpoint: config.sparql_endpoint()?,
            token_uri: config.token_uri()?,
            config,
            client,
        })
    }

    /// Returns the SPARQL endpoint URL.
    pub fn sparql_endpoint(&self) -> &str {
        &self.sparql_endpoint
    }

    /// Returns the OAuth token endpoint URL.
    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Builds the form parameters of the token request.
    fn token_form(&self) -> Result<Vec<(&'static str, String)>> {
        let grant_type = self.config.grant_type()?;
        let mut form = vec![
            ("grant_type", grant_type.as_str().to_string()),
            ("client_id", self.config.client_id().to_string()),
        ];

        let required = |key: ConfigKey| {
            self.config
                .get(key)
                .map(str::to_string)
                .ok_or_else(|| RunnerError::config(format!("{key} is required")))
        };

        match grant_type {
            GrantType::ClientCredentials => {
                form.push(("client_secret", required(ConfigKey::OauthClientSecret)?));
            }
            GrantType::Password => {
                form.push(("username", required(ConfigKey::OauthUser)?));
                form.push(("password", required(ConfigKey::OauthPassword)?));
            }
        }
        Ok(form)
    }

    /// Requests an access token from the OAuth token endpoint.
    async fn fetch_token(&self) -> Result<String> {
        debug!("Requesting access token from {}", self.token_uri);

        let response = self
            .client
            .post(&self.token_uri)
            .form(&self.token_form()?)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RunnerError::connection(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            return Err(parse_token_error(status, &body));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RunnerError::auth(format!("Failed to parse token response: {e}")))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl SparqlClient for HttpSparqlClient {
    async fn execute(&self, query: &str) -> Result<String> {
        let token = self.fetch_token().await?;

        debug!("Posting query to {}", self.sparql_endpoint);
        let response = self
            .client
            .post(&self.sparql_endpoint)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)])
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RunnerError::connection(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(RunnerError::query(format!(
                "SPARQL endpoint returned {status}: {}",
                body.trim()
            )));
        }

        Ok(body)
    }
}

/// OAuth token endpoint success response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth token endpoint error response.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Maps a failed token response to an authentication error.
fn parse_token_error(status: StatusCode, body: &str) -> RunnerError {
    if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(body) {
        return match error.error_description {
            Some(description) => {
                RunnerError::auth(format!("{} ({status}): {description}", error.error))
            }
            None => RunnerError::auth(format!("{} ({status})", error.error)),
        };
    }
    RunnerError::auth(format!("Token endpoint returned {status}: {}", body.trim()))
}

/// Maps a transport-level reqwest error.
fn map_request_error(error: reqwest::Error) -> RunnerError {
    if error.is_timeout() {
        RunnerError::connection(format!("Request timed out: {error}"))
    } else if error.is_connect() {
        RunnerError::connection(format!("Cannot connect: {error}"))
    } else {
        RunnerError::connection(error.to_string())
    }
}
