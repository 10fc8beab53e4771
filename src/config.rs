//! Configuration management for the query runner.
//!
//! Handles the allow-listed Corporate Memory connection keys, building a
//! connection config from a host key/value mapping, loading named sources
//! from a TOML file, and environment variable defaults.

use crate::environment::Environment;
use crate::error::{RunnerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Default OAuth client id of the Corporate Memory service account.
pub const DEFAULT_CLIENT_ID: &str = "cmem-service-account";

/// Default request timeout for the SPARQL endpoint.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// The connection keys understood by Corporate Memory clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    CmemBaseProtocol,
    CmemBaseDomain,
    CmemBaseUri,
    SslVerify,
    RequestsCaBundle,
    DpApiEndpoint,
    DiApiEndpoint,
    OauthTokenUri,
    OauthGrantType,
    OauthUser,
    OauthPassword,
    OauthClientId,
    OauthClientSecret,
}

impl ConfigKey {
    /// All allow-listed keys, in staging order.
    pub const ALL: [ConfigKey; 13] = [
        Self::CmemBaseProtocol,
        Self::CmemBaseDomain,
        Self::CmemBaseUri,
        Self::SslVerify,
        Self::RequestsCaBundle,
        Self::DpApiEndpoint,
        Self::DiApiEndpoint,
        Self::OauthTokenUri,
        Self::OauthGrantType,
        Self::OauthUser,
        Self::OauthPassword,
        Self::OauthClientId,
        Self::OauthClientSecret,
    ];

    /// Returns the environment variable name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CmemBaseProtocol => "CMEM_BASE_PROTOCOL",
            Self::CmemBaseDomain => "CMEM_BASE_DOMAIN",
            Self::CmemBaseUri => "CMEM_BASE_URI",
            Self::SslVerify => "SSL_VERIFY",
            Self::RequestsCaBundle => "REQUESTS_CA_BUNDLE",
            Self::DpApiEndpoint => "DP_API_ENDPOINT",
            Self::DiApiEndpoint => "DI_API_ENDPOINT",
            Self::OauthTokenUri => "OAUTH_TOKEN_URI",
            Self::OauthGrantType => "OAUTH_GRANT_TYPE",
            Self::OauthUser => "OAUTH_USER",
            Self::OauthPassword => "OAUTH_PASSWORD",
            Self::OauthClientId => "OAUTH_CLIENT_ID",
            Self::OauthClientSecret => "OAUTH_CLIENT_SECRET",
        }
    }

    /// Parses a key from its environment variable name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }

    /// Returns true if values of this key must not be logged or displayed.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::OauthPassword | Self::OauthClientSecret)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth grant used to obtain an access token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GrantType {
    #[default]
    ClientCredentials,
    Password,
}

impl GrantType {
    /// Returns the grant type as sent to the token endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::Password => "password",
        }
    }

    /// Parses a grant type.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "client_credentials" => Some(Self::ClientCredentials),
            "password" => Some(Self::Password),
            _ => None,
        }
    }
}

/// Connection configuration for one Corporate Memory instance.
///
/// Holds only allow-listed keys. A key without a value, or with an empty
/// one, is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<String, String>"
)]
pub struct CmemConfig {
    values: BTreeMap<ConfigKey, String>,
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for CmemConfig {
    type Error = String;

    fn try_from(
        map: BTreeMap<String, serde_json::Value>,
    ) -> std::result::Result<Self, Self::Error> {
        let mut config = Self::new();
        for (name, value) in map {
            let key = ConfigKey::parse(&name)
                .ok_or_else(|| format!("unknown configuration key `{name}`"))?;
            if let Some(text) = scalar_text(key, &value)? {
                config.set(key, text);
            }
        }
        Ok(config)
    }
}

/// Renders a scalar configuration value as text.
///
/// Booleans and numbers keep their JSON text form; `null` is absent.
fn scalar_text(
    key: ConfigKey,
    value: &serde_json::Value,
) -> std::result::Result<Option<String>, String> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.clone())),
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => Ok(Some(value.to_string())),
        _ => Err(format!("{key} must be a string, got {value}")),
    }
}

impl From<CmemConfig> for BTreeMap<String, String> {
    fn from(config: CmemConfig) -> Self {
        config
            .values
            .into_iter()
            .map(|(key, value)| (key.as_str().to_string(), value))
            .collect()
    }
}

impl CmemConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a host key/value mapping.
    ///
    /// Unrecognised keys are ignored, `null` values are treated as absent,
    /// and booleans or numbers are kept in their JSON text form.
    pub fn from_mapping(mapping: &serde_json::Value) -> Result<Self> {
        let object = mapping
            .as_object()
            .ok_or_else(|| RunnerError::config("Configuration must be a JSON object"))?;

        let mut config = Self::new();
        for (name, value) in object {
            let Some(key) = ConfigKey::parse(name) else {
                debug!("Ignoring unknown configuration key {}", name);
                continue;
            };
            if let Some(text) = scalar_text(key, value).map_err(RunnerError::config)? {
                config.set(key, text);
            }
        }
        Ok(config)
    }

    /// Sets a key, returning the config for chaining.
    pub fn with(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a key. An empty value removes it.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    /// Returns the raw value of a key.
    pub fn get(&self, key: ConfigKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Iterates over the configured keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Returns true if no key is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &CmemConfig) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Applies environment variables as defaults for unset keys.
    pub fn apply_env_defaults(&mut self, env: &dyn Environment) {
        for key in ConfigKey::ALL {
            if self.values.contains_key(&key) {
                continue;
            }
            if let Some(value) = env.get(key.as_str()) {
                self.set(key, value);
            }
        }
    }

    /// Returns the base URI of the instance.
    ///
    /// Falls back to `CMEM_BASE_PROTOCOL://CMEM_BASE_DOMAIN` if `CMEM_BASE_URI`
    /// is not set.
    pub fn base_uri(&self) -> Option<String> {
        if let Some(uri) = self.get(ConfigKey::CmemBaseUri) {
            return Some(uri.trim_end_matches('/').to_string());
        }
        let domain = self.get(ConfigKey::CmemBaseDomain)?;
        let protocol = self.get(ConfigKey::CmemBaseProtocol).unwrap_or("https");
        Some(format!("{protocol}://{}", domain.trim_end_matches('/')))
    }

    /// Returns the DataPlatform API endpoint.
    pub fn dp_api_endpoint(&self) -> Result<String> {
        self.endpoint_or(ConfigKey::DpApiEndpoint, "/dataplatform")
    }

    /// Returns the OAuth token endpoint.
    pub fn token_uri(&self) -> Result<String> {
        self.endpoint_or(
            ConfigKey::OauthTokenUri,
            "/auth/realms/cmem/protocol/openid-connect/token",
        )
    }

    /// Returns the SPARQL query endpoint of the default DataPlatform proxy.
    pub fn sparql_endpoint(&self) -> Result<String> {
        Ok(format!("{}/proxy/default/sparql", self.dp_api_endpoint()?))
    }

    fn endpoint_or(&self, key: ConfigKey, suffix: &str) -> Result<String> {
        if let Some(endpoint) = self.get(key) {
            return Ok(endpoint.trim_end_matches('/').to_string());
        }
        let base = self.base_uri().ok_or_else(|| {
            RunnerError::config(format!("{key} or {} is required", ConfigKey::CmemBaseUri))
        })?;
        Ok(format!("{base}{suffix}"))
    }

    /// Returns the configured grant type, defaulting to `client_credentials`.
    pub fn grant_type(&self) -> Result<GrantType> {
        match self.get(ConfigKey::OauthGrantType) {
            None => Ok(GrantType::default()),
            Some(value) => GrantType::parse(value).ok_or_else(|| {
                RunnerError::config(format!(
                    "Invalid {}: '{value}'. Expected 'client_credentials' or 'password'",
                    ConfigKey::OauthGrantType
                ))
            }),
        }
    }

    /// Returns the OAuth client id, defaulting to the service account.
    pub fn client_id(&self) -> &str {
        self.get(ConfigKey::OauthClientId)
            .unwrap_or(DEFAULT_CLIENT_ID)
    }

    /// Returns whether TLS certificates are verified. Defaults to true.
    pub fn ssl_verify(&self) -> bool {
        match self.get(ConfigKey::SslVerify) {
            Some(value) => !matches!(
                value.trim().to_lowercase().as_str(),
                "false" | "0" | "no" | "off"
            ),
            None => true,
        }
    }

    /// Returns the path of an additional CA bundle, if configured.
    pub fn ca_bundle(&self) -> Option<PathBuf> {
        self.get(ConfigKey::RequestsCaBundle).map(PathBuf::from)
    }

    /// Checks that the configuration can be used to connect.
    pub fn validate(&self) -> Result<()> {
        let base = self.base_uri().ok_or_else(|| {
            RunnerError::config(format!("{} is required", ConfigKey::CmemBaseUri))
        })?;
        let url = Url::parse(&base)
            .map_err(|e| RunnerError::config(format!("Invalid base URI '{base}': {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RunnerError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        match self.grant_type()? {
            GrantType::ClientCredentials => {
                if self.get(ConfigKey::OauthClientSecret).is_none() {
                    return Err(RunnerError::config(format!(
                        "{} is required for grant type 'client_credentials'",
                        ConfigKey::OauthClientSecret
                    )));
                }
            }
            GrantType::Password => {
                for key in [ConfigKey::OauthUser, ConfigKey::OauthPassword] {
                    if self.get(key).is_none() {
                        return Err(RunnerError::config(format!(
                            "{key} is required for grant type 'password'"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns a display-safe string (no secrets) for UI purposes.
    pub fn display_string(&self) -> String {
        let base = self.base_uri().unwrap_or_else(|| "unknown".to_string());
        match self.grant_type() {
            Ok(GrantType::Password) => format!(
                "{} @ {base} (password)",
                self.get(ConfigKey::OauthUser).unwrap_or("unknown")
            ),
            _ => format!("{} @ {base}", self.client_id()),
        }
    }
}

/// Options controlling how queries are run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerOptions {
    /// How mutating SPARQL updates are handled.
    #[serde(default)]
    pub policy: QueryPolicy,

    /// Also stage the connection keys into the process environment.
    #[serde(default)]
    pub stage_environment: bool,

    /// Request timeout for the SPARQL endpoint.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            policy: QueryPolicy::default(),
            stage_environment: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Handling of queries that are not read-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryPolicy {
    /// Execute everything without classification.
    Allow,
    /// Execute everything, logging a warning for non-read-only queries.
    #[default]
    Warn,
    /// Reject queries that are not read-only.
    ReadOnly,
}

impl std::str::FromStr for QueryPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "warn" => Ok(Self::Warn),
            "read-only" | "readonly" => Ok(Self::ReadOnly),
            _ => Err(format!(
                "Invalid query policy: {s}. Expected: allow, warn, or read-only"
            )),
        }
    }
}

/// Main configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query runner options.
    #[serde(default)]
    pub runner: RunnerOptions,

    /// Named Corporate Memory sources.
    #[serde(default)]
    pub sources: HashMap<String, CmemConfig>,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cmem-query")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| RunnerError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            RunnerError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named source, or the default source if name is None.
    pub fn get_source(&self, name: Option<&str>) -> Option<&CmemConfig> {
        let key = name.unwrap_or("default");
        self.sources.get(key)
    }

    /// Resolves the connection of a source.
    ///
    /// The named source is layered over the `default` one. Without a name,
    /// the `default` source is used as-is, or an empty config if there is
    /// none.
    pub fn resolve_source(&self, name: Option<&str>) -> Result<CmemConfig> {
        let mut source = self.get_source(None).cloned().unwrap_or_default();
        if let Some(name) = name {
            let named = self.get_source(Some(name)).ok_or_else(|| {
                RunnerError::config(format!("Source '{name}' not found in config file"))
            })?;
            source.merge(named);
        }
        Ok(source)
    }
}
