//! Error types for the Corporate Memory query runner.
//!
//! Defines the main error enum used throughout the crate.

use thiserror::Error;

/// Main error type for query runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Input that is not a SPARQL 1.1 JSON results document.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// No SPARQL client is available, so the runner is disabled.
    #[error("Runner unavailable: {0}")]
    Unavailable(String),

    /// Transport errors (host unreachable, TLS failure, timeouts, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// OAuth token acquisition errors (bad credentials, unknown client, etc.)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Query execution errors reported by the endpoint (syntax errors, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Query blocked by the configured query policy.
    #[error("Query rejected: {0}")]
    Rejected(String),

    /// Configuration errors (invalid config file, missing required keys, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RunnerError {
    /// Creates a malformed input error with the given message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Creates an unavailable error with the given message.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates an authentication error with the given message.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a rejected-query error with the given message.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "Malformed Input",
            Self::Unavailable(_) => "Runner Unavailable",
            Self::Connection(_) => "Connection Error",
            Self::Auth(_) => "Authentication Error",
            Self::Query(_) => "Query Error",
            Self::Rejected(_) => "Query Rejected",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using RunnerError.
pub type Result<T> = std::result::Result<T, RunnerError>;
