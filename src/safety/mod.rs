//! Query safety classification module.
//!
//! Parses SPARQL and classifies it as a read-only query, a mutating update,
//! or a destructive update, so the runner can flag or block anything that
//! writes to the knowledge graph.

mod parser;

pub use parser::{classify_sparql, SparqlClassifier};

use std::fmt;

/// Safety level classification for SPARQL requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SafetyLevel {
    /// Read-only query forms (SELECT, CONSTRUCT, ASK, DESCRIBE).
    Safe,
    /// Updates that add data or graphs (INSERT DATA, LOAD, CREATE).
    Mutating,
    /// Updates that remove data or graphs (DELETE, CLEAR, DROP).
    Destructive,
}

impl SafetyLevel {
    /// Returns true if this level is not read-only.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Mutating | Self::Destructive)
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The SPARQL query form or update operation detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Construct,
    Ask,
    Describe,
    InsertData,
    DeleteData,
    /// `DELETE`/`INSERT ... WHERE`; `true` if it has a delete template.
    Modify {
        deletes: bool,
    },
    Load,
    Clear,
    Create,
    Drop,
    /// Several update operations; contains the most dangerous one.
    Multiple(Box<StatementType>),
    /// Request could not be parsed.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Construct => write!(f, "CONSTRUCT"),
            Self::Ask => write!(f, "ASK"),
            Self::Describe => write!(f, "DESCRIBE"),
            Self::InsertData => write!(f, "INSERT DATA"),
            Self::DeleteData => write!(f, "DELETE DATA"),
            Self::Modify { deletes: true } => write!(f, "DELETE/INSERT"),
            Self::Modify { deletes: false } => write!(f, "INSERT"),
            Self::Load => write!(f, "LOAD"),
            Self::Clear => write!(f, "CLEAR"),
            Self::Create => write!(f, "CREATE"),
            Self::Drop => write!(f, "DROP"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SPARQL request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The query form or update operation(s) detected.
    pub statement_type: StatementType,
    /// Optional warning message for the user.
    pub warning: Option<String>,
}

impl ClassificationResult {
    /// Creates a new classification result.
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
            warning: None,
        }
    }

    /// Creates a classification result with a warning message.
    pub fn with_warning(
        level: SafetyLevel,
        statement_type: StatementType,
        warning: impl Into<String>,
    ) -> Self {
        Self {
            level,
            statement_type,
            warning: Some(warning.into()),
        }
    }

    /// Returns true if the request only reads data.
    pub fn is_read_only(&self) -> bool {
        !self.level.is_write()
    }
}
