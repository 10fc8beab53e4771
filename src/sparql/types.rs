//! SPARQL 1.1 Query Results JSON types.
//!
//! Models the subset of <https://www.w3.org/TR/sparql11-results-json/> the
//! result translator reads: the projected variables and the bindings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, Result};

/// A SPARQL results document as returned by a SELECT query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SparqlResults {
    /// Header with the projected variables.
    pub head: Head,

    /// Result rows.
    pub results: Results,
}

impl SparqlResults {
    /// Parses a results document from its JSON text.
    ///
    /// Fails with [`RunnerError::MalformedInput`] if the text is not JSON or
    /// lacks `head.vars` / `results.bindings`.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RunnerError::malformed(format!("Invalid SPARQL results JSON: {e}")))
    }

    /// Returns the projected variable names in declaration order.
    pub fn vars(&self) -> &[String] {
        &self.head.vars
    }

    /// Returns the bindings in result order.
    pub fn bindings(&self) -> &[Binding] {
        &self.results.bindings
    }
}

/// The `head` object of a results document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Head {
    /// Projected variable names, in query order.
    pub vars: Vec<String>,

    /// Optional links to metadata documents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<String>,
}

/// The `results` object of a results document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Results {
    pub bindings: Vec<Binding>,
}

/// One solution: the bound subset of variables mapped to their terms.
pub type Binding = IndexMap<String, Term>;

/// An RDF term in a binding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Term {
    /// Term kind: `uri`, `literal`, `bnode` or `triple`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Term value. A string for IRIs, literals and blank nodes; an object
    /// for SPARQL-star triple terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Datatype IRI of a typed literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    /// Language tag of a language-tagged literal.
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Term {
    /// Creates a plain literal term.
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: Some("literal".to_string()),
            value: Some(serde_json::Value::String(value.into())),
            ..Default::default()
        }
    }

    /// Returns the value as text.
    ///
    /// String values are returned as-is; any other value is rendered as
    /// JSON. A missing or `null` value yields `None`.
    pub fn text(&self) -> Option<String> {
        match self.value.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
