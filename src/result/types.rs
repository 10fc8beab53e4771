//! Tabular result types for the host tool.
//!
//! Defines the `{columns, rows}` structure the host renders. Every value is a
//! string; no type inference is performed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{RunnerError, Result};

/// A host-side tabular result set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TabularResult {
    /// Column metadata, one per projected variable.
    pub columns: Vec<Column>,

    /// Rows keyed by column name.
    pub rows: Vec<Row>,
}

impl TabularResult {
    /// Creates a result with the given columns and rows.
    pub fn with_data(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Serializes the result to its compact JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RunnerError::internal(format!("Failed to serialize result: {e}")))
    }

    /// Serializes the result to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RunnerError::internal(format!("Failed to serialize result: {e}")))
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Name shown in the host's table header.
    pub friendly_name: String,

    /// Column data type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    /// Creates a string column whose friendly name equals its name.
    pub fn string(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            friendly_name: name.clone(),
            name,
            column_type: ColumnType::String,
        }
    }
}

/// Host column types. Only `string` is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
}

/// A row of data, keyed by column name in column order.
pub type Row = IndexMap<String, String>;
