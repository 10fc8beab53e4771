//! SPARQL to tabular result translation.
//!
//! Converts a SPARQL 1.1 JSON results document into the host's generic
//! `{columns, rows}` structure. Every projected variable becomes a string
//! column; unbound variables become empty strings.

mod types;

pub use types::{Column, ColumnType, Row, TabularResult};

use crate::error::Result;
use crate::sparql::{SparqlResults, Term};
use tracing::debug;

/// Translates a SPARQL results JSON string into a tabular result JSON string.
///
/// Fails with [`RunnerError::MalformedInput`](crate::error::RunnerError::MalformedInput)
/// if the input is not a SPARQL results document.
pub fn translate(sparql_results_json: &str) -> Result<String> {
    debug!("results are: {}", sparql_results_json);
    let results = SparqlResults::parse(sparql_results_json)?;
    translate_results(&results).to_json()
}

/// Translates parsed SPARQL results into a tabular result.
pub fn translate_results(results: &SparqlResults) -> TabularResult {
    let vars = results.vars();

    let rows = results
        .bindings()
        .iter()
        .map(|binding| {
            vars.iter()
                .map(|var| {
                    let value = binding
                        .get(var)
                        .and_then(Term::text)
                        .unwrap_or_default();
                    (var.clone(), value)
                })
                .collect::<Row>()
        })
        .collect();

    let columns = vars.iter().map(Column::string).collect();

    TabularResult::with_data(columns, rows)
}
