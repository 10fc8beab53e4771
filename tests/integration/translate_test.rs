//! Result translation tests.
//!
//! Checks the tabular output invariants over a range of SPARQL results.

use cmem_query_runner::result::{translate, translate_results, TabularResult};
use cmem_query_runner::sparql::{Binding, Head, Results, SparqlResults, Term};
use cmem_query_runner::RunnerError;
use pretty_assertions::assert_eq;

/// Builds results with `vars` where row `i` binds every var whose index
/// divides `i + 1`.
fn sparse_results(vars: &[&str], rows: usize) -> SparqlResults {
    let bindings = (0..rows)
        .map(|i| {
            vars.iter()
                .enumerate()
                .filter(|(j, _)| (i + 1) % (j + 1) == 0)
                .map(|(j, var)| (var.to_string(), Term::literal(format!("{var}-{i}-{j}"))))
                .collect::<Binding>()
        })
        .collect();
    SparqlResults {
        head: Head {
            vars: vars.iter().map(|v| v.to_string()).collect(),
            link: Vec::new(),
        },
        results: Results { bindings },
    }
}

#[test]
fn test_every_row_has_every_column() {
    let vars = ["s", "p", "o", "g"];
    let results = sparse_results(&vars, 12);
    let table = translate_results(&results);

    assert_eq!(table.columns.len(), vars.len());
    assert_eq!(table.rows.len(), 12);
    for row in &table.rows {
        let keys: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vars.to_vec());
    }
}

#[test]
fn test_unbound_cells_are_empty_strings() {
    let vars = ["a", "b", "c"];
    let results = sparse_results(&vars, 6);
    let table = translate_results(&results);

    for (binding, row) in results.bindings().iter().zip(&table.rows) {
        for var in vars {
            match binding.get(var) {
                Some(term) => assert_eq!(Some(row[var].clone()), term.text()),
                None => assert_eq!(row[var], ""),
            }
        }
    }
}

#[test]
fn test_string_round_trip_matches_typed_translation() {
    let results = sparse_results(&["x", "y"], 5);
    let json = serde_json::to_string(&results).unwrap();

    let translated: TabularResult = serde_json::from_str(&translate(&json).unwrap()).unwrap();

    assert_eq!(translated, translate_results(&results));
}

#[test]
fn test_columns_are_strings_named_after_vars() {
    let input = r#"{"head":{"vars":["count","when"]},"results":{"bindings":[
        {"count":{"type":"literal","datatype":"http://www.w3.org/2001/XMLSchema#integer","value":"42"},
         "when":{"type":"literal","datatype":"http://www.w3.org/2001/XMLSchema#dateTime","value":"2024-01-01T00:00:00Z"}}
    ]}}"#;
    let value: serde_json::Value = serde_json::from_str(&translate(input).unwrap()).unwrap();

    assert_eq!(
        value["columns"],
        serde_json::json!([
            {"name": "count", "friendly_name": "count", "type": "string"},
            {"name": "when", "friendly_name": "when", "type": "string"}
        ])
    );
    assert_eq!(value["rows"][0]["count"], serde_json::json!("42"));
}

#[test]
fn test_no_vars() {
    let output = translate(r#"{"head":{"vars":[]},"results":{"bindings":[{},{}]}}"#).unwrap();
    assert_eq!(output, r#"{"columns":[],"rows":[{},{}]}"#);
}

#[test]
fn test_malformed_inputs() {
    for input in [
        "",
        "null",
        "[]",
        r#"{"head":{"vars":["x"]}}"#,
        r#"{"results":{"bindings":[]}}"#,
        r#"{"head":{"vars":"x"},"results":{"bindings":[]}}"#,
        r#"{"head":{"vars":["x"]},"results":{"bindings":[1]}}"#,
    ] {
        let err = translate(input).unwrap_err();
        assert!(
            matches!(err, RunnerError::MalformedInput(_)),
            "input {input:?} gave {err:?}"
        );
    }
}
