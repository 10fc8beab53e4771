//! Host integration tests.
//!
//! Drives the runner the way a BI host does: build it from a key/value
//! mapping, register it, and run queries by type.

use cmem_query_runner::config::{CmemConfig, ConfigKey, QueryPolicy, RunnerOptions};
use cmem_query_runner::environment::{stage, Environment, MemoryEnvironment};
use cmem_query_runner::registry::Registry;
use cmem_query_runner::runner::{CorporateMemoryRunner, QueryRunner, RUNNER_TYPE};
use cmem_query_runner::sparql::MockSparqlClient;
use cmem_query_runner::RunnerError;
use serde_json::json;

#[tokio::test]
async fn test_registered_runner_runs_queries() {
    let response = r#"{"head":{"vars":["a","b"]},"results":{"bindings":[{"a":{"type":"literal","value":"1"}}]}}"#;
    let config = CmemConfig::from_mapping(&json!({"CMEM_BASE_URI": "https://x"})).unwrap();
    let runner = CorporateMemoryRunner::with_client(
        config,
        RunnerOptions::default(),
        Box::new(MockSparqlClient::with_response(response)),
    );

    let mut registry = Registry::new();
    assert!(registry.register(Box::new(runner)));

    let runner = registry.get(RUNNER_TYPE).unwrap();
    let (data, error) = runner.run_query("SELECT ?a ?b WHERE { ?a ?x ?b }").await.unwrap();

    assert!(error.is_none());
    let value: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(value["rows"], json!([{"a": "1", "b": ""}]));
}

#[test]
fn test_mapping_without_base_uri_stays_unregistered() {
    let runner = CorporateMemoryRunner::from_mapping(
        &json!({"OAUTH_CLIENT_ID": "cmem-service-account"}),
        RunnerOptions::default(),
    )
    .unwrap();

    let mut registry = Registry::new();
    assert!(!registry.register(Box::new(runner)));

    let descriptors = registry.descriptors();
    assert_eq!(
        serde_json::to_value(&descriptors).unwrap(),
        json!([{
            "name": "eccenca Corporate Memory (SPARQL)",
            "type": "corporate_memory",
            "enabled": false,
            "should_annotate_query": false
        }])
    );
}

#[tokio::test]
async fn test_read_only_host_setup() {
    let options = RunnerOptions {
        policy: QueryPolicy::ReadOnly,
        ..Default::default()
    };
    let client = MockSparqlClient::new();
    let runner = CorporateMemoryRunner::with_client(
        CmemConfig::new().with(ConfigKey::CmemBaseUri, "https://x"),
        options,
        Box::new(client.clone()),
    );

    let err = runner
        .run_query("DELETE WHERE { ?s ?p ?o }")
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::Rejected(_)));

    assert!(runner.test_connection().await.is_ok());
    assert_eq!(client.executed().len(), 1);
}

#[test]
fn test_staging_host_mapping() {
    let config = CmemConfig::from_mapping(&json!({"CMEM_BASE_URI": "https://x"})).unwrap();
    let mut env: MemoryEnvironment = [
        ("OAUTH_GRANT_TYPE", "password"),
        ("OAUTH_PASSWORD", "stale"),
        ("SSL_VERIFY", "false"),
        ("HOME", "/home/redash"),
    ]
    .into_iter()
    .collect();

    stage(&config, &mut env);

    let allow_listed: Vec<_> = ConfigKey::ALL
        .into_iter()
        .filter_map(|key| env.get(key.as_str()).map(|value| (key, value)))
        .collect();
    assert_eq!(
        allow_listed,
        vec![(ConfigKey::CmemBaseUri, "https://x".to_string())]
    );
    assert_eq!(env.get("HOME").as_deref(), Some("/home/redash"));
}

#[test]
fn test_schema_matches_runner() {
    let runner = CorporateMemoryRunner::disabled(CmemConfig::new(), RunnerOptions::default(), "n/a");
    let schema = runner.configuration_schema();

    assert_eq!(
        schema["required"],
        json!(["CMEM_BASE_URI", "OAUTH_GRANT_TYPE", "OAUTH_CLIENT_ID"])
    );
    for name in schema["properties"].as_object().unwrap().keys() {
        assert!(ConfigKey::parse(name).is_some());
    }
}
