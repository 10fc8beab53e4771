//! HTTP client tests against a wiremock Corporate Memory instance.
//!
//! Covers token acquisition, the SPARQL request, and error mapping.

use cmem_query_runner::config::{CmemConfig, ConfigKey, RunnerOptions};
use cmem_query_runner::runner::{CorporateMemoryRunner, QueryRunner, NOOP_QUERY};
use cmem_query_runner::sparql::{HttpSparqlClient, SparqlClient, NOOP_RESULTS};
use cmem_query_runner::RunnerError;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const TOKEN_PATH: &str = "/auth/realms/cmem/protocol/openid-connect/token";
const SPARQL_PATH: &str = "/dataplatform/proxy/default/sparql";
const TOKEN: &str = r#"{"access_token":"abc123","token_type":"Bearer","expires_in":300}"#;

fn client_credentials(base_uri: &str) -> CmemConfig {
    CmemConfig::new()
        .with(ConfigKey::CmemBaseUri, base_uri)
        .with(ConfigKey::OauthClientSecret, "s3cret")
}

/// Decodes a form field from a recorded request body.
fn form(request: &Request, name: &str) -> Option<String> {
    url::form_urlencoded::parse(&request.body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn header_value<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|value| value.to_str().ok())
}

async fn mount_token(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_sparql(server: &MockServer, sparql_path: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(sparql_path))
        .and(header("authorization", "Bearer abc123"))
        .and(header("accept", "application/sparql-results+json"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn start_instance(results: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_token(&server, ResponseTemplate::new(200).set_body_string(TOKEN)).await;
    mount_sparql(
        &server,
        SPARQL_PATH,
        ResponseTemplate::new(200).set_body_string(results),
    )
    .await;
    server
}

async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

#[tokio::test]
async fn test_client_credentials_flow() {
    let server = start_instance(NOOP_RESULTS).await;
    let client = HttpSparqlClient::new(client_credentials(&server.uri()), 5).unwrap();

    let raw = client.execute(NOOP_QUERY).await.unwrap();
    assert_eq!(raw, NOOP_RESULTS);

    let requests = received(&server).await;
    assert_eq!(requests.len(), 2);

    let token = &requests[0];
    assert_eq!(token.url.path(), TOKEN_PATH);
    assert_eq!(form(token, "grant_type").as_deref(), Some("client_credentials"));
    assert_eq!(form(token, "client_id").as_deref(), Some("cmem-service-account"));
    assert_eq!(form(token, "client_secret").as_deref(), Some("s3cret"));

    let query = &requests[1];
    assert_eq!(query.url.path(), SPARQL_PATH);
    assert_eq!(header_value(query, "authorization"), Some("Bearer abc123"));
    assert_eq!(form(query, "query").as_deref(), Some(NOOP_QUERY));
}

#[tokio::test]
async fn test_password_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN))
        .expect(1)
        .mount(&server)
        .await;
    mount_sparql(
        &server,
        SPARQL_PATH,
        ResponseTemplate::new(200).set_body_string(NOOP_RESULTS),
    )
    .await;

    let config = CmemConfig::new()
        .with(ConfigKey::CmemBaseUri, server.uri())
        .with(ConfigKey::OauthGrantType, "password")
        .with(ConfigKey::OauthClientId, "cmemc")
        .with(ConfigKey::OauthUser, "admin")
        .with(ConfigKey::OauthPassword, "p@ss word");
    let client = HttpSparqlClient::new(config, 5).unwrap();

    client.execute(NOOP_QUERY).await.unwrap();

    let token = &received(&server).await[0];
    assert_eq!(form(token, "client_id").as_deref(), Some("cmemc"));
    assert_eq!(form(token, "username").as_deref(), Some("admin"));
    assert_eq!(form(token, "password").as_deref(), Some("p@ss word"));
    assert!(form(token, "client_secret").is_none());
}

#[tokio::test]
async fn test_non_ascii_query_is_sent_as_utf8() {
    let server = start_instance(NOOP_RESULTS).await;
    let client = HttpSparqlClient::new(client_credentials(&server.uri()), 5).unwrap();
    let query = "SELECT ?s WHERE { ?s ?p \"Zürich – 東京\" }";

    client.execute(query).await.unwrap();

    let requests = received(&server).await;
    assert_eq!(form(&requests[1], "query").as_deref(), Some(query));
}

#[tokio::test]
async fn test_token_failure_is_auth_error() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(401).set_body_string(
            r#"{"error":"unauthorized_client","error_description":"Invalid client secret"}"#,
        ),
    )
    .await;
    let client = HttpSparqlClient::new(client_credentials(&server.uri()), 5).unwrap();

    let err = client.execute(NOOP_QUERY).await.unwrap_err();

    assert!(matches!(err, RunnerError::Auth(_)));
    assert!(err.to_string().contains("Invalid client secret"));
    assert_eq!(received(&server).await.len(), 1);
}

#[tokio::test]
async fn test_query_failure_is_query_error() {
    let server = MockServer::start().await;
    mount_token(&server, ResponseTemplate::new(200).set_body_string(TOKEN)).await;
    mount_sparql(
        &server,
        SPARQL_PATH,
        ResponseTemplate::new(400).set_body_string("Parse error: Encountered \"SELEKT\""),
    )
    .await;
    let client = HttpSparqlClient::new(client_credentials(&server.uri()), 5).unwrap();

    let err = client.execute("SELEKT ?x").await.unwrap_err();

    assert!(matches!(err, RunnerError::Query(_)));
    assert!(err.to_string().contains("400"));
    assert!(err.to_string().contains("SELEKT"));
}

#[tokio::test]
async fn test_explicit_endpoints() {
    let server = MockServer::start().await;
    mount_token(&server, ResponseTemplate::new(200).set_body_string(TOKEN)).await;
    mount_sparql(
        &server,
        "/custom-dp/proxy/default/sparql",
        ResponseTemplate::new(200).set_body_string(NOOP_RESULTS),
    )
    .await;

    let config = CmemConfig::new()
        .with(ConfigKey::CmemBaseUri, "https://unused.example.com")
        .with(ConfigKey::DpApiEndpoint, format!("{}/custom-dp", server.uri()))
        .with(
            ConfigKey::OauthTokenUri,
            format!("{}{}", server.uri(), TOKEN_PATH),
        )
        .with(ConfigKey::OauthClientSecret, "s3cret");
    let client = HttpSparqlClient::new(config, 5).unwrap();

    let raw = client.execute(NOOP_QUERY).await.unwrap();

    assert_eq!(raw, NOOP_RESULTS);
    assert_eq!(
        received(&server).await[1].url.path(),
        "/custom-dp/proxy/default/sparql"
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // Pooled mock servers keep listening after drop, so use a released port
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = HttpSparqlClient::new(client_credentials(&base_uri), 5).unwrap();
    let err = client.execute(NOOP_QUERY).await.unwrap_err();

    assert!(matches!(err, RunnerError::Connection(_)));
}

#[tokio::test]
async fn test_runner_over_http() {
    let bindings = r#"{"head":{"vars":["s","label"]},"results":{"bindings":[
        {"s":{"type":"uri","value":"urn:a"},"label":{"type":"literal","value":"A"}},
        {"s":{"type":"uri","value":"urn:b"}}
    ]}}"#;
    let server = start_instance(bindings).await;
    let runner = CorporateMemoryRunner::new(
        client_credentials(&server.uri()),
        RunnerOptions::default(),
    );
    assert!(runner.enabled());

    let (data, error) = runner
        .run_query("SELECT ?s ?label WHERE { ?s ?p ?label }")
        .await
        .unwrap();

    assert!(error.is_none());
    let value: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(
        value["rows"],
        serde_json::json!([
            {"s": "urn:a", "label": "A"},
            {"s": "urn:b", "label": ""}
        ])
    );
}
