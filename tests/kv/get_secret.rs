use std::collections::HashMap;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultlib::{Client, Error, Secret};

use crate::common::{self, RecordingTransport, TEST_TOKEN};

async fn connected(mock_server: &MockServer) -> Client {
    common::mount_lookup_self(mock_server, 0, false).await;

    Client::connect(common::token_config(&mock_server.uri()))
        .await
        .unwrap()
}

fn v2_data(data: Value, version: u64) -> Value {
    common::data_body(json!({
        "data": data,
        "metadata": {
            "created_time": "2018-03-22T02:24:06.945319214Z",
            "deletion_time": "",
            "destroyed": false,
            "version": version
        }
    }))
}

#[tokio::test]
async fn v1_secret() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/internal/ui/mounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::mounts_body()))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/kv_v1/path/my-secret"))
        .and(header("X-Vault-Token", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::data_body(json!({
            "user": "admin",
            "password": "hunter2"
        }))))
        .expect(2)
        .mount(&mock_server)
        .await;

    let first = client.get_secret("kv_v1/path/my-secret").await.unwrap();
    assert_eq!(first.get("user"), Some("admin"));
    assert_eq!(first.get("password"), Some("hunter2"));
    assert_eq!(first.as_kv().unwrap().len(), 2);

    let second = client.get_secret("kv_v1/path/my-secret").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn v2_secret() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;
    common::mount_mounts(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/kv_v2/path/data/my-secret"))
        .and(header("X-Vault-Token", TEST_TOKEN))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(v2_data(json!({"api-key": "abc123"}), 1)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let secret = client.get_secret("kv_v2/path/my-secret").await.unwrap();

    let mut expected = HashMap::new();
    expected.insert("api-key".to_string(), "abc123".to_string());
    assert_eq!(secret, Secret::Kv(expected));
}

#[tokio::test]
async fn v2_secret_picks_up_updates() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;
    common::mount_mounts(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/kv_v2/path/data/rotating"))
        .respond_with(ResponseTemplate::new(200).set_body_json(v2_data(json!({"value": "first"}), 1)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/kv_v2/path/data/rotating"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(v2_data(json!({"value": "second"}), 2)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let first = client.get_secret("kv_v2/path/rotating").await.unwrap();
    assert_eq!(first.get("value"), Some("first"));

    let second = client.get_secret("kv_v2/path/rotating").await.unwrap();
    assert_eq!(second.get("value"), Some("second"));
}

#[derive(Deserialize, Debug, PartialEq)]
struct Nested {
    a: String,
    b: HashMap<String, u32>,
}

#[tokio::test]
async fn json_secret() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;
    common::mount_mounts(&mock_server).await;

    let document = json!({"a": "x", "b": {"nested": 1}});
    Mock::given(method("GET"))
        .and(path("/v1/kv_v2/path/data/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(v2_data(document.clone(), 1)))
        .mount(&mock_server)
        .await;

    let secret = client.get_secret("kv_v2/path/json").await.unwrap();
    assert!(secret.as_kv().is_none());
    assert_eq!(secret.get("a"), None);

    let raw: Value = serde_json::from_str(secret.as_json().unwrap().get()).unwrap();
    assert_eq!(raw, document);

    let nested: Nested = secret.deserialize().unwrap();
    assert_eq!(nested.a, "x");
    assert_eq!(nested.b.get("nested"), Some(&1));
}

#[tokio::test]
async fn unknown_mount() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;
    common::mount_mounts(&mock_server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/unknown/.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = client.get_secret("unknown/my-secret").await.unwrap_err();
    assert!(matches!(err, Error::KvVersionNotFound(ref p) if p == "unknown/my-secret"));
}

#[tokio::test]
async fn missing_secret() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;
    common::mount_mounts(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/kv_v2/path/data/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"errors":[]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = client.get_secret("kv_v2/path/missing").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    let message = err.to_string();
    assert!(message.contains("404 Not Found"), "{}", message);
    assert!(message.contains(r#"{"errors":[]}"#), "{}", message);
}

#[tokio::test]
async fn mount_table_not_readable() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/internal/ui/mounts"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"errors": ["permission denied"]})))
        .mount(&mock_server)
        .await;

    let err = client.get_secret("kv_v1/path/my-secret").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
}

#[tokio::test]
async fn malformed_mount_table() {
    let mock_server = MockServer::start().await;
    let client = connected(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/v1/sys/internal/ui/mounts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = client.get_secret("kv_v1/path/my-secret").await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn reserved_characters_are_part_of_the_path() {
    let transport = RecordingTransport::new();
    transport.respond(
        Method::GET,
        "/v1/auth/token/lookup-self",
        200,
        common::lookup_self_body(TEST_TOKEN, 0, false),
    );
    transport.respond(Method::GET, "/v1/sys/internal/ui/mounts", 200, common::mounts_body());
    transport.respond(
        Method::GET,
        "/v1/kv_v1/path/a",
        200,
        common::data_body(json!({"who": "a"})),
    );
    transport.respond(
        Method::GET,
        "/v1/kv_v1/path/a%23b",
        200,
        common::data_body(json!({"who": "a#b"})),
    );
    transport.respond(
        Method::GET,
        "/v1/kv_v1/path/a%3Fb",
        200,
        common::data_body(json!({"who": "a?b"})),
    );

    let client = Client::connect_with_transport(
        common::token_config("http://vault.test:8200"),
        transport.clone(),
    )
    .await
    .unwrap();

    let secret = client.get_secret("kv_v1/path/a#b").await.unwrap();
    assert_eq!(secret.get("who"), Some("a#b"));
    assert_eq!(transport.calls().pop().unwrap().path, "/v1/kv_v1/path/a%23b");

    let secret = client.get_secret("kv_v1/path/a?b").await.unwrap();
    assert_eq!(secret.get("who"), Some("a?b"));
    assert_eq!(transport.calls().pop().unwrap().path, "/v1/kv_v1/path/a%3Fb");

    assert_eq!(transport.count(&Method::GET, "/v1/kv_v1/path/a"), 0);
}
