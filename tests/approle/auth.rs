use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vaultlib::{AppRoleCredentials, AuthState, Client, Config, Error};

use crate::common::{self, RecordingTransport};

const ROLE_ID: &str = "testID";
const SECRET_ID: &str = "testSecret";
const APPROLE_TOKEN: &str = "approleToken";

fn login_body(lease_duration: u64, renewable: bool) -> Value {
    json!({
        "request_id": "1a2b3c4d-5e6f-7a8b-9c0d-1e2f3a4b5c6d",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": null,
        "wrap_info": null,
        "warnings": null,
        "auth": {
            "client_token": APPROLE_TOKEN,
            "accessor": "testAccessor",
            "policies": ["default", "web"],
            "token_policies": ["default", "web"],
            "metadata": {"role_name": "web"},
            "lease_duration": lease_duration,
            "renewable": renewable,
            "entity_id": "0b1c2d3e-4f5a-6b7c-8d9e-0f1a2b3c4d5e",
            "token_type": "service",
            "orphan": true
        }
    })
}

fn approle_config(address: &str, credentials: AppRoleCredentials) -> Config {
    Config {
        address: address.to_string(),
        approle: credentials,
        ..Default::default()
    }
}

#[tokio::test]
async fn valid_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .and(body_json(json!({"role_id": ROLE_ID, "secret_id": SECRET_ID})))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(0, false)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", APPROLE_TOKEN))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::lookup_self_body(APPROLE_TOKEN, 0, false)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = approle_config(&mock_server.uri(), AppRoleCredentials::new(ROLE_ID, SECRET_ID));
    let client = Client::connect(config).await.unwrap();

    assert!(client.is_authenticated());
    assert_eq!(client.status(), "Token ready");
    assert_eq!(client.token_id(), APPROLE_TOKEN);
    // the lookup wins over the login response
    assert_eq!(client.token_info().path, "auth/token/create");
}

#[tokio::test]
async fn custom_mount_point() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/custom-approle/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body(0, false)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::lookup_self_body(APPROLE_TOKEN, 0, false)),
        )
        .mount(&mock_server)
        .await;

    let credentials = AppRoleCredentials {
        mount_point: "/custom-approle/".to_string(),
        ..AppRoleCredentials::new(ROLE_ID, SECRET_ID)
    };
    let client = Client::connect(approle_config(&mock_server.uri(), credentials))
        .await
        .unwrap();

    assert!(client.is_authenticated());
}

#[tokio::test]
async fn rejected_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/approle/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"errors": ["invalid role or secret ID"]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = approle_config(&mock_server.uri(), AppRoleCredentials::new(ROLE_ID, "wrong"));
    let err = Client::connect(config).await.unwrap_err();

    assert!(matches!(err.error(), Error::AuthenticationFailed(_)));
    assert_eq!(err.error().status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.to_string().contains("invalid role or secret ID"));

    let client = err.client().unwrap();
    assert_eq!(client.auth_state(), AuthState::Failed);
    assert!(!client.is_authenticated());
    assert_eq!(client.token_id(), "");
}

#[tokio::test]
async fn login_without_auth_block() {
    let transport = RecordingTransport::new();
    transport.respond(
        Method::POST,
        "/v1/auth/approle/login",
        200,
        json!({"request_id": "", "data": null, "auth": null}),
    );

    let config = approle_config("http://vault.test:8200", AppRoleCredentials::new(ROLE_ID, SECRET_ID));
    let err = Client::connect_with_transport(config, transport.clone())
        .await
        .unwrap_err();

    match err.error() {
        Error::AuthenticationFailed(inner) => assert!(matches!(**inner, Error::Decode { .. })),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(transport.count(&Method::GET, "/v1/auth/token/lookup-self"), 0);
}

#[tokio::test]
async fn only_lookup_carries_the_new_token() {
    let transport = RecordingTransport::new();
    transport.respond(Method::POST, "/v1/auth/approle/login", 200, login_body(60, true));
    transport.respond(
        Method::GET,
        "/v1/auth/token/lookup-self",
        200,
        common::lookup_self_body(APPROLE_TOKEN, 60, true),
    );

    let config = approle_config("http://vault.test:8200", AppRoleCredentials::new(ROLE_ID, SECRET_ID));
    let client = Client::connect_with_transport(config, transport.clone())
        .await
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].path, "/v1/auth/approle/login");
    assert_eq!(calls[0].token, None);
    assert_eq!(
        calls[0].body,
        Some(json!({"role_id": ROLE_ID, "secret_id": SECRET_ID}))
    );
    assert_eq!(calls[1].path, "/v1/auth/token/lookup-self");
    assert_eq!(calls[1].token.as_deref(), Some(APPROLE_TOKEN));

    assert!(client.is_renewing());
    client.stop_renewal();
}
