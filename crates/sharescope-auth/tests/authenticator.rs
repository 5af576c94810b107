//! Token acquisition against a mock token endpoint.

use jsonwebtoken::Algorithm;
use serde_json::json;
use sharescope_auth::{AuthError, Authenticator, TokenSource};
use sharescope_core::{AuthMode, IntegrationOptions};
use std::path::PathBuf;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE_THUMBPRINT_X5T: &str = "hdtDJIsif4PLmcdewSqM14kbVfs";

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

fn secret_options(auth_host: &str) -> IntegrationOptions {
    IntegrationOptions {
        host: "https://contoso.sharepoint.com".to_string(),
        auth_host: auth_host.to_string(),
        tenant_id: "tenant-1".to_string(),
        client_id: "client-1".to_string(),
        client_secret: "s3cret".to_string(),
        ..IntegrationOptions::default()
    }
}

fn certificate_options(private_key: &str, passphrase: &str) -> IntegrationOptions {
    IntegrationOptions {
        host: "https://contoso.sharepoint.com".to_string(),
        tenant_id: "tenant-1".to_string(),
        client_id: "client-1".to_string(),
        auth_mode: AuthMode::Certificate,
        private_key_path: fixture(private_key),
        private_key_passphrase: passphrase.to_string(),
        public_key_path: fixture("public.crt"),
        ..IntegrationOptions::default()
    }
}

fn form_fields(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

#[tokio::test]
async fn test_secret_flow_posts_form_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/tokens/OAuth/2"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": "86399",
            "access_token": "secret-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Authenticator::new(reqwest::Client::new());
    let options = secret_options(&server.uri());

    let first = auth.get_auth_token(&options).await.expect("first token");
    assert_eq!(first.secret(), "secret-token");

    // Lookup-only edits must reuse the cached token.
    let edited = IntegrationOptions {
        blocklist: "8.8.8.8, example.com".to_string(),
        domain_blocklist_regex: r".*\.local$".to_string(),
        direct_search: false,
        ..options.clone()
    };
    let second = auth.get_auth_token(&edited).await.expect("cached token");
    assert_eq!(second.secret(), "secret-token");
    assert_eq!(auth.cache().len(), 1);

    let requests = server.received_requests().await.expect("recording enabled");
    let fields = form_fields(&requests[0].body);
    assert_eq!(field(&fields, "client_id"), Some("client-1@tenant-1"));
    assert_eq!(field(&fields, "client_secret"), Some("s3cret"));
    assert_eq!(
        field(&fields, "resource"),
        Some("00000003-0000-0ff1-ce00-000000000000/contoso.sharepoint.com@tenant-1")
    );
}

#[tokio::test]
async fn test_identity_change_requests_new_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/tokens/OAuth/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(2)
        .mount(&server)
        .await;

    let auth = Authenticator::new(reqwest::Client::new());
    let options = secret_options(&server.uri());
    auth.get_auth_token(&options).await.expect("first token");

    let rotated = IntegrationOptions {
        client_secret: "rotated".to_string(),
        ..options
    };
    auth.get_auth_token(&rotated).await.expect("second token");
}

#[tokio::test]
async fn test_token_endpoint_error_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/tokens/OAuth/2"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_client"}"#),
        )
        .mount(&server)
        .await;

    let auth = Authenticator::new(reqwest::Client::new());
    let err = auth
        .get_auth_token(&secret_options(&server.uri()))
        .await
        .expect_err("401 must fail");

    match err {
        AuthError::TokenEndpoint { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid_client"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(auth.cache().is_empty());
}

#[tokio::test]
async fn test_missing_access_token_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let auth = Authenticator::new(reqwest::Client::new());
    let err = auth
        .get_auth_token(&secret_options(&server.uri()))
        .await
        .expect_err("no token in body");
    assert!(matches!(err, AuthError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_certificate_flow_signs_assertion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "cert-token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Authenticator::new(reqwest::Client::new()).with_authority_host(server.uri());
    let options = certificate_options("private.key", "");

    let token = auth.get_auth_token(&options).await.expect("certificate token");
    assert_eq!(token.secret(), "cert-token");
    auth.get_auth_token(&options).await.expect("cached token");

    let requests = server.received_requests().await.expect("recording enabled");
    let fields = form_fields(&requests[0].body);
    assert_eq!(field(&fields, "client_id"), Some("client-1"));
    assert_eq!(
        field(&fields, "client_assertion_type"),
        Some("urn:ietf:params:oauth:client-assertion-type:jwt-bearer")
    );
    assert_eq!(
        field(&fields, "scope"),
        Some("https://contoso.sharepoint.com/.default")
    );

    let assertion = field(&fields, "client_assertion").expect("assertion present");
    let header = jsonwebtoken::decode_header(assertion).expect("valid JWT header");
    assert_eq!(header.alg, Algorithm::RS256);
    assert_eq!(header.x5t.as_deref(), Some(FIXTURE_THUMBPRINT_X5T));
}

#[tokio::test]
async fn test_encrypted_private_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tenant-1/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "enc"})))
        .mount(&server)
        .await;

    let auth = Authenticator::new(reqwest::Client::new()).with_authority_host(server.uri());
    let token = auth
        .get_auth_token(&certificate_options("encrypted.key", "correct-horse"))
        .await
        .expect("decrypted key signs");
    assert_eq!(token.secret(), "enc");
}

#[tokio::test]
async fn test_encrypted_private_key_wrong_passphrase() {
    let auth = Authenticator::new(reqwest::Client::new())
        .with_authority_host("http://127.0.0.1:9");
    let err = auth
        .get_auth_token(&certificate_options("encrypted.key", "wrong"))
        .await
        .expect_err("bad passphrase");
    assert!(matches!(err, AuthError::KeyMaterial { .. }));
}

#[tokio::test]
async fn test_authenticator_as_token_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "dyn"})))
        .mount(&server)
        .await;

    let source: Box<dyn TokenSource> = Box::new(Authenticator::new(reqwest::Client::new()));
    let token = source
        .get_auth_token(&secret_options(&server.uri()))
        .await
        .expect("token through trait object");
    assert_eq!(token.secret(), "dyn");
}
