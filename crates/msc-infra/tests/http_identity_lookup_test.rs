use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use msc_core::ports::{IdentityLookupError, IdentityLookupPort};
use msc_core::OwnerId;
use msc_infra::{HttpIdentityLookup, StaticCredentialProvider};

fn client(base: &str, token: Option<&str>) -> HttpIdentityLookup {
    let credentials = match token {
        Some(token) => StaticCredentialProvider::new(token),
        None => StaticCredentialProvider::anonymous(),
    };
    HttpIdentityLookup::new(base, Duration::from_secs(5), Arc::new(credentials))
        .expect("build identity client")
}

const ALICE: &str = r#"{
    "success": true,
    "message": "ok",
    "data": {
        "id": 7,
        "username": "alice",
        "email": "alice@example.com",
        "firstName": "Alice",
        "lastName": "Nguyen",
        "roles": ["STUDENT"]
    },
    "timestamp": "2024-05-01T08:00:00"
}"#;

#[tokio::test]
async fn lookup_unwraps_envelope_and_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/multisig/users/7")
        .match_header("authorization", "Bearer secret-token")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ALICE)
        .create_async()
        .await;

    let lookup = client(&format!("{}/api/v1/multisig", server.url()), Some("secret-token"));
    let user = lookup
        .lookup_identity(&OwnerId::from("7"))
        .await
        .expect("lookup succeeds");

    mock.assert_async().await;
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "alice");
    assert_eq!(user.display_name(), "Alice Nguyen");
}

#[tokio::test]
async fn lookup_without_token_sends_no_authorization_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/users/7")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(ALICE)
        .create_async()
        .await;

    let lookup = client(&server.url(), None);
    assert!(lookup.lookup_identity(&OwnerId::from("7")).await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn unsuccessful_envelope_surfaces_its_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/99")
        .with_status(200)
        .with_body(r#"{"success": false, "message": "User does not exist"}"#)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .lookup_identity(&OwnerId::from("99"))
        .await
        .unwrap_err();

    assert_eq!(err, IdentityLookupError::Rejected("User does not exist".to_string()));
}

#[tokio::test]
async fn envelope_without_data_uses_fallback_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/5")
        .with_status(200)
        .with_body(r#"{"success": true, "data": null}"#)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .lookup_identity(&OwnerId::from("5"))
        .await
        .unwrap_err();

    assert_eq!(err.reason().as_deref(), Some("failed to fetch identity user"));
}

#[tokio::test]
async fn error_status_prefers_body_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/3")
        .with_status(403)
        .with_body(r#"{"message": "Access denied for owner lookup", "error": "Forbidden"}"#)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .lookup_identity(&OwnerId::from("3"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        IdentityLookupError::Rejected("Access denied for owner lookup".to_string())
    );
}

#[tokio::test]
async fn bare_not_found_maps_to_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/12")
        .with_status(404)
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .lookup_identity(&OwnerId::from("12"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        IdentityLookupError::NotFound {
            owner_id: OwnerId::from("12")
        }
    );
}

#[tokio::test]
async fn bare_server_error_reports_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/1")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .lookup_identity(&OwnerId::from("1"))
        .await
        .unwrap_err();

    let reason = err.reason().expect("reason");
    assert!(reason.contains("502"), "unexpected reason: {reason}");
}

#[tokio::test]
async fn malformed_success_body_is_a_transport_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/users/1")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server.url(), None)
        .lookup_identity(&OwnerId::from("1"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityLookupError::Transport(ref m) if m.contains("invalid identity response")));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Port 9 (discard) on localhost is closed on test machines.
    let err = client("http://127.0.0.1:9/api", None)
        .lookup_identity(&OwnerId::from("1"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityLookupError::Transport(_)));
}

#[tokio::test]
async fn current_identity_reads_profile_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/multisig/users/profile")
        .match_header("authorization", "Bearer operator")
        .with_status(200)
        .with_body(ALICE)
        .create_async()
        .await;

    let user = client(&format!("{}/multisig", server.url()), Some("operator"))
        .current_identity()
        .await
        .expect("current identity");

    mock.assert_async().await;
    assert_eq!(user.email, "alice@example.com");
}
