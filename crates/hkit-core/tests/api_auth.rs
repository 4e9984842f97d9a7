//! Integration test: password-grant auth against a local discovery + token server.

mod common;

use common::json_server::{self, Route};
use hkit_core::cloud_auth;
use hkit_core::credentials::Credentials;
use hkit_core::http::{ApiError, HttpSettings};

fn info_route() -> Route {
    Route::new(
        "GET",
        "/info",
        200,
        r#"{"name":"vcap","authorization_endpoint":"{base}/uaa","token_endpoint":"{base}/uaa"}"#,
    )
}

#[test]
fn authenticate_returns_bearer_header() {
    let server = json_server::start(vec![
        info_route(),
        Route::new(
            "POST",
            "/uaa/oauth/token",
            200,
            r#"{"access_token":"eyJhbGciOi.abc","token_type":"bearer","expires_in":1199}"#,
        ),
    ]);
    let creds = Credentials::new("me@example.com", "p@ss word");

    let headers =
        cloud_auth::authenticate(&server.base_url, &creds, &HttpSettings::default()).unwrap();
    assert_eq!(headers.len(), 1);
    assert_eq!(headers["Authorization"], "bearer eyJhbGciOi.abc");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/info");
    let token = &requests[1];
    assert_eq!(token.method, "POST");
    assert_eq!(token.target, "/uaa/oauth/token");
    assert_eq!(token.header("Authorization"), Some("Basic Y2Y6"));
    assert_eq!(
        token.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        token.body,
        "grant_type=password&username=me%40example.com&password=p%40ss+word"
    );
}

#[test]
fn trailing_slash_on_endpoint_is_tolerated() {
    let server = json_server::start(vec![
        info_route(),
        Route::new(
            "POST",
            "/uaa/oauth/token",
            200,
            r#"{"access_token":"t","token_type":"bearer"}"#,
        ),
    ]);
    let creds = Credentials::new("me", "pw");
    let endpoint = format!("{}/", server.base_url);
    let headers = cloud_auth::authenticate(&endpoint, &creds, &HttpSettings::default()).unwrap();
    assert_eq!(headers["Authorization"], "bearer t");
}

#[test]
fn rejected_password_surfaces_status_and_body() {
    let server = json_server::start(vec![
        info_route(),
        Route::new(
            "POST",
            "/uaa/oauth/token",
            401,
            r#"{"error":"unauthorized","error_description":"Bad credentials"}"#,
        ),
    ]);
    let creds = Credentials::new("me", "wrong");
    let err = cloud_auth::authenticate(&server.base_url, &creds, &HttpSettings::default())
        .unwrap_err();
    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("Bad credentials"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(server.requests().len(), 2);
}

#[test]
fn discovery_failure_stops_before_token_request() {
    let server = json_server::start(vec![Route::new("GET", "/info", 500, r#"{"code":10001}"#)]);
    let creds = Credentials::new("me", "pw");
    let err = cloud_auth::authenticate(&server.base_url, &creds, &HttpSettings::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn discovery_without_authorization_endpoint_is_missing_field() {
    let server = json_server::start(vec![Route::new("GET", "/info", 200, r#"{"name":"vcap"}"#)]);
    let err = cloud_auth::discover_token_url(&server.base_url, &HttpSettings::default())
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::MissingField {
            field: "authorization_endpoint",
            ..
        }
    ));
}
