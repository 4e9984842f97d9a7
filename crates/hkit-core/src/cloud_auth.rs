//! Password-grant authentication against the cloud platform API.
//!
//! Discovers the authorization server from `{api}/info`, exchanges the
//! harness credentials for a token at `{authorization_endpoint}/oauth/token`,
//! and returns the `Authorization` header to use on later API calls.

use serde::Deserialize;

use crate::credentials::Credentials;
use crate::http::{self, ApiError, HeaderMap, HttpSettings};

const INFO_PATH: &str = "/info";
const TOKEN_PATH: &str = "/oauth/token";
/// HTTP Basic auth for the platform's public `cf` client with an empty secret.
const CLIENT_AUTHORIZATION: &str = "Basic Y2Y6";

#[derive(Debug, Deserialize)]
struct InfoResponse {
    authorization_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token_type: Option<String>,
    access_token: Option<String>,
}

/// Authenticates and returns `{"Authorization": "<token_type> <access_token>"}`.
///
/// Any non-200 answer from either endpoint is returned as
/// [`ApiError::Status`] with the response body; nothing is retried.
pub fn authenticate(
    api_endpoint: &str,
    credentials: &Credentials,
    settings: &HttpSettings,
) -> Result<HeaderMap, ApiError> {
    let token_url = discover_token_url(api_endpoint, settings)?;
    tracing::debug!("requesting token for {} from {}", credentials.user_id, token_url);

    let mut headers = HeaderMap::new();
    headers.insert("Authorization".to_string(), CLIENT_AUTHORIZATION.to_string());
    let form = [
        ("grant_type", "password"),
        ("username", credentials.user_id.as_str()),
        ("password", credentials.password.as_str()),
    ];
    let response = http::post_form(&token_url, &form, &headers, settings)?.ensure_ok()?;
    let token: TokenResponse = response.json()?;

    let token_type = token.token_type.ok_or_else(|| ApiError::MissingField {
        url: token_url.clone(),
        field: "token_type",
    })?;
    let access_token = token.access_token.ok_or_else(|| ApiError::MissingField {
        url: token_url.clone(),
        field: "access_token",
    })?;

    tracing::info!("obtained {} token from {}", token_type, token_url);
    Ok(bearer_headers(&token_type, &access_token))
}

/// Resolves the token endpoint advertised by `{api_endpoint}/info`.
pub fn discover_token_url(api_endpoint: &str, settings: &HttpSettings) -> Result<String, ApiError> {
    let info_url = join_path(api_endpoint, INFO_PATH);
    let response = http::get(&info_url, &HeaderMap::new(), settings)?.ensure_ok()?;
    let info: InfoResponse = response.json()?;
    let auth_endpoint = info
        .authorization_endpoint
        .ok_or(ApiError::MissingField {
            url: info_url,
            field: "authorization_endpoint",
        })?;
    Ok(join_path(&auth_endpoint, TOKEN_PATH))
}

/// Header map carrying `Authorization: <token_type> <access_token>`.
pub fn bearer_headers(token_type: &str, access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Authorization".to_string(),
        format!("{} {}", token_type, access_token),
    );
    headers
}

fn join_path(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_avoids_double_slash() {
        assert_eq!(
            join_path("https://api.example.com/", INFO_PATH),
            "https://api.example.com/info"
        );
        assert_eq!(
            join_path("https://login.example.com/UAALoginServerWAR", TOKEN_PATH),
            "https://login.example.com/UAALoginServerWAR/oauth/token"
        );
    }

    #[test]
    fn bearer_headers_joins_type_and_token() {
        let headers = bearer_headers("bearer", "abc.def");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["Authorization"], "bearer abc.def");
    }

    #[test]
    fn token_response_tolerates_extra_fields() {
        let body = r#"{"access_token":"t","token_type":"bearer","expires_in":1199,"scope":"cloud_controller.read"}"#;
        let token: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        assert_eq!(token.access_token.as_deref(), Some("t"));
    }
}
