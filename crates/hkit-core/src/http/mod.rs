//! Blocking HTTP transport.
//!
//! Uses the curl crate (libcurl) for the few request shapes the harness
//! utilities need: JSON GETs, the form POST to the OAuth token endpoint and
//! JSON commands to a WebDriver server. Runs in the calling thread.

mod error;
mod headers;

pub use error::ApiError;
pub use headers::HeaderMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Longest body excerpt carried in an error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

/// Status and body of a completed request. Non-2xx responses are still
/// returned here; callers decide whether the status is fatal.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub method: Method,
    pub url: String,
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fails with [`ApiError::Status`] unless the server answered 200.
    pub fn ensure_ok(self) -> Result<Self, ApiError> {
        if self.status == 200 {
            return Ok(self);
        }
        Err(ApiError::Status {
            method: self.method.as_str(),
            url: self.url.clone(),
            status: self.status,
            body: self.body_text(),
        })
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|source| ApiError::Json {
            url: self.url.clone(),
            source,
        })
    }

    /// Body as lossy UTF-8, trimmed and cut to a length fit for error messages.
    pub fn body_text(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if text.chars().count() <= ERROR_BODY_LIMIT {
            return text.to_string();
        }
        let cut: String = text.chars().take(ERROR_BODY_LIMIT).collect();
        format!("{}...", cut)
    }
}

struct Body<'a> {
    bytes: &'a [u8],
    content_type: &'static str,
}

/// GET `url` with the given request headers.
pub fn get(url: &str, headers: &HeaderMap, settings: &HttpSettings) -> Result<HttpResponse, ApiError> {
    perform(Method::Get, url, None, headers, settings)
}

/// POST `fields` as an `application/x-www-form-urlencoded` body.
pub fn post_form(
    url: &str,
    fields: &[(&str, &str)],
    headers: &HeaderMap,
    settings: &HttpSettings,
) -> Result<HttpResponse, ApiError> {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    let body = Body {
        bytes: encoded.as_bytes(),
        content_type: "application/x-www-form-urlencoded",
    };
    perform(Method::Post, url, Some(body), headers, settings)
}

/// Sends `body` (if any) as JSON with the given method.
pub fn send_json(
    method: Method,
    url: &str,
    body: Option<&Value>,
    headers: &HeaderMap,
    settings: &HttpSettings,
) -> Result<HttpResponse, ApiError> {
    let encoded = body.map(|b| b.to_string());
    let body = encoded.as_deref().map(|s| Body {
        bytes: s.as_bytes(),
        content_type: "application/json",
    });
    perform(method, url, body, headers, settings)
}

fn perform(
    method: Method,
    url: &str,
    body: Option<Body<'_>>,
    headers: &HeaderMap,
    settings: &HttpSettings,
) -> Result<HttpResponse, ApiError> {
    let transport = |source: curl::Error| ApiError::Transport {
        url: url.to_string(),
        source,
    };

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(transport)?;
    easy.follow_location(true).map_err(transport)?;
    easy.connect_timeout(settings.connect_timeout).map_err(transport)?;
    easy.timeout(settings.timeout).map_err(transport)?;
    match method {
        Method::Get => {}
        Method::Post => {
            easy.post(true).map_err(transport)?;
            // Always set a body so libcurl never falls back to its read callback.
            let bytes = body.as_ref().map_or(&[][..], |b| b.bytes);
            easy.post_fields_copy(bytes).map_err(transport)?;
        }
        Method::Delete => easy.custom_request("DELETE").map_err(transport)?,
    }

    // "Expect:" stops libcurl from waiting on 100-continue for POST bodies.
    let content_type = body
        .as_ref()
        .map(|b| format!("Content-Type: {}", b.content_type));
    let mut extra = vec!["Accept: application/json", "Expect:"];
    if let Some(line) = &content_type {
        extra.push(line);
    }
    let mut list = curl::easy::List::new();
    for line in headers::header_lines(headers, &extra) {
        list.append(&line).map_err(transport)?;
    }
    easy.http_headers(list).map_err(transport)?;

    let mut response_body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                response_body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(transport)?;
        transfer.perform().map_err(transport)?;
    }

    let status = easy.response_code().map_err(transport)?;
    tracing::debug!("{} {} -> HTTP {}", method.as_str(), url, status);

    Ok(HttpResponse {
        method,
        url: url.to_string(),
        status,
        body: response_body,
    })
}
