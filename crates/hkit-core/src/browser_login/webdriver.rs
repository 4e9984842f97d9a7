//! Minimal W3C WebDriver client over the curl transport.
//!
//! Talks to chromedriver/geckodriver (or a Selenium server) directly; only the
//! commands the login flow needs are implemented.

use serde_json::{json, Value};
use std::time::Duration;

use super::{Browser, Element, Locator, LoginError};
use crate::http::{self, ApiError, HeaderMap, HttpSettings, Method};

/// W3C web element identifier key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Capabilities for a new session. `headless` adds the browser-specific flag
/// for Chrome and Firefox; other browsers get only `browserName`.
pub fn capabilities(browser_name: &str, headless: bool) -> Value {
    let mut caps = json!({ "browserName": browser_name });
    if headless {
        match browser_name {
            "chrome" => caps["goog:chromeOptions"] = json!({ "args": ["--headless=new"] }),
            "firefox" => caps["moz:firefoxOptions"] = json!({ "args": ["-headless"] }),
            _ => {}
        }
    }
    caps
}

/// A live WebDriver session. Dropping it deletes the session best-effort;
/// call [`WebDriverSession::quit`] to observe errors.
pub struct WebDriverSession {
    base_url: String,
    session_id: Option<String>,
    settings: HttpSettings,
}

impl WebDriverSession {
    pub fn start(
        webdriver_url: &str,
        capabilities: &Value,
        settings: &HttpSettings,
    ) -> Result<Self, LoginError> {
        let base_url = webdriver_url.trim_end_matches('/').to_string();
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let value = execute(
            Method::Post,
            &format!("{}/session", base_url),
            Some(&body),
            "new session",
            settings,
        )?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| protocol("new session", "missing sessionId"))?
            .to_string();
        tracing::info!("started webdriver session {} at {}", session_id, base_url);
        Ok(Self {
            base_url,
            session_id: Some(session_id),
            settings: *settings,
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Deletes the session (closes the browser).
    pub fn quit(mut self) -> Result<(), LoginError> {
        self.delete_session()
    }

    fn delete_session(&mut self) -> Result<(), LoginError> {
        if let Some(id) = self.session_id.take() {
            let url = format!("{}/session/{}", self.base_url, id);
            execute(Method::Delete, &url, None, "delete session", &self.settings)?;
            tracing::debug!("deleted webdriver session {}", id);
        }
        Ok(())
    }

    fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        name: &str,
    ) -> Result<Value, LoginError> {
        let id = self
            .session_id
            .as_deref()
            .ok_or_else(|| protocol(name, "session already closed"))?;
        let url = format!("{}/session/{}{}", self.base_url, id, path);
        execute(method, &url, body.as_ref(), name, &self.settings)
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.delete_session() {
            tracing::warn!("failed to close webdriver session: {}", e);
        }
    }
}

impl Browser for WebDriverSession {
    fn set_implicit_wait(&mut self, timeout: Duration) -> Result<(), LoginError> {
        let body = json!({ "implicit": timeout.as_millis() as u64 });
        self.command(Method::Post, "/timeouts", Some(body), "set timeouts")?;
        Ok(())
    }

    fn navigate(&mut self, url: &str) -> Result<(), LoginError> {
        self.command(Method::Post, "/url", Some(json!({ "url": url })), "navigate to")?;
        Ok(())
    }

    fn title(&mut self) -> Result<String, LoginError> {
        let value = self.command(Method::Get, "/title", None, "get title")?;
        expect_string(value, "get title")
    }

    fn page_source(&mut self) -> Result<String, LoginError> {
        let value = self.command(Method::Get, "/source", None, "get page source")?;
        expect_string(value, "get page source")
    }

    fn try_find(&mut self, locator: &Locator) -> Result<Option<Element>, LoginError> {
        let (using, selector) = locator.strategy();
        let body = json!({ "using": using, "value": selector });
        let value = match self.command(Method::Post, "/element", Some(body), "find element") {
            Ok(value) => value,
            Err(LoginError::WebDriver { ref error, .. }) if error == "no such element" => {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };
        let id = value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| protocol("find element", "missing element reference"))?;
        Ok(Some(Element(id.to_string())))
    }

    fn is_displayed(&mut self, element: &Element) -> Result<bool, LoginError> {
        let path = format!("/element/{}/displayed", element.0);
        let value = self.command(Method::Get, &path, None, "is element displayed")?;
        value
            .as_bool()
            .ok_or_else(|| protocol("is element displayed", "expected a boolean"))
    }

    fn is_enabled(&mut self, element: &Element) -> Result<bool, LoginError> {
        let path = format!("/element/{}/enabled", element.0);
        let value = self.command(Method::Get, &path, None, "is element enabled")?;
        value
            .as_bool()
            .ok_or_else(|| protocol("is element enabled", "expected a boolean"))
    }

    fn click(&mut self, element: &Element) -> Result<(), LoginError> {
        let path = format!("/element/{}/click", element.0);
        self.command(Method::Post, &path, Some(json!({})), "element click")?;
        Ok(())
    }

    fn clear(&mut self, element: &Element) -> Result<(), LoginError> {
        let path = format!("/element/{}/clear", element.0);
        self.command(Method::Post, &path, Some(json!({})), "element clear")?;
        Ok(())
    }

    fn send_keys(&mut self, element: &Element, text: &str) -> Result<(), LoginError> {
        let path = format!("/element/{}/value", element.0);
        self.command(Method::Post, &path, Some(json!({ "text": text })), "element send keys")?;
        Ok(())
    }
}

/// Sends one command and unwraps the W3C `{"value": ...}` envelope. Error
/// envelopes become [`LoginError::WebDriver`].
fn execute(
    method: Method,
    url: &str,
    body: Option<&Value>,
    command: &str,
    settings: &HttpSettings,
) -> Result<Value, LoginError> {
    let response = http::send_json(method, url, body, &HeaderMap::new(), settings)?;
    let mut payload: Value = match response.json() {
        Ok(payload) => payload,
        Err(e) if response.is_success() => return Err(e.into()),
        Err(_) => {
            return Err(LoginError::Http(ApiError::Status {
                method: method.as_str(),
                url: url.to_string(),
                status: response.status,
                body: response.body_text(),
            }))
        }
    };
    let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if response.is_success() {
        return Ok(value);
    }
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let error = field("error");
    Err(LoginError::WebDriver {
        command: command.to_string(),
        error: if error.is_empty() {
            format!("HTTP {}", response.status)
        } else {
            error
        },
        message: field("message"),
    })
}

fn expect_string(value: Value, command: &str) -> Result<String, LoginError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(protocol(command, "expected a string")),
    }
}

fn protocol(command: &str, reason: &str) -> LoginError {
    LoginError::Protocol {
        command: command.to_string(),
        reason: reason.to_string(),
    }
}
