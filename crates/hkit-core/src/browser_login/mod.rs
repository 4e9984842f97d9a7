//! Browser-driven login to the company profiler web application.
//!
//! The page flow is dictated by the external application: open the landing
//! page, follow "Log in", submit the user id, then either type the password
//! directly (plain IBMid) or go through the federated w3id prompt. Locators,
//! URL, title and timeouts all live in [`LoginPage`] because they are tied to
//! one specific page implementation.

mod error;
mod webdriver;

pub use error::LoginError;
pub use webdriver::{capabilities, WebDriverSession};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::credentials::Credentials;

/// How to locate an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    LinkText(String),
    Name(String),
    Id(String),
    ClassName(String),
}

impl Locator {
    /// W3C location strategy and selector.
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::LinkText(text) => ("link text", text.clone()),
            Locator::Name(name) => ("css selector", format!("[name=\"{}\"]", quote_css(name))),
            Locator::Id(id) => ("css selector", format!("[id=\"{}\"]", quote_css(id))),
            Locator::ClassName(class) => (
                "css selector",
                format!("[class~=\"{}\"]", quote_css(class)),
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::LinkText(v) => write!(f, "link text {:?}", v),
            Locator::Name(v) => write!(f, "name {:?}", v),
            Locator::Id(v) => write!(f, "id {:?}", v),
            Locator::ClassName(v) => write!(f, "class {:?}", v),
        }
    }
}

fn quote_css(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Opaque element reference handed out by a [`Browser`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element(pub String);

/// The browser operations the login flow needs.
pub trait Browser {
    fn set_implicit_wait(&mut self, timeout: Duration) -> Result<(), LoginError>;
    fn navigate(&mut self, url: &str) -> Result<(), LoginError>;
    fn title(&mut self) -> Result<String, LoginError>;
    fn page_source(&mut self) -> Result<String, LoginError>;
    /// `Ok(None)` when nothing matches.
    fn try_find(&mut self, locator: &Locator) -> Result<Option<Element>, LoginError>;
    fn is_displayed(&mut self, element: &Element) -> Result<bool, LoginError>;
    fn is_enabled(&mut self, element: &Element) -> Result<bool, LoginError>;
    fn click(&mut self, element: &Element) -> Result<(), LoginError>;
    fn clear(&mut self, element: &Element) -> Result<(), LoginError>;
    fn send_keys(&mut self, element: &Element, text: &str) -> Result<(), LoginError>;

    fn find(&mut self, locator: &Locator) -> Result<Element, LoginError> {
        self.try_find(locator)?
            .ok_or_else(|| LoginError::NoSuchElement(locator.to_string()))
    }

    /// Polls every 250 ms until `locator` is displayed and enabled.
    fn wait_clickable(&mut self, locator: &Locator, timeout: Duration) -> Result<Element, LoginError> {
        wait_for(self, locator, Readiness::Clickable, timeout, WAIT_POLL)
    }

    /// Polls every 250 ms until `locator` is displayed.
    fn wait_visible(&mut self, locator: &Locator, timeout: Duration) -> Result<Element, LoginError> {
        wait_for(self, locator, Readiness::Visible, timeout, WAIT_POLL)
    }
}

const WAIT_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Displayed and enabled.
    Clickable,
    Visible,
}

impl Readiness {
    fn as_str(self) -> &'static str {
        match self {
            Readiness::Clickable => "clickable",
            Readiness::Visible => "visible",
        }
    }
}

/// Polls every `poll` until `locator` matches an element in the requested
/// state, or fails with [`LoginError::Timeout`] after `timeout`.
pub fn wait_for<B: Browser + ?Sized>(
    browser: &mut B,
    locator: &Locator,
    readiness: Readiness,
    timeout: Duration,
    poll: Duration,
) -> Result<Element, LoginError> {
    // No deadline when `timeout` is too large to represent.
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(element) = browser.try_find(locator)? {
            match element_ready(browser, &element, readiness) {
                Ok(true) => return Ok(element),
                Ok(false) => {}
                // Page re-rendered between find and query; look again.
                Err(LoginError::WebDriver { ref error, .. }) if error == "stale element reference" => {}
                Err(e) => return Err(e),
            }
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(LoginError::Timeout {
                        locator: locator.to_string(),
                        timeout,
                        readiness: readiness.as_str(),
                    });
                }
                poll.min(deadline - now)
            }
            None => poll,
        };
        std::thread::sleep(pause);
    }
}

fn element_ready<B: Browser + ?Sized>(
    browser: &mut B,
    element: &Element,
    readiness: Readiness,
) -> Result<bool, LoginError> {
    if !browser.is_displayed(element)? {
        return Ok(false);
    }
    match readiness {
        Readiness::Visible => Ok(true),
        Readiness::Clickable => browser.is_enabled(element),
    }
}

/// Wait budgets for the login flow, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginTimeouts {
    /// WebDriver implicit wait applied to every element lookup.
    pub implicit_ms: u64,
    /// Wait for ordinary form fields and buttons.
    pub step_ms: u64,
    /// How long to look for the password field before assuming the federated prompt.
    pub password_probe_ms: u64,
    /// Wait for the federated id form and the post-login landing page.
    pub slow_step_ms: u64,
}

impl Default for LoginTimeouts {
    fn default() -> Self {
        Self {
            implicit_ms: 10_000,
            step_ms: 10_000,
            password_probe_ms: 5_000,
            slow_step_ms: 30_000,
        }
    }
}

impl LoginTimeouts {
    fn implicit(&self) -> Duration {
        Duration::from_millis(self.implicit_ms)
    }
    fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
    fn password_probe(&self) -> Duration {
        Duration::from_millis(self.password_probe_ms)
    }
    fn slow_step(&self) -> Duration {
        Duration::from_millis(self.slow_step_ms)
    }
}

/// Everything page-specific about the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginPage {
    pub url: String,
    /// Substring the landing page title must contain.
    pub expected_title: String,
    pub login_link: Locator,
    pub username_field: Locator,
    pub continue_button: Locator,
    pub password_field: Locator,
    pub signin_button: Locator,
    pub federated_button: Locator,
    pub federated_user_field: Locator,
    pub federated_signin_button: Locator,
    /// Visible once the application has rendered after login.
    pub landing_marker: Locator,
    pub timeouts: LoginTimeouts,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            url: "https://company-profiler.watson.ibm.com/".to_string(),
            expected_title: "Watson Company Profiler".to_string(),
            login_link: Locator::LinkText("Log in".to_string()),
            username_field: Locator::Name("username".to_string()),
            continue_button: Locator::Id("continuebutton".to_string()),
            password_field: Locator::Name("password".to_string()),
            signin_button: Locator::Id("signinbutton".to_string()),
            federated_button: Locator::Id("continuefedbutton".to_string()),
            federated_user_field: Locator::Id("desktop".to_string()),
            federated_signin_button: Locator::ClassName("btn_signin".to_string()),
            landing_marker: Locator::ClassName("Explore__container".to_string()),
            timeouts: LoginTimeouts::default(),
        }
    }
}

/// Which sign-in form the identity provider presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPath {
    /// Plain IBMid: password prompt on the same page as the echoed user id.
    IbmId,
    /// Federated w3id: extra hop to the corporate sign-in form.
    Federated,
}

impl fmt::Display for LoginPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginPath::IbmId => f.write_str("IBMid"),
            LoginPath::Federated => f.write_str("federated w3id"),
        }
    }
}

/// Logs in through `browser` and returns once the application's landing
/// view is visible.
pub fn authenticate<B: Browser + ?Sized>(
    browser: &mut B,
    credentials: &Credentials,
    page: &LoginPage,
) -> Result<LoginPath, LoginError> {
    let t = &page.timeouts;

    browser.set_implicit_wait(t.implicit())?;
    browser.navigate(&page.url)?;
    let title = browser.title()?;
    if !title.contains(&page.expected_title) {
        return Err(LoginError::UnexpectedTitle {
            expected: page.expected_title.clone(),
            actual: title,
        });
    }

    let link = browser.find(&page.login_link)?;
    browser.click(&link)?;

    let user = browser.wait_clickable(&page.username_field, t.step())?;
    browser.clear(&user)?;
    browser.send_keys(&user, &credentials.user_id)?;
    let next = browser.wait_clickable(&page.continue_button, t.step())?;
    browser.click(&next)?;

    match browser.wait_clickable(&page.password_field, t.password_probe()) {
        Ok(_) => {}
        Err(LoginError::Timeout { .. }) => {
            browser.wait_clickable(&page.federated_button, t.step())?;
        }
        Err(e) => return Err(e),
    }

    // The IBMid form echoes the entered id; the federated prompt does not.
    let path = if browser.page_source()?.contains(&credentials.user_id) {
        let password = browser.find(&page.password_field)?;
        browser.send_keys(&password, &credentials.password)?;
        let signin = browser.find(&page.signin_button)?;
        browser.click(&signin)?;
        LoginPath::IbmId
    } else {
        let federated = browser.wait_clickable(&page.federated_button, t.step())?;
        browser.click(&federated)?;
        let user = browser.wait_clickable(&page.federated_user_field, t.slow_step())?;
        browser.clear(&user)?;
        browser.send_keys(&user, &credentials.user_id)?;
        let password = browser.find(&page.password_field)?;
        browser.send_keys(&password, &credentials.password)?;
        let signin = browser.find(&page.federated_signin_button)?;
        browser.click(&signin)?;
        LoginPath::Federated
    };

    browser.wait_visible(&page.landing_marker, t.slow_step())?;
    tracing::info!("logged in to {} via {}", page.url, path);
    Ok(path)
}
