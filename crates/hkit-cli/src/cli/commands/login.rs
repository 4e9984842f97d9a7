//! `hkit login` – drive the browser login through WebDriver.

use anyhow::{Context, Result};
use hkit_core::browser_login::{self, capabilities, WebDriverSession};
use hkit_core::config::HkitConfig;
use hkit_core::credentials::Credentials;

pub fn run_login(cfg: &HkitConfig, webdriver: Option<String>, headless: bool) -> Result<()> {
    let creds = Credentials::from_env()?;
    let browser_cfg = &cfg.browser;
    let webdriver_url = webdriver.unwrap_or_else(|| browser_cfg.webdriver_url.clone());
    let caps = capabilities(&browser_cfg.browser_name, headless || browser_cfg.headless);

    let mut session = WebDriverSession::start(&webdriver_url, &caps, &cfg.http.settings())
        .with_context(|| format!("start {} session at {}", browser_cfg.browser_name, webdriver_url))?;
    let path = browser_login::authenticate(&mut session, &creds, &browser_cfg.page)?;
    println!("logged in to {} via {}", browser_cfg.page.url, path);
    session.quit()?;
    Ok(())
}
