use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::BatchOptions;
use crate::browser_login::LoginPage;
use crate::http::HttpSettings;
use crate::pagination::PageShape;

/// Request timeouts (optional `[http]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
        }
    }
}

impl HttpConfig {
    pub fn settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// WebDriver endpoint and login page overrides (optional `[browser]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// chromedriver / geckodriver / Selenium server URL.
    pub webdriver_url: String,
    pub browser_name: String,
    pub headless: bool,
    /// Page URL, title, locators and timeouts; defaults match the live site.
    pub page: LoginPage,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            browser_name: "chrome".to_string(),
            headless: false,
            page: LoginPage::default(),
        }
    }
}

/// Global configuration loaded from `~/.config/hkit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HkitConfig {
    /// Cloud platform API endpoint used by `auth` (e.g. `https://api.ng.bluemix.net`).
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub batch: BatchOptions,
    #[serde(default)]
    pub pagination: PageShape,
    #[serde(default)]
    pub browser: BrowserConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hkit")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HkitConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HkitConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<HkitConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HkitConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
