//! CLI command handlers, one file per command.

mod auth;
mod batch;
mod domain;
mod fetch;
mod login;
mod tree;

pub use auth::run_auth;
pub use batch::run_batch;
pub use domain::run_domain;
pub use fetch::run_fetch;
pub use login::run_login;
pub use tree::run_tree;

use anyhow::{Context, Result};
use hkit_core::config::HkitConfig;

/// `--api` if given, else `api_endpoint` from config.
fn api_endpoint(cfg: &HkitConfig, api: Option<String>) -> Result<String> {
    api.or_else(|| cfg.api_endpoint.clone())
        .context("no API endpoint: pass --api or set api_endpoint in config.toml")
}
