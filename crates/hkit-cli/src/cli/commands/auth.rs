//! `hkit auth` – password-grant login, prints the Authorization header.

use anyhow::Result;
use hkit_core::cloud_auth;
use hkit_core::config::HkitConfig;
use hkit_core::credentials::Credentials;

use super::api_endpoint;

pub fn run_auth(cfg: &HkitConfig, api: Option<String>, user: Option<String>) -> Result<()> {
    let api = api_endpoint(cfg, api)?;
    let creds = Credentials::resolve(user, None)?;
    let headers = cloud_auth::authenticate(&api, &creds, &cfg.http.settings())?;
    for (name, value) in &headers {
        println!("{}: {}", name, value);
    }
    Ok(())
}
