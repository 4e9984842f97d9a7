//! `hkit fetch` – collect every page of a JSON collection.

use anyhow::{bail, Context, Result};
use hkit_core::cloud_auth;
use hkit_core::config::HkitConfig;
use hkit_core::credentials::Credentials;
use hkit_core::http::HeaderMap;
use hkit_core::pagination;

pub fn run_fetch(
    cfg: &HkitConfig,
    url: &str,
    api: Option<String>,
    raw_headers: &[String],
    pretty: bool,
) -> Result<()> {
    let settings = cfg.http.settings();
    let mut headers = HeaderMap::new();
    if let Some(api) = api {
        let creds = Credentials::from_env()?;
        headers.extend(cloud_auth::authenticate(&api, &creds, &settings)?);
    }
    for raw in raw_headers {
        let (name, value) = parse_header(raw)?;
        headers.insert(name, value);
    }

    let results = pagination::get_all_results(url, &headers, &cfg.pagination, &settings)?;
    let value = results.into_value();
    let out = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", out);
    Ok(())
}

/// Splits `Name: value` (or `Name:value`).
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header {:?} is not of the form Name: value", raw))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("header {:?} has an empty name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}
