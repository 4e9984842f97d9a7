//! CLI for the hkit harness utilities.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hkit_core::config;
use std::path::PathBuf;

use commands::{run_auth, run_batch, run_domain, run_fetch, run_login, run_tree};

/// Top-level CLI for hkit.
#[derive(Debug, Parser)]
#[command(name = "hkit")]
#[command(about = "hkit: cloud API, browser login and batch helpers for test harnesses", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Obtain a bearer token and print the Authorization header.
    Auth {
        /// Cloud API endpoint (defaults to `api_endpoint` from config).
        #[arg(long)]
        api: Option<String>,
        /// User id (defaults to $IBM_ID).
        #[arg(long)]
        user: Option<String>,
    },

    /// GET a URL and every following page, printing the collected JSON.
    Fetch {
        /// First page URL.
        url: String,
        /// Authenticate against this API endpoint first.
        #[arg(long)]
        api: Option<String>,
        /// Extra request header, `Name: value`. Repeatable.
        #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
        headers: Vec<String>,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Drive the browser login flow through a WebDriver server.
    Login {
        /// WebDriver server URL (defaults to `browser.webdriver_url`).
        #[arg(long)]
        webdriver: Option<String>,
        /// Run the browser without a window.
        #[arg(long)]
        headless: bool,
    },

    /// Print the debug tree of a JSON document.
    Tree {
        /// Path to the JSON file.
        path: PathBuf,
    },

    /// Map every line of a URL list to its top-level domain on a worker pool.
    Batch {
        /// Input file, one URL per line.
        input: PathBuf,
        /// Output file for `url<TAB>domain` lines.
        #[arg(long, short = 'o')]
        output: PathBuf,
        /// Lines per batch (defaults to `batch.batch_size`).
        #[arg(long, value_name = "N")]
        batch_size: Option<usize>,
        /// Worker threads (defaults to `batch.max_threads`).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
    },

    /// Print the top-level domain of each URL.
    Domain {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Auth { api, user } => run_auth(&cfg, api, user)?,
            CliCommand::Fetch {
                url,
                api,
                headers,
                pretty,
            } => run_fetch(&cfg, &url, api, &headers, pretty)?,
            CliCommand::Login {
                webdriver,
                headless,
            } => run_login(&cfg, webdriver, headless)?,
            CliCommand::Tree { path } => run_tree(&path)?,
            CliCommand::Batch {
                input,
                output,
                batch_size,
                threads,
            } => run_batch(&cfg, &input, &output, batch_size, threads)?,
            CliCommand::Domain { urls } => run_domain(&urls),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
