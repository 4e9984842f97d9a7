//! `hkit batch` – map a URL list to top-level domains on the worker pool.

use anyhow::{Context, Result};
use hkit_core::batch::{self, BatchOptions, LineSink};
use hkit_core::config::HkitConfig;
use hkit_core::domain::top_level_domain;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

pub fn run_batch(
    cfg: &HkitConfig,
    input: &Path,
    output: &Path,
    batch_size: Option<usize>,
    threads: Option<usize>,
) -> Result<()> {
    let options = BatchOptions {
        batch_size: batch_size.unwrap_or(cfg.batch.batch_size),
        max_threads: threads.unwrap_or(cfg.batch.max_threads),
    };
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("open {}", input.display()))?,
    );
    let sink = Arc::new(LineSink::create(output)?);

    let report = batch::batch_and_process(
        reader,
        Arc::clone(&sink),
        |urls, sink: &LineSink<_>| {
            let lines: Vec<String> = urls
                .iter()
                .filter(|url| !url.is_empty())
                .map(|url| format!("{}\t{}", url, top_level_domain(url)))
                .collect();
            sink.write_lines(&lines)
        },
        &options,
    )?;
    sink.flush()?;

    println!(
        "{} lines in {} batches ({} ok, {} failed) -> {}",
        report.lines,
        report.batches,
        report.completed_batches,
        report.failed_batches,
        output.display()
    );
    Ok(())
}
