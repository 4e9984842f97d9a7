//! Multithreaded batch processing of line-oriented input.
//!
//! Input lines are trimmed and grouped into fixed-size batches; each batch is
//! handed to `operation` on a bounded pool of worker threads. The call blocks
//! until every submitted batch has finished. There is no ordering guarantee,
//! no retry and no cancellation; a failing batch is logged and counted.

mod pool;
mod sink;

pub use sink::LineSink;

use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};
use std::sync::Arc;
use thiserror::Error;

use pool::WorkerPool;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,
    #[error("max_threads must be at least 1")]
    ZeroThreads,
    #[error("failed to spawn batch worker")]
    Spawn(#[source] io::Error),
    #[error("failed to read batch input")]
    Input(#[source] io::Error),
}

/// Batch size and pool width (the `[batch]` config section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub max_threads: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_threads: 8,
        }
    }
}

impl BatchOptions {
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.batch_size == 0 {
            return Err(BatchError::ZeroBatchSize);
        }
        if self.max_threads == 0 {
            return Err(BatchError::ZeroThreads);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Batches submitted to the pool.
    pub batches: usize,
    /// Lines across all submitted batches.
    pub lines: usize,
    /// Batches whose operation returned `Ok`.
    pub completed_batches: usize,
    /// Batches whose operation returned an error or panicked.
    pub failed_batches: usize,
}

/// Number of batches `lines` input lines produce.
pub fn batch_count(lines: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    lines.div_ceil(batch_size)
}

/// Splits `input` into batches and runs `operation(batch, &output)` for each
/// on `options.max_threads` workers, returning after all batches complete.
///
/// `output` is shared by every batch as-is; making concurrent use of it safe
/// is up to `O` (see [`LineSink`]). A read error on `input` stops further
/// submission, waits for the batches already queued, then is returned.
pub fn batch_and_process<R, O, F>(
    input: R,
    output: Arc<O>,
    operation: F,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError>
where
    R: BufRead,
    O: Send + Sync + 'static + ?Sized,
    F: Fn(Vec<String>, &O) -> anyhow::Result<()> + Send + Sync + 'static,
{
    options.validate()?;
    let operation = Arc::new(operation);
    let pool = WorkerPool::new(options.max_threads).map_err(BatchError::Spawn)?;

    let mut report = BatchReport::default();
    let mut submit = |batch: Vec<String>| {
        report.batches += 1;
        report.lines += batch.len();
        let operation = Arc::clone(&operation);
        let output = Arc::clone(&output);
        pool.submit(move || (*operation)(batch, &*output));
        tracing::info!("Batched {}", report.lines);
    };

    let mut batch = Vec::new();
    for line in input.lines() {
        let line = line.map_err(BatchError::Input)?;
        batch.push(line.trim().to_string());
        if batch.len() == options.batch_size {
            submit(std::mem::take(&mut batch));
        }
    }
    // The last, partial batch.
    if !batch.is_empty() {
        submit(batch);
    }

    tracing::info!("waiting to finish");
    let summary = pool.join();
    tracing::info!("finished");

    report.completed_batches = summary.completed;
    report.failed_batches = summary.failed;
    Ok(report)
}
