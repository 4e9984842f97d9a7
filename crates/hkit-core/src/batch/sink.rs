//! Shared line output for batch operations.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Mutex-guarded writer. Each [`LineSink::write_lines`] call lands as one
/// contiguous block, so lines from concurrent batches never interleave.
pub struct LineSink<W: Write> {
    inner: Mutex<W>,
}

impl LineSink<BufWriter<File>> {
    /// Creates (truncating) `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Mutex::new(writer),
        }
    }

    pub fn write_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<()> {
        let mut w = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("line sink poisoned by a panicked batch"))?;
        for line in lines {
            writeln!(w, "{}", line.as_ref()).context("write line")?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        let mut w = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("line sink poisoned by a panicked batch"))?;
        w.flush().context("flush line sink")
    }

    pub fn into_inner(self) -> W {
        match self.inner.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
