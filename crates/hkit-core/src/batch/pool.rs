//! Fixed-size pool of named worker threads fed from an unbounded queue.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// Completed / failed job counts after [`WorkerPool::join`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PoolSummary {
    pub completed: usize,
    pub failed: usize,
}

/// Workers pull jobs from a shared queue until the pool is closed. A job that
/// returns an error or panics is counted as failed; the worker moves on.
/// Dropping the pool closes the queue and waits for queued jobs to finish.
pub(crate) struct WorkerPool {
    sender: Option<mpsc::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    outcomes: mpsc::Receiver<bool>,
}

impl WorkerPool {
    pub(crate) fn new(size: usize) -> io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(Mutex::new(receiver));
        let (outcome_tx, outcomes) = mpsc::channel();

        let mut pool = WorkerPool {
            sender: Some(sender),
            workers: Vec::with_capacity(size),
            outcomes,
        };
        for index in 0..size.max(1) {
            let receiver = Arc::clone(&receiver);
            let outcome_tx = outcome_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("batch-worker-{}", index))
                .spawn(move || worker_loop(&receiver, &outcome_tx))?;
            pool.workers.push(handle);
        }
        Ok(pool)
    }

    /// Queues `job`; never blocks.
    pub(crate) fn submit<F>(&self, job: F)
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            if sender.send(Box::new(job)).is_err() {
                tracing::warn!("worker pool queue closed; job dropped");
            }
        }
    }

    /// Closes the queue and blocks until every queued job has run.
    pub(crate) fn join(mut self) -> PoolSummary {
        self.shutdown();
        let mut summary = PoolSummary::default();
        for ok in self.outcomes.try_iter() {
            if ok {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }

    fn shutdown(&mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("batch worker exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(receiver: &Mutex<mpsc::Receiver<Job>>, outcomes: &mpsc::Sender<bool>) {
    loop {
        let job = match receiver.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => break,
        };
        let Ok(job) = job else {
            break;
        };
        let ok = match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!("batch failed: {:#}", e);
                false
            }
            Err(_) => {
                tracing::warn!("batch panicked");
                false
            }
        };
        let _ = outcomes.send(ok);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn runs_every_job_before_join_returns() {
        let pool = WorkerPool::new(3).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..20 {
            let done = Arc::clone(&done);
            pool.submit(move || {
                std::thread::sleep(std::time::Duration::from_millis(2));
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        let summary = pool.join();
        assert_eq!(done.load(Ordering::SeqCst), 20);
        assert_eq!(summary, PoolSummary { completed: 20, failed: 0 });
    }

    #[test]
    fn errors_and_panics_count_as_failed() {
        let pool = WorkerPool::new(2).unwrap();
        pool.submit(|| Ok(()));
        pool.submit(|| anyhow::bail!("bad input"));
        pool.submit(|| panic!("boom"));
        pool.submit(|| Ok(()));
        let summary = pool.join();
        assert_eq!(summary, PoolSummary { completed: 2, failed: 2 });
    }

    #[test]
    fn workers_are_named_and_bounded() {
        let pool = WorkerPool::new(2).unwrap();
        let names = Arc::new(Mutex::new(HashSet::new()));
        for _ in 0..10 {
            let names = Arc::clone(&names);
            pool.submit(move || {
                let name = std::thread::current().name().unwrap_or("").to_string();
                names.lock().unwrap().insert(name);
                Ok(())
            });
        }
        pool.join();
        let names = names.lock().unwrap();
        assert!(names.len() <= 2);
        assert!(names.iter().all(|n| n.starts_with("batch-worker-")));
    }
}
