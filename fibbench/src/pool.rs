use async_channel::{bounded, unbounded};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Fixed-size pool of tokio workers for fanning a batch of jobs out.
///
/// A pool is meant to be scoped to one batch: [`WorkerPool::run`] spawns the workers, feeds them
/// every job, and joins them all before returning. Nothing is carried over between calls.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `task` once for each job index in `0..jobs`, with at most `size` in flight.
    ///
    /// Results come back in completion order. A job whose worker panics has no result, so the
    /// returned vector can be shorter than `jobs`; the remaining jobs are picked up by the
    /// surviving workers.
    pub async fn run<T, F, Fut>(&self, jobs: usize, task: F) -> Vec<T>
    where
        F: Fn(usize) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        if jobs == 0 {
            return vec![];
        }

        let (job_tx, job_rx) = bounded(jobs);
        for job in 0..jobs {
            // NOTE: Capacity equals the job count, so this never waits.
            if job_tx.send(job).await.is_err() {
                break;
            }
        }
        job_tx.close();

        let (out_tx, out_rx) = unbounded();
        let task = Arc::new(task);
        let workers: Vec<JoinHandle<()>> = (0..self.size.min(jobs))
            .map(|_| {
                let job_rx = job_rx.clone();
                let out_tx = out_tx.clone();
                let task = task.clone();
                tokio::spawn(async move {
                    while let Ok(job) = job_rx.recv().await {
                        let res = (*task)(job).await;
                        if out_tx.send(res).await.is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(out_tx);

        for handle in workers {
            if let Err(err) = handle.await {
                error!("Worker failed: {err}");
            }
        }

        let mut results = Vec::with_capacity(jobs);
        while let Ok(res) = out_rx.try_recv() {
            results.push(res);
        }

        if results.len() < jobs {
            warn!("{} of {jobs} jobs produced no result.", jobs - results.len());
        }

        results
    }
}
