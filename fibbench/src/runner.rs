//! Benchmark execution for a single service
use crate::pool::WorkerPool;
use crate::sampler::{Sample, Sampler};
use fibbench_core::{BatchStats, InputResult, Mode, ServiceResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

const PROGRESS_INTERVAL: usize = 100;

/// Runs the sequential and concurrent batches for each input against one service.
pub struct BenchmarkRunner<S> {
    sampler: Arc<S>,
    num_requests: usize,
    pool: WorkerPool,
}

impl<S> BenchmarkRunner<S>
where
    S: Sampler + 'static,
{
    pub fn new(sampler: S, num_requests: usize, concurrency: usize) -> Self {
        Self {
            sampler: Arc::new(sampler),
            num_requests,
            pool: WorkerPool::new(concurrency),
        }
    }

    pub fn num_requests(&self) -> usize {
        self.num_requests
    }

    pub fn concurrency(&self) -> usize {
        self.pool.size()
    }

    /// Benchmark every input in order. Inputs where a whole phase failed are left out.
    #[instrument(name = "service", skip_all, fields(service = self.sampler.service()))]
    pub async fn run(&self, inputs: &[u32]) -> ServiceResult {
        let mut results = ServiceResult::new();
        for &input in inputs {
            if let Some(res) = self.run_input(input).await {
                results.insert(input, res);
            }
        }
        results
    }

    /// Run both phases for `input`.
    ///
    /// Returns `None` if either phase had no successful sample at all; a partial record is never
    /// produced.
    #[instrument(name = "input", skip(self))]
    pub async fn run_input(&self, input: u32) -> Option<InputResult> {
        info!("Benchmarking {} n={input}", self.sampler.service());

        let start = Instant::now();
        let sequential = self.batch(Mode::Sequential, input).await;
        let concurrent = self.batch(Mode::Concurrent, input).await;
        debug!("n={input} took {}", humantime::format_duration(round_ms(start.elapsed())));

        match (sequential, concurrent) {
            (Some(sequential), Some(concurrent)) => {
                for mode in Mode::ALL {
                    let stats = match mode {
                        Mode::Sequential => &sequential,
                        Mode::Concurrent => &concurrent,
                    };
                    info!(
                        "n={input}: {mode:<10} {:.3}ms (success: {:.1}%)",
                        stats.mean,
                        stats.success_rate * 100.
                    );
                }
                Some(InputResult {
                    sequential,
                    concurrent,
                })
            }
            _ => {
                error!(
                    "n={input}: no successful samples for {}, skipping input.",
                    self.sampler.service()
                );
                None
            }
        }
    }

    async fn batch(&self, mode: Mode, input: u32) -> Option<BatchStats> {
        let samples = match mode {
            Mode::Sequential => self.sequential(input).await,
            Mode::Concurrent => self.concurrent(input).await,
        };
        batch_stats(&samples, self.num_requests)
    }

    /// Issue every request one after another.
    pub async fn sequential(&self, input: u32) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(self.num_requests);
        for i in 0..self.num_requests {
            samples.push(self.sampler.sample(input).await);

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                debug!("Sequential: {}/{}", i + 1, self.num_requests);
            }
        }
        samples
    }

    /// Issue every request through a worker pool scoped to this call.
    pub async fn concurrent(&self, input: u32) -> Vec<Sample> {
        let sampler = self.sampler.clone();
        self.pool
            .run(self.num_requests, move |_| {
                let sampler = sampler.clone();
                async move { sampler.sample(input).await }
            })
            .await
    }
}

/// Statistics over the successful samples of a batch of `requested` samples.
pub fn batch_stats(samples: &[Sample], requested: usize) -> Option<BatchStats> {
    let latencies: Vec<Duration> = samples
        .iter()
        .filter_map(|sample| sample.as_ref().ok().copied())
        .collect();
    BatchStats::from_durations(&latencies, requested)
}

fn round_ms(dur: Duration) -> Duration {
    Duration::from_millis(dur.as_millis() as u64)
}
