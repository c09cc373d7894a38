//! Multi-service benchmark orchestration
//!
//! The pipeline is fixed: health-check every configured service, benchmark the available ones in
//! order across the configured inputs, and aggregate everything into one [`AggregateResult`].
use crate::error::BenchError;
use crate::health::HealthChecker;
use crate::runner::BenchmarkRunner;
use crate::sampler::HttpSampler;
use fibbench_core::{AggregateResult, BenchConfig, RunConfig, ServiceEndpoint, MAX_FIBONACCI_INPUT};
use reqwest::Client;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

pub struct Orchestrator {
    config: BenchConfig,
    client: Client,
    health: HealthChecker,
}

impl Orchestrator {
    pub fn new(config: BenchConfig) -> Result<Self, BenchError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let health = HealthChecker::new(config.health_timeout)?;

        for input in config.inputs.iter().filter(|n| **n > MAX_FIBONACCI_INPUT) {
            warn!("n={input} is above {MAX_FIBONACCI_INPUT}; services are expected to reject it.");
        }

        Ok(Self {
            config,
            client,
            health,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub async fn available_services(&self) -> Vec<ServiceEndpoint> {
        info!("Checking service availability...");
        self.health.available(&self.config.services).await
    }

    /// Run the whole pipeline.
    ///
    /// Fails with [`BenchError::NoServicesAvailable`] before sending a single benchmark request if
    /// no service passes its health check.
    #[instrument(name = "orchestrator", skip_all)]
    pub async fn run(&self) -> Result<AggregateResult, BenchError> {
        let available = self.available_services().await;
        if available.is_empty() {
            error!("No services available for benchmarking!");
            return Err(BenchError::NoServicesAvailable);
        }

        info!("Benchmarking {} service(s)...", available.len());
        let mut results = AggregateResult::new(RunConfig::now(
            self.config.num_requests,
            self.config.concurrency,
        ));

        for endpoint in available {
            let sampler = HttpSampler::with_client(self.client.clone(), endpoint.clone());
            let runner =
                BenchmarkRunner::new(sampler, self.config.num_requests, self.config.concurrency);
            let service_result = runner.run(&self.config.inputs).await;

            if service_result.is_empty() {
                warn!("{} produced no results.", endpoint.name);
            }
            results.insert(&endpoint.name, service_result);
        }

        Ok(results)
    }
}
