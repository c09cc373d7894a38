use thiserror::Error;

/// Run-level failures. Everything per request is absorbed by the sampler instead.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("No services available for benchmarking")]
    NoServicesAvailable,

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
