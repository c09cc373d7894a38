//! Latency sampling
//!
//! A [`Sampler`] issues exactly one request per call and reports either the wall-clock latency of
//! a successful response or why it did not get one. Failures never propagate past this point:
//! they are logged and handed back as the `Err` side of a [`Sample`].
use fibbench_core::ServiceEndpoint;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// A single latency measurement, or the reason there is none.
pub type Sample = Result<Duration, SampleError>;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for SampleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SampleError::Timeout
        } else {
            SampleError::Transport(err)
        }
    }
}

/// Source of latency samples for a single service.
pub trait Sampler: Send + Sync {
    /// Name of the service being sampled, used for logs and metric labels.
    fn service(&self) -> &str;

    fn sample(&self, input: u32) -> impl Future<Output = Sample> + Send;
}

/// Samples `GET {base}/fibonacci/{input}` over HTTP.
///
/// Only a `200 OK` counts as a success; any other status is a failure regardless of the reason the
/// service gives for it. No retries.
#[derive(Clone, Debug)]
pub struct HttpSampler {
    client: Client,
    endpoint: ServiceEndpoint,
}

impl HttpSampler {
    pub fn new(endpoint: ServiceEndpoint, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint))
    }

    /// Reuse an existing client. The client's timeout applies to every sample.
    pub fn with_client(client: Client, endpoint: ServiceEndpoint) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    async fn request(&self, input: u32) -> Sample {
        let url = self.endpoint.fibonacci_url(input);
        let start = Instant::now();
        let res = self.client.get(&url).send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            debug!("{url} answered {status}: {body}");
            return Err(SampleError::Status(status));
        }

        // NOTE: The body is part of the response, so it's part of the latency.
        res.bytes().await?;
        Ok(start.elapsed())
    }
}

impl Sampler for HttpSampler {
    fn service(&self) -> &str {
        &self.endpoint.name
    }

    async fn sample(&self, input: u32) -> Sample {
        let sample = self.request(input).await;

        match &sample {
            Ok(latency) => trace!("{} n={input}: {latency:?}", self.endpoint.name),
            Err(err) => warn!("Request to {} n={input} failed: {err}", self.endpoint.name),
        }

        #[cfg(feature = "metrics")]
        record_sample(&self.endpoint.name, &sample);

        sample
    }
}

#[cfg(feature = "metrics")]
fn record_sample(service: &str, sample: &Sample) {
    let service = service.to_string();
    match sample {
        Ok(latency) => {
            metrics::histogram!("fibbench.latency", "service" => service.clone())
                .record(latency.as_nanos() as f64);
            metrics::counter!("fibbench.success", "service" => service).increment(1);
        }
        Err(_) => {
            metrics::counter!("fibbench.error", "service" => service).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(
            SampleError::Status(StatusCode::BAD_REQUEST).to_string(),
            "HTTP 400 Bad Request"
        );
        assert_eq!(SampleError::Timeout.to_string(), "Request timed out");
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn connection_refused_is_a_failed_sample() {
        // Bind then drop to get a port nothing listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let sampler = HttpSampler::new(
            ServiceEndpoint::new("nowhere", &format!("http://{addr}")),
            Duration::from_secs(2),
        )
        .unwrap();

        let sample = sampler.sample(10).await;
        assert!(matches!(sample, Err(SampleError::Transport(_))));
        assert!(logs_contain("Request to nowhere n=10 failed"));
    }
}
