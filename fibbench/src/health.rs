use fibbench_core::ServiceEndpoint;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Outcome of probing `{base}/health`.
#[derive(Debug)]
pub enum Health {
    Available,
    Status(StatusCode),
    Unreachable(reqwest::Error),
}

impl Health {
    pub fn is_available(&self) -> bool {
        matches!(self, Health::Available)
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Available => write!(f, "available"),
            Health::Status(status) => write!(f, "unavailable (HTTP {status})"),
            Health::Unreachable(err) => write!(f, "unavailable: {err}"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthChecker {
    client: Client,
}

impl HealthChecker {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// A service is available only if its health endpoint answers `200 OK` in time.
    pub async fn check(&self, endpoint: &ServiceEndpoint) -> Health {
        let health = match self.client.get(endpoint.health_url()).send().await {
            Ok(res) if res.status() == StatusCode::OK => Health::Available,
            Ok(res) => Health::Status(res.status()),
            Err(err) => Health::Unreachable(err),
        };

        if health.is_available() {
            info!("{} service is available", endpoint.name);
        } else {
            warn!("{} service is {health}", endpoint.name);
        }

        health
    }

    /// Probe every service in order and keep the available ones. No retries.
    pub async fn available(&self, services: &[ServiceEndpoint]) -> Vec<ServiceEndpoint> {
        let mut available = vec![];
        for endpoint in services {
            if self.check(endpoint).await.is_available() {
                available.push(endpoint.clone());
            }
        }
        available
    }
}
