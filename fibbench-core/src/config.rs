use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A named compute service and the base URL it is reachable under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub name: String,
    pub base_url: String,
}

impl ServiceEndpoint {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    pub fn fibonacci_url(&self, input: u32) -> String {
        fibonacci_url(&self.base_url, input)
    }
}

pub fn fibonacci_url(base_url: &str, input: u32) -> String {
    format!("{}/fibonacci/{input}", base_url.trim_end_matches('/'))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEndpointError {
    #[error("Expected `name=url`, got `{0}`")]
    MissingSeparator(String),

    #[error("Service name is empty")]
    EmptyName,

    #[error("Service URL `{0}` must start with http:// or https://")]
    BadScheme(String),
}

/// Parses the `name=url` form used on the command line.
impl FromStr for ServiceEndpoint {
    type Err = ParseEndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) = s
            .split_once('=')
            .ok_or_else(|| ParseEndpointError::MissingSeparator(s.to_string()))?;

        let name = name.trim();
        let url = url.trim();
        if name.is_empty() {
            return Err(ParseEndpointError::EmptyName);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ParseEndpointError::BadScheme(url.to_string()));
        }

        Ok(Self::new(name, url))
    }
}

/// The services benchmarked when none are given explicitly.
pub fn default_services() -> Vec<ServiceEndpoint> {
    vec![
        ServiceEndpoint::new("rust", "http://127.0.0.1:8080"),
        ServiceEndpoint::new("go", "http://127.0.0.1:8081"),
        ServiceEndpoint::new("java", "http://127.0.0.1:8082"),
        ServiceEndpoint::new("python", "http://127.0.0.1:8000"),
    ]
}

/// Immutable configuration for a whole benchmark run.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub num_requests: usize,
    pub concurrency: usize,
    pub inputs: Vec<u32>,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    pub services: Vec<ServiceEndpoint>,
    pub baseline: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            num_requests: DEFAULT_NUM_REQUESTS,
            concurrency: DEFAULT_CONCURRENCY,
            inputs: DEFAULT_INPUTS.to_vec(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            services: default_services(),
            baseline: DEFAULT_BASELINE.to_string(),
        }
    }
}

impl BenchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_requests(mut self, num_requests: usize) -> Self {
        self.num_requests = num_requests;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn inputs(mut self, inputs: &[u32]) -> Self {
        self.inputs = inputs.to_vec();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn services(mut self, services: Vec<ServiceEndpoint>) -> Self {
        self.services = services;
        self
    }

    pub fn baseline(mut self, baseline: &str) -> Self {
        self.baseline = baseline.to_string();
        self
    }
}
