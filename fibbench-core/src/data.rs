use crate::stats::BatchStats;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Map};
use std::collections::BTreeSet;
use std::fmt;
use time::OffsetDateTime;

/// How the requests of a batch are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Sequential,
    Concurrent,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Sequential, Mode::Concurrent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Sequential => "sequential",
            Mode::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Both batches measured for a single input. Only ever built when both phases produced stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputResult {
    pub sequential: BatchStats,
    pub concurrent: BatchStats,
}

impl InputResult {
    pub fn stats(&self, mode: Mode) -> &BatchStats {
        match mode {
            Mode::Sequential => &self.sequential,
            Mode::Concurrent => &self.concurrent,
        }
    }
}

/// Results for one service, keyed by Fibonacci input, in the order the inputs were benchmarked.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceResult {
    #[serde_as(as = "Map<_, _>")]
    inputs: Vec<(u32, InputResult)>,
}

impl ServiceResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the result for an input. New inputs are appended.
    pub fn insert(&mut self, input: u32, result: InputResult) {
        if let Some((_, existing)) = self.inputs.iter_mut().find(|(n, _)| *n == input) {
            *existing = result;
        } else {
            self.inputs.push((input, result));
        }
    }

    pub fn get(&self, input: u32) -> Option<&InputResult> {
        self.inputs
            .iter()
            .find(|(n, _)| *n == input)
            .map(|(_, res)| res)
    }

    pub fn contains(&self, input: u32) -> bool {
        self.get(input).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &InputResult)> {
        self.inputs.iter().map(|(input, res)| (*input, res))
    }

    pub fn inputs(&self) -> impl Iterator<Item = u32> + '_ {
        self.inputs.iter().map(|(input, _)| *input)
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl FromIterator<(u32, InputResult)> for ServiceResult {
    fn from_iter<I: IntoIterator<Item = (u32, InputResult)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (input, res) in iter {
            result.insert(input, res);
        }
        result
    }
}

/// The configuration a run was performed with, persisted alongside its results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub num_requests: usize,
    pub concurrent_requests: usize,
    /// Unix time in seconds at which the run started.
    pub timestamp: f64,
}

impl RunConfig {
    pub fn now(num_requests: usize, concurrent_requests: usize) -> Self {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9;
        Self {
            num_requests,
            concurrent_requests,
            timestamp,
        }
    }
}

/// Everything a benchmark run produced: one [`ServiceResult`] per benchmarked service, in the
/// order the services were benchmarked.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    #[serde_as(as = "Map<_, _>")]
    results: Vec<(String, ServiceResult)>,
    config: RunConfig,
}

impl AggregateResult {
    pub fn new(config: RunConfig) -> Self {
        Self {
            results: vec![],
            config,
        }
    }

    /// Add (or replace) the results of a service. New services are appended.
    pub fn insert(&mut self, service: &str, result: ServiceResult) {
        if let Some((_, existing)) = self.results.iter_mut().find(|(name, _)| name == service) {
            *existing = result;
        } else {
            self.results.push((service.to_string(), result));
        }
    }

    pub fn get(&self, service: &str) -> Option<&ServiceResult> {
        self.results
            .iter()
            .find(|(name, _)| name == service)
            .map(|(_, res)| res)
    }

    pub fn services(&self) -> impl Iterator<Item = (&str, &ServiceResult)> {
        self.results.iter().map(|(name, res)| (name.as_str(), res))
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|(name, _)| name.as_str())
    }

    /// Every input measured for at least one service, ascending.
    pub fn inputs(&self) -> Vec<u32> {
        self.results
            .iter()
            .flat_map(|(_, res)| res.inputs())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
