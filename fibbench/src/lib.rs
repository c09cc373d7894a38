#![doc = include_str!("../README.md")]

pub mod error;
pub mod health;
pub mod orchestrator;
pub mod pool;
pub mod report;
pub mod runner;
pub mod sampler;

pub use fibbench_core as core;

pub mod prelude {
    pub use crate::error::BenchError;
    pub use crate::health::{Health, HealthChecker};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::pool::WorkerPool;
    pub use crate::report::{ChartStyle, ReportConfig, Reporter};
    pub use crate::runner::BenchmarkRunner;
    pub use crate::sampler::{HttpSampler, Sample, SampleError, Sampler};

    pub use fibbench_core::{
        AggregateResult, BatchStats, BenchConfig, InputResult, Mode, RunConfig, ServiceEndpoint,
        ServiceResult,
    };
}
