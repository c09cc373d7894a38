use clap::Parser;
use fibbench::prelude::*;
use fibbench_core::{
    default_services, DEFAULT_BASELINE, DEFAULT_CONCURRENCY, DEFAULT_INPUTS, DEFAULT_NUM_REQUESTS,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(version, about = "Benchmark Fibonacci web services against each other")]
struct Cli {
    /// Requests per batch
    #[arg(short, long, default_value_t = DEFAULT_NUM_REQUESTS)]
    requests: usize,

    /// Workers used for the concurrent batch
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Fibonacci inputs to benchmark (defaults to 10 20 30 40)
    #[arg(short, long, num_args = 1..)]
    inputs: Vec<u32>,

    /// Service to benchmark as `name=url`. Replaces the default registry when given.
    #[arg(short, long = "service")]
    services: Vec<ServiceEndpoint>,

    /// Service the others are compared against
    #[arg(short, long, default_value = DEFAULT_BASELINE)]
    baseline: String,

    /// Directory for the JSON results and the charts
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[arg(long, default_value_t = 5)]
    health_timeout_secs: u64,

    /// Skip writing the SVG charts
    #[arg(long)]
    no_charts: bool,

    /// Serve Prometheus metrics on this address while benchmarking
    #[cfg(feature = "metrics")]
    #[arg(long)]
    prometheus: Option<std::net::SocketAddr>,
}

impl Cli {
    fn bench_config(&self) -> BenchConfig {
        let inputs = if self.inputs.is_empty() {
            DEFAULT_INPUTS.to_vec()
        } else {
            self.inputs.clone()
        };
        let services = if self.services.is_empty() {
            default_services()
        } else {
            self.services.clone()
        };

        BenchConfig::new()
            .num_requests(self.requests)
            .concurrency(self.concurrency)
            .inputs(&inputs)
            .services(services)
            .baseline(&self.baseline)
            .request_timeout(Duration::from_secs(self.timeout_secs))
            .health_timeout(Duration::from_secs(self.health_timeout_secs))
    }

    fn report_config(&self, config: &BenchConfig) -> ReportConfig {
        ReportConfig {
            output_dir: self.output_dir.clone(),
            charts: !self.no_charts,
            ..ReportConfig::from(config)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fibbench=info")),
        )
        .init();

    let args = Cli::parse();

    #[cfg(feature = "metrics")]
    if let Some(addr) = args.prometheus {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
    }

    let config = args.bench_config();
    let orchestrator = Orchestrator::new(config)?;

    let results = match orchestrator.run().await {
        Ok(results) => results,
        Err(BenchError::NoServicesAvailable) => {
            eprintln!("No services available for benchmarking!");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    Reporter::new(args.report_config(orchestrator.config())).report(&results);
    Ok(())
}
