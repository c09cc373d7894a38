mod utils;
use utils::*;

use axum::http::StatusCode;
use fibbench::prelude::*;
use std::time::Duration;

const NO_DELAY: Duration = Duration::ZERO;

#[tokio::test]
#[ntest::timeout(30_000)]
async fn sampler_against_fib_service() {
    init();
    let base = spawn_fib_service().await;
    let sampler =
        HttpSampler::new(ServiceEndpoint::new("rust", &base), Duration::from_secs(5)).unwrap();

    let latency = sampler.sample(30).await.unwrap();
    assert!(latency > Duration::ZERO);

    let rejected = sampler.sample(91).await;
    assert!(matches!(
        rejected,
        Err(SampleError::Status(reqwest::StatusCode::BAD_REQUEST))
    ));
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn slow_response_times_out() {
    init();
    let base = spawn(stub_service(
        StatusCode::OK,
        NO_DELAY,
        StatusCode::OK,
        Duration::from_secs(3),
        Hits::default(),
    ))
    .await;
    let sampler =
        HttpSampler::new(ServiceEndpoint::new("slow", &base), Duration::from_millis(200)).unwrap();

    assert!(matches!(sampler.sample(10).await, Err(SampleError::Timeout)));
}

#[tokio::test]
#[ntest::timeout(60_000)]
async fn only_healthy_services_are_benchmarked() {
    init();
    let rust = spawn_fib_service().await;

    let sick_hits = Hits::default();
    let sick = spawn(stub_service(
        StatusCode::SERVICE_UNAVAILABLE,
        NO_DELAY,
        StatusCode::OK,
        NO_DELAY,
        sick_hits.clone(),
    ))
    .await;

    let sleepy_hits = Hits::default();
    let sleepy = spawn(stub_service(
        StatusCode::OK,
        Duration::from_secs(3),
        StatusCode::OK,
        NO_DELAY,
        sleepy_hits.clone(),
    ))
    .await;

    let config = BenchConfig::new()
        .num_requests(6)
        .concurrency(3)
        .inputs(&[10, 20])
        .health_timeout(Duration::from_millis(500))
        .services(vec![
            ServiceEndpoint::new("sick", &sick),
            ServiceEndpoint::new("rust", &rust),
            ServiceEndpoint::new("ghost", &unreachable()),
            ServiceEndpoint::new("sleepy", &sleepy),
        ]);

    let orchestrator = Orchestrator::new(config).unwrap();
    let available = orchestrator.available_services().await;
    assert_eq!(available, vec![ServiceEndpoint::new("rust", &rust)]);

    let results = orchestrator.run().await.unwrap();
    assert_eq!(results.service_names().collect::<Vec<_>>(), vec!["rust"]);
    assert_eq!(sick_hits.get(), 0);
    assert_eq!(sleepy_hits.get(), 0);

    let rust_results = results.get("rust").unwrap();
    assert_eq!(rust_results.inputs().collect::<Vec<_>>(), vec![10, 20]);
    for (_, res) in rust_results.iter() {
        for mode in Mode::ALL {
            let stats = res.stats(mode);
            assert_eq!(stats.success_rate, 1.0);
            assert!(stats.min <= stats.median && stats.median <= stats.max);
            assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        }
    }

    assert_eq!(results.config().num_requests, 6);
    assert_eq!(results.config().concurrent_requests, 3);
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn rejected_inputs_are_omitted() {
    init();
    let rust = spawn_fib_service().await;
    let config = BenchConfig::new()
        .num_requests(3)
        .concurrency(2)
        .inputs(&[10, 91])
        .services(vec![ServiceEndpoint::new("rust", &rust)]);

    let results = Orchestrator::new(config).unwrap().run().await.unwrap();
    let rust_results = results.get("rust").unwrap();
    assert!(rust_results.contains(10));
    assert!(!rust_results.contains(91));
}

#[tokio::test]
#[ntest::timeout(30_000)]
async fn always_failing_service_has_no_inputs() {
    init();
    let hits = Hits::default();
    let broken = spawn(stub_service(
        StatusCode::OK,
        NO_DELAY,
        StatusCode::INTERNAL_SERVER_ERROR,
        NO_DELAY,
        hits.clone(),
    ))
    .await;
    let config = BenchConfig::new()
        .num_requests(4)
        .concurrency(2)
        .inputs(&[10, 20])
        .services(vec![ServiceEndpoint::new("broken", &broken)]);

    let results = Orchestrator::new(config).unwrap().run().await.unwrap();
    assert!(results.get("broken").unwrap().is_empty());
    // Both phases are still run in full: 2 inputs x 2 phases x 4 requests.
    assert_eq!(hits.get(), 16);
}

#[tokio::test]
#[ntest::timeout(60_000)]
async fn end_to_end_report() {
    init();
    let rust = spawn_fib_service().await;
    let python = spawn_fib_service().await;
    let config = BenchConfig::new()
        .num_requests(4)
        .concurrency(2)
        .inputs(&[10, 40])
        .services(vec![
            ServiceEndpoint::new("rust", &rust),
            ServiceEndpoint::new("python", &python),
        ]);

    let results = Orchestrator::new(config).unwrap().run().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let reporter = Reporter::new(ReportConfig {
        output_dir: dir.path().to_path_buf(),
        ..ReportConfig::default()
    });
    let artifacts = reporter.report(&results);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(artifacts.results.unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["config"]["num_requests"], 4);
    assert_eq!(json["results"]["rust"]["40"]["concurrent"]["success_rate"], 1.0);
    assert!(json["results"]["python"]["10"]["sequential"]["mean"].as_f64().unwrap() > 0.);

    assert_eq!(artifacts.charts.len(), 2);
    let speedups = reporter.speedups(&results);
    assert_eq!(speedups.len(), 2);
    assert!(speedups.iter().all(|s| s.service == "rust" && s.ratio.is_some()));
}
