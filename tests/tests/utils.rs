use axum::{extract::State, http::StatusCode, routing::get, Router};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(
                "fibbench=debug,fib_service=debug,axum::rejection=trace",
            ))
            .with_test_writer()
            .try_init();
    });
}

/// Serve `app` on an ephemeral port and return its base URL.
#[allow(unused)]
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}")
}

#[allow(unused)]
pub async fn spawn_fib_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { fib_service::serve(listener).await });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
#[allow(unused)]
pub fn unreachable() -> String {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    format!("http://{addr}")
}

/// Counts how often its Fibonacci endpoint gets hit.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    #[allow(unused)]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Health endpoint answers `health_status`; Fibonacci endpoint answers `fib_status` after `delay`.
#[allow(unused)]
pub fn stub_service(
    health_status: StatusCode,
    health_delay: Duration,
    fib_status: StatusCode,
    delay: Duration,
    hits: Hits,
) -> Router {
    Router::new()
        .route(
            "/health",
            get(move || async move {
                tokio::time::sleep(health_delay).await;
                health_status
            }),
        )
        .route(
            "/fibonacci/:number",
            get(move |State(hits): State<Hits>| async move {
                hits.hit();
                tokio::time::sleep(delay).await;
                fib_status
            }),
        )
        .with_state(hits)
}
