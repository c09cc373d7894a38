use axum::{debug_handler, extract::Path, http::StatusCode, routing::get, Json, Router};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Largest `n` served. `fib(94)` is the first value to overflow a `u64`.
pub const MAX_NUMBER: u64 = 90;

pub const SERVICE_NAME: &str = "rust";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibonacciResponse {
    pub number: u64,
    pub result: u64,
    pub calculation_time_ns: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/fibonacci/:number", get(fibonacci_handler))
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already bound listener. Handy for binding port 0 and handing out the address.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    info!("Fibonacci service listening on {}", listener.local_addr()?);
    axum::serve(listener, router()).await
}

pub async fn run(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    serve(listener).await
}

async fn root() -> &'static str {
    "Fibonacci Web Service - use /fibonacci/{number}"
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

#[debug_handler]
async fn fibonacci_handler(
    Path(number): Path<u64>,
) -> Result<Json<FibonacciResponse>, (StatusCode, Json<ErrorResponse>)> {
    counter!("fib-service.requests").increment(1);

    let too_large = || {
        debug!("Rejecting n={number}");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: format!("Number too large. Maximum is {MAX_NUMBER}."),
            }),
        )
    };
    if number > MAX_NUMBER {
        return Err(too_large());
    }

    let start = Instant::now();
    let result = fibonacci(number).ok_or_else(too_large)?;
    let calculation_time_ns = start.elapsed().as_nanos();
    histogram!("fib-service.calculation_time_ns").record(calculation_time_ns as f64);

    Ok(Json(FibonacciResponse {
        number,
        result,
        calculation_time_ns,
    }))
}

/// Iterative Fibonacci with `fib(0) = 0` and `fib(1) = 1`. `None` once the value overflows a
/// `u64`, which happens from `n = 94`.
pub fn fibonacci(n: u64) -> Option<u64> {
    if n == 0 {
        return Some(0);
    }
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 1..n {
        (a, b) = (b, a.checked_add(b)?);
    }
    Some(b)
}
