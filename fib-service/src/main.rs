use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(version, about = "Fibonacci compute service")]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fib_service=info,tower_http=debug")),
        )
        .init();

    let args = Cli::parse();
    println!("Starting Rust Fibonacci server on http://{}", args.addr);
    println!("Test endpoint: http://{}/fibonacci/10", args.addr);

    fib_service::run(args.addr).await?;
    Ok(())
}
