use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use telebridge_client::load::Workload;
use telebridge_client::{run_reporter, SdkMetrics};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Simulated SDK that reports telemetry to a telebridge gateway.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Telemetry endpoint of the gateway.
    #[arg(long, env = "TELEBRIDGE_URL", default_value = "ws://127.0.0.1:8091/_appTelemetry")]
    url: String,

    /// Value of the `agent` label on every reported line.
    #[arg(long, default_value = concat!("telebridge-client/", env!("CARGO_PKG_VERSION")))]
    agent: String,

    /// Delay between simulated operations.
    #[arg(long, default_value_t = 1)]
    op_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let metrics = Arc::new(SdkMetrics::new(args.agent));
    let cancel = CancellationToken::new();

    let load = tokio::spawn({
        let metrics = metrics.clone();
        let cancel = cancel.clone();
        let period = Duration::from_millis(args.op_interval_ms.max(1));
        async move {
            let workload = Workload::default();
            let mut rng = StdRng::from_entropy();
            let mut tick = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => workload.simulate_operation(&mut rng, &metrics),
                }
            }
        }
    });

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            cancel.cancel();
        }
    });

    let res = run_reporter(&args.url, metrics, cancel.clone()).await;
    cancel.cancel();
    let _ = load.await;

    match res {
        Ok(()) => info!("reporter finished"),
        Err(e) if !e.is_failure() => info!("reporter stopped"),
        Err(e) => {
            error!(kind = e.kind().as_str(), error = %e, "reporter failed");
            std::process::exit(1);
        }
    }
}
