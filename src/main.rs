/// jlinx gateway binary
///
/// Reads `PORT` and `JLINX_STORAGE` (plus optional settings) from the
/// environment or a `.env` file, serves until Ctrl-C, then shuts down.
use jlinx_gateway::{Gateway, GatewayConfig, GatewayResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jlinx_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "jlinx http server failed");
        std::process::exit(1);
    }
}

async fn run() -> GatewayResult<()> {
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = %config.storage_path.display(),
        "starting jlinx http server"
    );

    let mut gateway = Gateway::new(config);
    gateway.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    gateway.stop().await
}
