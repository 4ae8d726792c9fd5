//! Stand-in downstream validator for local runs.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use address_gateway::config::ObservabilityConfig;
use address_gateway::lifecycle::signals::shutdown_signal;
use address_gateway::observability::logging;
use address_gateway::upstream::provider::{self, ProviderState};

#[derive(Parser)]
#[command(name = "address-provider")]
#[command(about = "Slow, metered address validator", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0:8001")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_tracing(&ObservabilityConfig::default());

    let app = provider::router(Arc::new(ProviderState::new()));
    let listener = TcpListener::bind(&args.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Address provider listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
