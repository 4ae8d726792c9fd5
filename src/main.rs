//! Address Validation Gateway (v1)
//!
//! A resilience layer in front of a slow, metered address validator.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌───────────────────────────────────────────────────┐
//!                          │                 ADDRESS GATEWAY                   │
//!                          │                                                   │
//!   POST /validate         │  ┌────────┐   ┌───────────────────────────────┐   │
//!   ───────────────────────┼─▶│  http  │──▶│           gateway             │   │
//!                          │  │ server │   │ quota → input → cache →       │   │
//!                          │  └────────┘   │ concurrency → upstream        │   │
//!                          │       ▲       └──────────────┬────────────────┘   │
//!   GET|POST               │       │                      │                    │
//!   /toggle-feature ───────┼─▶ admin ──▶ features         ▼                    │
//!                          │                       ┌────────────┐             │
//!   Client Response        │                       │  upstream  │─────────────┼──▶ Validator
//!   ◀──────────────────────┼───────────────────────│   client   │◀────────────┼─── (slow)
//!                          │                       └────────────┘             │
//!                          │  ┌─────────────────────────────────────────────┐ │
//!                          │  │ config (+ hot reload) │ observability │     │ │
//!                          │  │ lifecycle (startup / shutdown / signals)    │ │
//!                          │  └─────────────────────────────────────────────┘ │
//!                          └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "address-gateway")]
#[command(about = "Resilience gateway in front of an address validator", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    address_gateway::lifecycle::startup::run(args.config).await?;
    Ok(())
}
