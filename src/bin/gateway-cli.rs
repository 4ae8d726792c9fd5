use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the address gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an address through the gateway
    Validate { address: String },
    /// List feature flags
    Flags,
    /// Switch a feature flag on or off
    Set { feature: String, state: Toggle },
    /// Check gateway status
    Status,
    /// Show limiter and cache counters
    Stats,
    /// Drop every cached response
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Validate { address } => {
            client
                .post(format!("{}/validate", cli.url))
                .json(&json!({ "address": address }))
                .send()
                .await?
        }
        Commands::Flags => client.get(format!("{}/toggle-feature", cli.url)).send().await?,
        Commands::Set { feature, state } => {
            client
                .post(format!("{}/toggle-feature", cli.url))
                .json(&json!({ "feature": feature, "enabled": matches!(state, Toggle::On) }))
                .send()
                .await?
        }
        Commands::Status => client.get(format!("{}/admin/status", cli.url)).send().await?,
        Commands::Stats => client.get(format!("{}/admin/stats", cli.url)).send().await?,
        Commands::ClearCache => client.delete(format!("{}/admin/cache", cli.url)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    // Rejections still carry a JSON outcome; print it either way.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    if !status.is_success() {
        eprintln!("Gateway returned status {}", status);
    }
    Ok(())
}
