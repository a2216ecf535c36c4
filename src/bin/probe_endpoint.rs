use anyhow::Context;
use clap::Parser;
use lora_router::config::LoggingConfig;
use lora_router::utils::logger;
use lora_router::utils::validation::Validate;
use lora_router::{HttpTransport, RouterConfig};

/// Sends a fixed smoke-test prompt to the endpoint, without any adapter.
#[derive(Parser)]
#[command(name = "probe_endpoint")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Inference endpoint URL
    #[arg(long, env = "ROUTER_ENDPOINT_URL")]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(false, &LoggingConfig::default())?;

    let mut config = match &args.config {
        Some(path) => RouterConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => {
            let endpoint = args
                .endpoint
                .clone()
                .context("either --config or --endpoint is required")?;
            RouterConfig::for_endpoint(endpoint)
        }
    };
    if let (Some(_), Some(endpoint)) = (&args.config, &args.endpoint) {
        config.endpoint.url = endpoint.clone();
    }
    config.validate()?;

    let transport = HttpTransport::from_config(&config.endpoint)?;
    tracing::info!("📡 Probing {}", config.endpoint.url);

    let response = transport
        .probe()
        .await
        .with_context(|| format!("error testing endpoint {}", config.endpoint.url))?;

    tracing::info!("✅ Model response received");
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
