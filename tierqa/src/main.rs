use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tierqa::{ApiServer, ApiServerConfig, AppConfig, Orchestrator};

#[derive(Parser)]
#[command(name = "tierqa")]
#[command(about = "Tiered question answering: cache, database, then language model")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start API server
    Serve {
        /// Host to bind to (defaults to API_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to API_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report the health of every tier
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tierqa=info,tierqa_store=info".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let orchestrator = Arc::new(Orchestrator::from_config(&config).await?);

    match cli.command {
        Commands::Serve { host, port } => {
            let server_config = ApiServerConfig {
                host: host.unwrap_or(config.api_host),
                port: port.unwrap_or(config.api_port),
            };
            ApiServer::new(server_config, orchestrator).start().await?;
        }

        Commands::Ask { question, json } => match orchestrator.ask(&question).await {
            Ok(response) if json => println!("{}", serde_json::to_string_pretty(&response)?),
            Ok(response) => {
                println!("[{}]", response.source);
                println!("{}", response.message);
            }
            Err(e) => bail!("{}: {}", e.class(), e.detail()),
        },

        Commands::Health => {
            let report = orchestrator.health().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.status.is_operational() {
                bail!("service is not operational");
            }
        }
    }

    Ok(())
}
