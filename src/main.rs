//! Laptop Price Predictor - Main Entry Point
//!
//! Serves price predictions over HTTP, or runs them offline from the CLI.

use clap::Parser;
use price_predictor::cli::{cmd_info, cmd_predict, cmd_serve, Cli, Commands, ServeArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_predictor=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => {
            cmd_serve(args).await?;
        }
        Some(Commands::Predict { data, output, artifacts }) => {
            cmd_predict(&data, output.as_deref(), &artifacts.resolve())?;
        }
        Some(Commands::Info { artifacts }) => {
            cmd_info(&artifacts.resolve())?;
        }
        None => {
            cmd_serve(ServeArgs::default()).await?;
        }
    }

    Ok(())
}
