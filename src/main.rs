// src/main.rs
mod api;
mod cli;
mod config;
mod error;
mod geometry;
mod model;
mod optimizer;
mod render;
mod report;
mod types;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();

    // Logs go to stderr, stdout carries the report.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}=info", env!("CARGO_PKG_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    let cli = Cli::parse();
    let app_config = AppConfig::from_env();

    if let Err(err) = cli::run(cli, app_config).await {
        println!("An error occurred: {}", err);
        std::process::exit(1);
    }
}
