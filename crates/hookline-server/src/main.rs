//! hookserve - HTTP wrapper around the hook detection pipeline
//!
//! Accepts a media reference, runs fetch -> decode -> detect, and answers
//! with the detected hooks. An empty result is a distinct outcome from a
//! processing failure.

mod routes;

use anyhow::{Context, Result};
use clap::Parser;
use hookline_core::HookConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "hookserve")]
#[command(about = "Serve hook detection over HTTP", long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 5740)]
    port: u16,

    /// TOML configuration file (defaults apply otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    let config = match &args.config {
        Some(path) => HookConfig::from_toml_file(path)?,
        None => HookConfig::default(),
    };
    config.validate()?;

    let ctx = routes::AppContext {
        config: Arc::new(config),
    };
    let app = routes::router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {}", addr))?;
    log::info!("hookserve listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
