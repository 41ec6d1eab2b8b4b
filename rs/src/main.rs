//! Standalone Reach MCP Server
//!
//! Serves the engagement analytics over stdio. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use reach::constants::{
    DEFAULT_STORE_TIMEOUT_SECS, MIN_CLASSIFIABLE_POPULATION, UNDERPERFORMER_MIN_POSTS,
};
use reach::{Analyzer, AnalyzerConfig, EngagementStore, FileStore, ReachServer};
use rmcp::{transport::stdio, ServiceExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reach-server")]
#[command(about = "Reach engagement analytics - MCP Server")]
struct Args {
    /// Directory holding authors.json, posts.json and engagements.json
    #[arg(long, default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Smallest population opportunity thresholds are computed for
    #[arg(long, default_value_t = MIN_CLASSIFIABLE_POPULATION)]
    min_population: usize,

    /// Post floor for the underperformer report
    #[arg(long, default_value_t = UNDERPERFORMER_MIN_POSTS)]
    underperformer_min_posts: u32,

    /// Upper bound on each store query, in seconds
    #[arg(long, default_value_t = DEFAULT_STORE_TIMEOUT_SECS)]
    store_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    home::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".reach")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the MCP protocol
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("REACH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("reach={}", log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting Reach MCP Server");
    tracing::info!("Data directory: {}", args.data_dir.display());
    tracing::info!("Reach version: {}", reach::VERSION);

    let store = FileStore::open(&args.data_dir)
        .await
        .with_context(|| format!("Failed to open store at {}", args.data_dir.display()))?;
    let store: Arc<dyn EngagementStore> = Arc::new(store);

    let config = AnalyzerConfig {
        min_population: args.min_population,
        underperformer_min_posts: args.underperformer_min_posts,
        store_timeout: Duration::from_secs(args.store_timeout_secs),
    };
    tracing::debug!("Analyzer config: {:?}", config);

    let server = ReachServer::new(Arc::new(Analyzer::with_config(store, config)));
    let service = server
        .serve(stdio())
        .await
        .context("Failed to start MCP service")?;

    tracing::info!("Reach MCP Server ready");
    service.waiting().await?;
    Ok(())
}
