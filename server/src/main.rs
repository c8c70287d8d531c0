use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use sitebot_crawler::read_seeds;
use sitebot_server::{build_app, ServiceConfig};

#[derive(Parser)]
#[command(name = "sitebot-server")]
#[command(about = "Answer questions about a single site's content")]
struct Args {
    /// Origin the crawler is restricted to
    #[arg(long)]
    origin: String,
    /// Path to a file with seed URLs (one per line)
    #[arg(long)]
    seeds: String,
    /// Snapshot path (loaded at startup, rewritten by ingest)
    #[arg(long, default_value = "./data/documents.json")]
    snapshot: String,
    /// Maximum pages per crawl
    #[arg(long, default_value_t = 200)]
    max_pages: usize,
    /// Concurrent fetches during ingest
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    /// Fetch timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string, with contact info
    #[arg(long, default_value = "sitebot/0.1 (+mailto:webmaster@example.edu)")]
    user_agent: String,
    /// Phone number offered when no answer is found
    #[arg(long, default_value = "")]
    contact_phone: String,
    /// Email offered when no answer is found
    #[arg(long, default_value = "")]
    contact_email: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let config = ServiceConfig {
        origin: Url::parse(&args.origin)?,
        seeds: read_seeds(Path::new(&args.seeds))?,
        max_pages: args.max_pages,
        concurrency: args.concurrency,
        timeout: Duration::from_secs(args.timeout_secs),
        user_agent: args.user_agent,
        snapshot_path: PathBuf::from(&args.snapshot),
        contact_phone: args.contact_phone,
        contact_email: args.contact_email,
    };
    let app: Router = build_app(config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
