use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use sitebot_core::persist::save_documents;
use sitebot_crawler::{crawl, read_seeds, CrawlConfig};

#[derive(Parser, Debug)]
#[command(name = "sitebot-crawler")]
#[command(about = "Crawl a single origin into a document snapshot")]
struct Cli {
    /// Path to a file with seed URLs (one per line)
    #[arg(long)]
    seeds: String,
    /// Origin the crawl is restricted to, e.g. https://www.example.edu
    #[arg(long)]
    origin: String,
    /// Output snapshot path
    #[arg(long, default_value = "./data/documents.json")]
    output: String,
    /// Maximum number of pages to fetch
    #[arg(long, default_value_t = 200)]
    max_pages: usize,
    /// Concurrent fetches (also the per-second fetch-start cap)
    #[arg(long, default_value_t = 4)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string, with contact info
    #[arg(long, default_value = "sitebot/0.1 (+mailto:webmaster@example.edu)")]
    user_agent: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let origin = Url::parse(&args.origin)?;
    let seeds = read_seeds(Path::new(&args.seeds))?;
    let config = CrawlConfig {
        origin,
        seeds,
        max_pages: args.max_pages,
        concurrency: args.concurrency,
        timeout: Duration::from_secs(args.timeout_secs),
        user_agent: args.user_agent,
    };

    let documents = crawl(&config).await?;
    save_documents(Path::new(&args.output), &documents)?;
    tracing::info!(pages = documents.len(), output = %args.output, "snapshot written");
    Ok(())
}
