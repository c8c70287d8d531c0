pub mod robots;

use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client};
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use url::Url;

use sitebot_core::extract::Page;
use sitebot_core::{DocId, Document};

/// Window for the fetch-start rate limit: at most `concurrency` fetches
/// may begin per window.
const RATE_WINDOW: Duration = Duration::from_secs(1);

const MAX_REDIRECTS: usize = 5;
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// scheme+host+port the crawl is restricted to.
    pub origin: Url,
    pub seeds: Vec<Url>,
    pub max_pages: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    /// Identifies the crawler to the origin; should carry contact info.
    pub user_agent: String,
}

struct FetchedPage {
    url: String,
    title: String,
    section: String,
    text: String,
    links: Vec<Url>,
}

/// Crawl the configured origin from the seed list and return the
/// accumulated document set (at most `max_pages` documents, same-origin
/// HTML pages only).
pub async fn crawl(config: &CrawlConfig) -> Result<Vec<Document>> {
    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(config.timeout)
        .build()
        .context("building HTTP client")?;

    let robots = robots::fetch(&client, &config.origin, &config.user_agent).await;

    // The coordinator owns the frontier and visited set; workers only
    // fetch, so concurrent discovery of the same link cannot double-add.
    let mut frontier: VecDeque<Url> = VecDeque::new();
    let mut visited: HashSet<String> = HashSet::new();
    for seed in &config.seeds {
        let Some(url) = normalize(seed) else {
            continue;
        };
        if !same_origin(&url, &config.origin) {
            debug!(%url, "seed outside origin, skipping");
            continue;
        }
        if visited.insert(url.to_string()) {
            frontier.push_back(url);
        }
    }
    if frontier.is_empty() {
        return Err(anyhow!("no usable in-origin seeds"));
    }

    info!(
        origin = %config.origin,
        seeds = frontier.len(),
        max_pages = config.max_pages,
        concurrency = config.concurrency,
        "starting crawl"
    );

    let mut pages: Vec<FetchedPage> = Vec::new();
    let mut failures = 0usize;
    let mut inflight: JoinSet<(Url, Result<Option<FetchedPage>>)> = JoinSet::new();
    let mut window_start = Instant::now();
    let mut started_in_window = 0usize;

    while !frontier.is_empty() || !inflight.is_empty() {
        while inflight.len() < config.concurrency && !frontier.is_empty() {
            if started_in_window >= config.concurrency {
                let elapsed = window_start.elapsed();
                if elapsed < RATE_WINDOW {
                    sleep(RATE_WINDOW - elapsed).await;
                }
                window_start = Instant::now();
                started_in_window = 0;
            }
            let Some(url) = frontier.pop_front() else {
                break;
            };
            if let Some(robots) = &robots {
                if !robots.allows(url.path()) {
                    debug!(%url, "disallowed by robots.txt");
                    continue;
                }
                if let Some(delay) = robots.crawl_delay() {
                    sleep(delay).await;
                }
            }
            started_in_window += 1;
            let client = client.clone();
            let origin = config.origin.clone();
            inflight.spawn(async move {
                let result = fetch_page(&client, &url, &origin).await;
                (url, result)
            });
        }

        let Some(joined) = inflight.join_next().await else {
            continue;
        };
        let (url, result) = joined.context("fetch task panicked")?;
        match result {
            Ok(Some(page)) => {
                for link in &page.links {
                    // First discovery wins; stop admitting once the
                    // visited set reaches the page ceiling.
                    if visited.len() >= config.max_pages {
                        break;
                    }
                    let Some(link) = normalize(link) else {
                        continue;
                    };
                    if !same_origin(&link, &config.origin) {
                        continue;
                    }
                    if visited.insert(link.to_string()) {
                        frontier.push_back(link);
                    }
                }
                if pages.len() < config.max_pages {
                    pages.push(page);
                }
            }
            Ok(None) => {}
            Err(e) => {
                failures += 1;
                warn!(%url, error = %e, "page skipped");
            }
        }
    }

    info!(
        pages = pages.len(),
        visited = visited.len(),
        failures,
        "crawl complete"
    );

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(i, p)| Document {
            id: i as DocId,
            url: p.url,
            title: p.title,
            section: p.section,
            text: p.text,
        })
        .collect())
}

/// Fetch one page. `Ok(None)` is a deliberate skip (non-HTML content,
/// redirect off origin); `Err` is a per-page failure the coordinator
/// logs and moves past.
async fn fetch_page(client: &Client, url: &Url, origin: &Url) -> Result<Option<FetchedPage>> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    if !resp.status().is_success() {
        return Err(anyhow!("HTTP {} for {url}", resp.status()));
    }
    // Redirects may have resolved to another origin.
    if !same_origin(resp.url(), origin) {
        debug!(%url, resolved = %resp.url(), "redirected off origin, skipping");
        return Ok(None);
    }
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    // Only HTML is ever extracted; PDFs and other binaries must never
    // reach the index.
    if !content_type.contains("text/html") {
        debug!(%url, content_type = %content_type, "non-HTML response skipped");
        return Ok(None);
    }
    let final_url = resp.url().clone();
    let body = resp
        .text()
        .await
        .with_context(|| format!("reading body of {url}"))?;
    if body.len() > MAX_BODY_BYTES {
        debug!(%url, bytes = body.len(), "oversized page skipped");
        return Ok(None);
    }

    let page = Page::parse(&body);
    let links = page
        .links()
        .iter()
        .filter_map(|href| final_url.join(href).ok())
        .collect();
    let page_url = normalize(&final_url).unwrap_or(final_url);
    Ok(Some(FetchedPage {
        url: page_url.to_string(),
        title: page.title(),
        section: page.headings(),
        text: page.main_text(),
        links,
    }))
}

/// Canonical form of a URL for dedup: fragment stripped, trailing slash
/// stripped (except the root path). Idempotent. Non-HTTP schemes are
/// rejected.
pub fn normalize(url: &Url) -> Option<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    let mut u = url.clone();
    u.set_fragment(None);
    let path = u.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        u.set_path(path.trim_end_matches('/'));
    }
    Some(u)
}

pub fn same_origin(url: &Url, origin: &Url) -> bool {
    url.origin() == origin.origin()
}

/// Read a seed file: one URL per line, blank lines and `#` comments
/// ignored, unparseable lines logged and dropped.
pub fn read_seeds(path: &Path) -> Result<Vec<Url>> {
    let f = File::open(path).with_context(|| format!("opening seed list {}", path.display()))?;
    let mut seeds = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        let s = line.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        match Url::parse(s) {
            Ok(u) => seeds.push(u),
            Err(e) => warn!(seed = s, error = %e, "ignoring unparseable seed"),
        }
    }
    Ok(seeds)
}
