use std::time::Duration;

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitebot_crawler::{crawl, CrawlConfig};

fn config(server: &MockServer, max_pages: usize) -> CrawlConfig {
    let origin = Url::parse(&server.uri()).unwrap();
    CrawlConfig {
        seeds: vec![origin.clone()],
        origin,
        max_pages,
        concurrency: 2,
        timeout: Duration::from_secs(5),
        user_agent: "sitebot/0.1 (+mailto:test@example.edu)".into(),
    }
}

async fn mount_html(server: &MockServer, at: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn crawls_linked_pages_and_stays_on_origin() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body><main>
            <h1>Welcome</h1>
            <p>Start here.</p>
            <a href="/about">About</a>
            <a href="/about#team">About team</a>
            <a href="https://elsewhere.example.com/offsite">Offsite</a>
        </main></body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/about",
        r#"<html><head><title>About</title></head><body><main>
            <h1>About us</h1><p>Contact the office for details.</p>
        </main></body></html>"#,
    )
    .await;

    let docs = crawl(&config(&server, 10)).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d.url.starts_with(&server.uri())));
    assert!(docs.iter().any(|d| d.title == "About"));
    // Fragment variant deduplicated with /about; offsite link never fetched.
    assert!(!docs.iter().any(|d| d.url.contains("elsewhere")));
    // Dense ids in completion order.
    let mut ids: Vec<u32> = docs.iter().map(|d| d.id).collect();
    ids.sort();
    assert_eq!(ids, vec![0, 1]);
}

#[tokio::test]
async fn skips_non_html_content() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body><main>
            <a href="/handbook.pdf">Handbook</a>
            <a href="/hours">Hours</a>
        </main></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/handbook.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 binary".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/hours",
        "<html><head><title>Hours</title></head><body><main><p>Open 9 to 5.</p></main></body></html>",
    )
    .await;

    let docs = crawl(&config(&server, 10)).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert!(!docs.iter().any(|d| d.url.ends_with(".pdf")));
    assert!(!docs.iter().any(|d| d.text.contains("%PDF")));
}

#[tokio::test]
async fn honors_robots_disallow() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "User-agent: *\nDisallow: /private/\n".to_string(),
            "text/plain",
        ))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body><main>
            <a href="/private/internal">Internal</a>
            <a href="/public">Public</a>
        </main></body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/private/internal",
        "<html><head><title>Internal</title></head><body><p>secret</p></body></html>",
    )
    .await;
    mount_html(
        &server,
        "/public",
        "<html><head><title>Public</title></head><body><p>open to all</p></body></html>",
    )
    .await;

    let docs = crawl(&config(&server, 10)).await.unwrap();

    assert!(docs.iter().any(|d| d.url.ends_with("/public")));
    assert!(!docs.iter().any(|d| d.url.contains("/private/")));
}

#[tokio::test]
async fn bounds_page_count() {
    let server = MockServer::start().await;
    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{i}">page {i}</a>"#))
        .collect();
    mount_html(
        &server,
        "/",
        &format!("<html><head><title>Hub</title></head><body><main>{links}</main></body></html>"),
    )
    .await;
    for i in 0..10 {
        mount_html(
            &server,
            &format!("/p{i}"),
            &format!("<html><head><title>Page {i}</title></head><body><p>content {i}</p></body></html>"),
        )
        .await;
    }

    let docs = crawl(&config(&server, 3)).await.unwrap();
    assert!(docs.len() <= 3);
}

#[tokio::test]
async fn isolates_per_page_failures() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body><main>
            <a href="/broken">Broken</a>
            <a href="/ok">Ok</a>
        </main></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/ok",
        "<html><head><title>Ok</title></head><body><p>fine</p></body></html>",
    )
    .await;

    let docs = crawl(&config(&server, 10)).await.unwrap();

    assert_eq!(docs.len(), 2);
    assert!(docs.iter().any(|d| d.url.ends_with("/ok")));
    assert!(!docs.iter().any(|d| d.url.ends_with("/broken")));
}
