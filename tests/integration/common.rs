//! Shared fixtures for the integration tests

use muni_catalog::config::Config;
use muni_catalog::crawler::{crawl, CrawlSession, CrawlSummary};
use muni_catalog::storage::JsonStore;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Default configuration with the politeness delay turned off
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.delay = 0.0;
    config
}

/// An HTML response with the given title and body markup
pub fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ),
        "text/html; charset=utf-8",
    )
}

/// Mounts a GET handler for `page_path` expected to be hit `times` times
pub async fn mount_page(server: &MockServer, page_path: &str, title: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(title, body))
        .expect(times)
        .mount(server)
        .await;
}

/// The server's root URL
pub fn base_url(server: &MockServer) -> Url {
    Url::parse(&server.uri()).unwrap()
}

/// `page_path` on the server, as a string key
pub fn page_url(server: &MockServer, page_path: &str) -> String {
    base_url(server).join(page_path).unwrap().to_string()
}

/// Runs a full crawl into `dir`
pub async fn run_crawl(
    config: Config,
    server: &MockServer,
    dir: &Path,
) -> (JsonStore, CrawlSession, CrawlSummary) {
    run_crawl_with(config, server, dir, CancellationToken::new()).await
}

/// Runs a full crawl into `dir`, stoppable through `cancel`
pub async fn run_crawl_with(
    config: Config,
    server: &MockServer,
    dir: &Path,
    cancel: CancellationToken,
) -> (JsonStore, CrawlSession, CrawlSummary) {
    let store = JsonStore::open(dir).unwrap();
    crawl(config, base_url(server), store, cancel).await.unwrap()
}
