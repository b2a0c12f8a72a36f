//! End-to-end crawl behavior against mock sites

use crate::common::{base_url, html_page, mount_page, page_url, run_crawl, run_crawl_with, test_config};
use muni_catalog::storage::Storage;
use muni_catalog::LinkType;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_example_site_end_to_end() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Village Home",
        r#"<a href="/b">Council</a>
           <a href="/doc.pdf">Budget 2024</a>
           <a href="https://other.org/">Partner</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/b", "Council", "<p>Meets Tuesdays</p>", 1).await;
    Mock::given(method("HEAD"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .insert_header("last-modified", "Tue, 09 Jan 2024 10:00:00 GMT"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.crawler.max_depth = 2;
    let (store, session, summary) = run_crawl(config, &server, dir.path()).await;

    let home = base_url(&server).to_string();
    let council = page_url(&server, "/b");
    let pdf = page_url(&server, "/doc.pdf");

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.pdfs_found, 1);
    assert_eq!(summary.total_links_found, 3);
    assert!(!summary.cancelled);

    let pages = store.load_pages().unwrap();
    let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, vec![home.as_str(), council.as_str()]);
    assert_eq!(pages[0].title, "Village Home");
    assert_eq!(pages[0].links_of(LinkType::External).count(), 1);

    let record = session.pdfs.get(&pdf).unwrap();
    assert_eq!(record.parent_page, home);
    assert_eq!(record.title, "Budget 2024");
    assert_eq!(record.last_modified, "Tue, 09 Jan 2024 10:00:00 GMT");

    assert_eq!(
        session.graph.links_from(&home),
        Some(&[council.clone()][..])
    );
    assert_eq!(session.graph.links_from(&council), Some(&[][..]));

    let on_disk = store.load_pdf_catalog().unwrap().unwrap();
    assert_eq!(on_disk.total_pdfs, 1);
    assert_eq!(store.load_site_graph().unwrap().unwrap(), session.graph);
}

#[tokio::test]
async fn test_cycle_fetched_once_each() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "A", r#"<a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/b", "B", r#"<a href="/">A</a><a href="/b">self</a>"#, 1).await;

    let dir = TempDir::new().unwrap();
    let (_, session, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(session.state.visited_count(), 2);
}

#[tokio::test]
async fn test_max_depth_respected() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Root", r#"<a href="/a">A</a>"#, 1).await;
    mount_page(&server, "/a", "A", r#"<a href="/a/deep">Deep</a>"#, 1).await;
    mount_page(&server, "/a/deep", "Deep", "", 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.crawler.max_depth = 1;
    let (_, session, summary) = run_crawl(config, &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 2);
    assert!(!session.state.is_visited(&page_url(&server, "/a/deep")));
}

#[tokio::test]
async fn test_links_followed_in_document_order() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/one">1</a><a href="/two">2</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/one", "One", r#"<a href="/one/child">c</a>"#, 1).await;
    mount_page(&server, "/one/child", "Child", "", 1).await;
    mount_page(&server, "/two", "Two", "", 1).await;

    let dir = TempDir::new().unwrap();
    run_crawl(test_config(), &server, dir.path()).await;

    let gets: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.to_string() == "GET" && r.url.path() != "/robots.txt")
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(gets, vec!["/", "/one", "/one/child", "/two"]);
}

#[tokio::test]
async fn test_robots_disallowed_never_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/private/records">Private</a><a href="/public">Public</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/private/records", "Private", "", 0).await;
    mount_page(&server, "/public", "Public", "", 1).await;

    let dir = TempDir::new().unwrap();
    let (_, session, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.robots_blocked, 1);
    assert!(!session.state.is_visited(&page_url(&server, "/private/records")));
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/", "Root", "", 1).await;

    let dir = TempDir::new().unwrap();
    let (_, _, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.robots_blocked, 0);
}

#[tokio::test]
async fn test_language_variants_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/es/about">Acerca</a>
           <a href="/news?lang=es">Noticias</a>
           <a href="/news?format=es">News feed</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/es/about", "Acerca", "", 0).await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("lang", "es"))
        .respond_with(html_page("Noticias", ""))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .and(query_param("format", "es"))
        .respond_with(html_page("News", ""))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (_, session, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.languages_skipped, 2);
    assert_eq!(session.state.skipped_language_count, 2);
    assert!(!session.state.is_visited(&page_url(&server, "/es/about")));
}

#[tokio::test]
async fn test_language_variants_crawled_when_disabled() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Root", r#"<a href="/es/about">Acerca</a>"#, 1).await;
    mount_page(&server, "/es/about", "Acerca", "", 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.languages.skip = false;
    let (_, _, summary) = run_crawl(config, &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.languages_skipped, 0);
}

#[tokio::test]
async fn test_pdf_deduplicated_first_parent_wins() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Root", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/a", "A", r#"<a href="/report.pdf">Annual Report</a>"#, 1).await;
    mount_page(&server, "/b", "B", r#"<a href="/report.pdf">Same report</a>"#, 1).await;
    Mock::given(method("HEAD"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (store, session, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pdfs_found, 1);
    let record = session.pdfs.get(&page_url(&server, "/report.pdf")).unwrap();
    assert_eq!(record.parent_page, page_url(&server, "/a"));
    assert_eq!(record.title, "Annual Report");

    let on_disk = store.load_pdf_catalog().unwrap().unwrap();
    assert_eq!(on_disk.pdfs.len(), 1);
    assert_eq!(on_disk.pdfs[0].parent_page, page_url(&server, "/a"));
}

#[tokio::test]
async fn test_non_html_and_failed_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Root",
        r#"<a href="/data.json">Data</a><a href="/missing">Gone</a><a href="/ok">Ok</a>"#,
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "Ok", r#"<a href="/data.json">Data again</a>"#, 1).await;

    let dir = TempDir::new().unwrap();
    let (store, session, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.non_html_skipped, 1);
    assert_eq!(summary.fetch_failures, 1);

    // Both stay visited but neither gets a page record
    for dead_end in ["/data.json", "/missing"] {
        let url = page_url(&server, dead_end);
        assert!(session.state.is_visited(&url));
        assert!(store.load_page(&url).unwrap().is_none());
    }
}

#[tokio::test]
async fn test_cancel_during_politeness_wait() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Root", "", 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.crawler.delay = 30.0;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let (store, session, summary) = run_crawl_with(config, &server, dir.path(), cancel).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(summary.cancelled);
    assert_eq!(summary.pages_crawled, 0);
    assert_eq!(session.state.visited_count(), 0);

    let state = store.load_state().unwrap().unwrap();
    assert!(!state.is_visited(&base_url(&server).to_string()));
}

#[tokio::test]
async fn test_slow_responses_keep_full_delay() {
    let server = MockServer::start().await;
    let slow = Duration::from_millis(600);
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Root", r#"<a href="/b">B</a>"#).set_delay(slow))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page("B", "").set_delay(slow))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config();
    config.crawler.delay = 0.5;

    let started = Instant::now();
    let (_, _, summary) = run_crawl(config, &server, dir.path()).await;

    // robots.txt, pause, "/", pause, "/b": the pauses never overlap a response
    assert_eq!(summary.pages_crawled, 2);
    assert!(started.elapsed() >= Duration::from_millis(2200));
}

#[tokio::test]
async fn test_failed_checkpoint_does_not_stop_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Root", r#"<a href="/a">A</a><a href="/b">B</a>"#, 1).await;
    mount_page(&server, "/a", "A", "", 1).await;
    mount_page(&server, "/b", "B", "", 1).await;

    let dir = TempDir::new().unwrap();
    // A directory where the checkpoint file belongs makes every save fail
    std::fs::create_dir_all(dir.path().join(".crawl_state.json")).unwrap();

    let mut config = test_config();
    config.crawler.checkpoint_interval = 1;
    let (store, session, summary) = run_crawl(config, &server, dir.path()).await;

    assert!(!summary.cancelled);
    assert_eq!(summary.pages_crawled, 3);
    assert_eq!(session.state.visited_count(), 3);
    assert!(store.load_state().is_err());
    assert!(store.load_page(&page_url(&server, "/b")).unwrap().is_some());
}
