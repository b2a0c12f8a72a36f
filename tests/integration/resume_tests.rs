//! Resuming a crawl from an earlier run's checkpoint

use crate::common::{base_url, mount_page, page_url, run_crawl, test_config};
use chrono::Utc;
use muni_catalog::storage::{JsonStore, LinkRecord, PageRecord, Storage};
use muni_catalog::{CrawlState, LinkType};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stored_page(url: &str, depth: u32, links_to: &[String]) -> PageRecord {
    PageRecord {
        url: url.to_string(),
        title: "Stored".to_string(),
        scraped_at: Utc::now(),
        depth,
        html: Some("<html></html>".to_string()),
        links: links_to
            .iter()
            .map(|target| LinkRecord {
                url: target.clone(),
                text: "next".to_string(),
                link_type: LinkType::Internal,
            })
            .collect(),
        content: None,
    }
}

#[tokio::test]
async fn test_resume_fetches_only_unvisited() {
    let server = MockServer::start().await;
    let a = base_url(&server).to_string();
    let b = page_url(&server, "/b");
    let c = page_url(&server, "/c");

    mount_page(&server, "/", "A", r#"<a href="/b">B</a>"#, 0).await;
    mount_page(&server, "/b", "B", r#"<a href="/c">C</a>"#, 0).await;
    mount_page(&server, "/c", "C", r#"<a href="/">A</a>"#, 1).await;

    let dir = TempDir::new().unwrap();
    {
        let mut store = JsonStore::open(dir.path()).unwrap();
        let mut state = CrawlState::new(&a);
        state.mark_visited(&a);
        state.mark_visited(&b);
        state.total_links_found = 2;
        store.save_state(&state).unwrap();
        store.write_page(&stored_page(&a, 0, &[b.clone()])).unwrap();
        store.write_page(&stored_page(&b, 1, &[c.clone()])).unwrap();
    }

    let (store, session, summary) = run_crawl(test_config(), &server, dir.path()).await;

    assert_eq!(summary.pages_crawled, 1);
    assert_eq!(summary.total_links_found, 3);
    assert_eq!(session.state.visited_count(), 3);
    assert!(session.state.is_visited(&c));

    let state = store.load_state().unwrap().unwrap();
    assert_eq!(state.visited_count(), 3);
    assert_eq!(store.load_page(&c).unwrap().unwrap().depth, 2);
}

#[tokio::test]
async fn test_resume_without_stored_pages_does_nothing() {
    let server = MockServer::start().await;
    let a = base_url(&server).to_string();
    mount_page(&server, "/", "A", "", 0).await;

    let dir = TempDir::new().unwrap();
    {
        let mut store = JsonStore::open(dir.path()).unwrap();
        let mut state = CrawlState::new(&a);
        state.mark_visited(&a);
        store.save_state(&state).unwrap();
    }

    let (_, _, summary) = run_crawl(test_config(), &server, dir.path()).await;
    assert_eq!(summary.pages_crawled, 0);
}

#[tokio::test]
async fn test_second_run_extends_first() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Home",
        r#"<a href="/b">B</a><a href="/agenda.pdf">Agenda</a>"#,
        1,
    )
    .await;
    mount_page(&server, "/b", "B", "", 1).await;
    Mock::given(method("HEAD"))
        .and(path("/agenda.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();

    let mut shallow = test_config();
    shallow.crawler.max_depth = 0;
    let (_, first, first_summary) = run_crawl(shallow, &server, dir.path()).await;
    assert_eq!(first_summary.pages_crawled, 1);
    assert_eq!(first.pdfs.len(), 1);

    let (store, second, second_summary) = run_crawl(test_config(), &server, dir.path()).await;
    assert_eq!(second_summary.pages_crawled, 1);
    assert_eq!(second_summary.pdfs_found, 1);
    assert_eq!(second_summary.total_links_found, 2);

    let home = base_url(&server).to_string();
    let b = page_url(&server, "/b");
    assert_eq!(second.graph.links_from(&home), Some(&[b.clone()][..]));
    assert!(second.graph.links_from(&b).is_some());

    assert_eq!(store.load_pdf_catalog().unwrap().unwrap().pdfs.len(), 1);
    assert_eq!(store.load_pages().unwrap().len(), 2);
}
