//! Writing the final catalog after a crawl

use crate::common::{mount_page, page_url, run_crawl, test_config};
use muni_catalog::output::{catalog_summary, CatalogWriter};
use muni_catalog::storage::layout::{REPORT_FILE, SITE_METADATA_FILE};
use muni_catalog::storage::Storage;
use tempfile::TempDir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_crawl_then_write_catalog() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        "Village of Example",
        r#"<nav><a href="/minutes">Minutes</a></nav>
           <main><h1>Welcome</h1><p>Village Hall is open weekdays.</p></main>"#,
        1,
    )
    .await;
    mount_page(
        &server,
        "/minutes",
        "Minutes",
        r#"<main><p>Board minutes are posted monthly.</p>
           <a href="/files/jan-minutes.pdf">January Board Minutes</a>
           <a href="/files/trail.pdf">Trail Map</a></main>"#,
        1,
    )
    .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (mut store, session, summary) = run_crawl(test_config(), &server, dir.path()).await;
    assert_eq!(summary.pages_crawled, 2);
    assert_eq!(summary.pdfs_found, 2);

    let metadata = CatalogWriter::new(&mut store, dir.path())
        .write(&session.state.base_url, 3, &session.pdfs, &session.graph)
        .unwrap();
    assert_eq!(metadata.total_pages, 2);
    assert_eq!(metadata.total_pdfs, 2);

    let home = store
        .load_page(&session.state.base_url)
        .unwrap()
        .unwrap();
    assert!(home.html.is_none());
    let content = home.content.unwrap();
    assert_eq!(content.content_text, "Village Hall is open weekdays.");
    assert_eq!(content.headings[0].text, "Welcome");

    let catalog = store.load_pdf_catalog().unwrap().unwrap();
    assert_eq!(catalog.by_category["meeting_minutes"].len(), 1);
    assert_eq!(
        catalog.by_category["other"][0].url,
        page_url(&server, "/files/trail.pdf")
    );

    let raw = std::fs::read_to_string(dir.path().join(SITE_METADATA_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["catalog_statistics"]["total_pages_cataloged"], 2);
    assert_eq!(json["max_depth"], 3);
    assert!(json["structure"]["pages"].is_string());

    let index = std::fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap();
    assert!(index.contains("## Meeting Minutes"));
    assert!(index.contains("January Board Minutes"));
    assert!(index.contains("### Depth 1 (1 pages)"));

    assert!(catalog_summary(&metadata).contains("PDFs: 2"));
}
