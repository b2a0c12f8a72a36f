//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Loading resume state and earlier catalog artifacts
//! - Walking the frontier as an explicit depth-first work stack
//! - Coordinating robots checks, throttling, fetching and parsing
//! - Persisting pages, PDFs, the site graph and checkpoints
//! - Honoring external cancellation

use crate::config::Config;
use crate::crawler::parser::parse_html;
use crate::crawler::{build_http_client, fetch_page, probe_pdf, FetchResult, ProbeResult, Throttle};
use crate::robots::RobotsGate;
use crate::state::{CrawlState, PageOutcome};
use crate::storage::{PageRecord, PdfCatalog, PdfRecord, SiteGraph, Storage};
use crate::url::{extract_domain, normalize_url, strip_www, LanguageFilter, LinkType};
use crate::CatalogError;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Totals reported at the end of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Pages fetched, parsed and stored in this run
    pub pages_crawled: usize,
    /// Links extracted, including earlier runs when resuming
    pub total_links_found: u64,
    /// Entries in the PDF catalog
    pub pdfs_found: usize,
    /// Language-variant URLs skipped, including earlier runs
    pub languages_skipped: u64,
    pub robots_blocked: u64,
    pub fetch_failures: u64,
    pub non_html_skipped: u64,
    /// PDF probes that got no answer
    pub pdf_probe_failures: u64,
    /// True if the crawl stopped on a cancellation signal
    pub cancelled: bool,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages crawled: {}", self.pages_crawled)?;
        writeln!(f, "Total links found: {}", self.total_links_found)?;
        write!(f, "PDFs found: {}", self.pdfs_found)?;
        if self.languages_skipped > 0 {
            write!(f, "\nLanguage pages skipped: {}", self.languages_skipped)?;
        }
        if self.cancelled {
            write!(f, "\nCrawl was cancelled before completion")?;
        }
        Ok(())
    }
}

/// Everything the engine mutates during a run
///
/// Owned exclusively by one [`Crawler`], so independent sessions can run
/// side by side.
#[derive(Debug, Clone, Default)]
pub struct CrawlSession {
    /// Resumable progress: visited set and counters
    pub state: CrawlState,
    /// PDFs cataloged so far
    pub pdfs: PdfCatalog,
    /// Internal link edges of crawled pages
    pub graph: SiteGraph,
    /// URLs visited by an earlier run whose stored links have not been
    /// replayed yet in this one
    pub pending_replay: HashSet<String>,
    /// Pages crawled in this run
    pub pages_crawled: usize,
    pub robots_blocked: u64,
    pub fetch_failures: u64,
    pub non_html_skipped: u64,
    pub pdf_probe_failures: u64,
}

impl CrawlSession {
    /// Builds a summary of the session
    pub fn summary(&self, cancelled: bool) -> CrawlSummary {
        CrawlSummary {
            pages_crawled: self.pages_crawled,
            total_links_found: self.state.total_links_found,
            pdfs_found: self.pdfs.len(),
            languages_skipped: self.state.skipped_language_count,
            robots_blocked: self.robots_blocked,
            fetch_failures: self.fetch_failures,
            non_html_skipped: self.non_html_skipped,
            pdf_probe_failures: self.pdf_probe_failures,
            cancelled,
        }
    }
}

/// Main crawler structure
pub struct Crawler<S: Storage> {
    config: Config,
    base_url: Url,
    site_domain: String,
    client: Client,
    robots: RobotsGate,
    languages: LanguageFilter,
    throttle: Throttle,
    storage: S,
    session: CrawlSession,
    cancel: CancellationToken,
}

impl<S: Storage> Crawler<S> {
    /// Creates a new crawler instance
    ///
    /// Loads any previous checkpoint, PDF catalog and site graph from
    /// `storage`, builds the HTTP client and fetches the site's robots.txt.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `base_url` - The start URL; its host defines the site
    /// * `storage` - Where the catalog is written
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CatalogError)` - The base URL has no host, or the client could not be built
    pub async fn new(config: Config, base_url: Url, storage: S) -> Result<Self, CatalogError> {
        Self::with_cancellation(config, base_url, storage, CancellationToken::new()).await
    }

    /// Like [`Crawler::new`], stopping early once `cancel` fires
    pub async fn with_cancellation(
        config: Config,
        base_url: Url,
        storage: S,
        cancel: CancellationToken,
    ) -> Result<Self, CatalogError> {
        let base_url = normalize_url(base_url.as_str(), &base_url)?;
        let site_domain =
            extract_domain(&base_url).ok_or_else(|| CatalogError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL has no host".to_string(),
            })?;

        let client = build_http_client(
            &config.user_agent.user_agent,
            Duration::from_secs(config.crawler.page_timeout),
        )?;

        let session = load_session(&storage, &base_url);

        let mut throttle = Throttle::new(config.crawler.delay);
        let agent = config.user_agent.product_token();
        let robots = if throttle.wait(&cancel).await {
            let robots = RobotsGate::fetch(&client, &base_url, agent).await;
            throttle.finish();
            robots
        } else {
            tracing::debug!("Cancelled before robots.txt was fetched");
            RobotsGate::allow_all(agent)
        };
        if let Some(crawl_delay) = robots.crawl_delay() {
            throttle.apply_crawl_delay(crawl_delay);
        }

        let languages = LanguageFilter::from_config(&config.languages);

        Ok(Self {
            config,
            base_url,
            site_domain,
            client,
            robots,
            languages,
            throttle,
            storage,
            session,
            cancel,
        })
    }

    /// Token that stops this crawler when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The normalized start URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session accumulated so far
    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    /// The storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Splits the crawler into its storage and session
    pub fn into_parts(self) -> (S, CrawlSession) {
        (self.storage, self.session)
    }

    /// Runs the crawl from the base URL until the frontier is exhausted
    ///
    /// Per-URL failures are logged and never abort the run. A final
    /// checkpoint is written whether the crawl completes or is cancelled.
    pub async fn run(&mut self) -> CrawlSummary {
        tracing::info!("Starting crawl of {}", self.base_url);
        tracing::info!(
            "Domain: {} (normalized: {})",
            self.site_domain,
            strip_www(&self.site_domain)
        );
        tracing::info!(
            "Max depth: {}, Delay: {:.2}s",
            self.config.crawler.max_depth,
            self.throttle.interval().as_secs_f64()
        );
        if self.languages.is_enabled() {
            tracing::info!("Language filtering: Enabled (skipping non-English versions)");
        }

        // Children are pushed in reverse so they pop in document order
        let mut stack: Vec<(Url, u32)> = vec![(self.base_url.clone(), 0)];
        let mut cancelled = false;

        while let Some((url, depth)) = stack.pop() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let (outcome, children) = self.crawl_page(&url, depth).await;
            tracing::trace!("{} -> {}", url, outcome);

            match outcome {
                PageOutcome::Interrupted => {
                    cancelled = true;
                    break;
                }
                outcome if outcome.spawns_children() => {
                    stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                }
                _ => {}
            }
        }

        self.checkpoint();

        let summary = self.session.summary(cancelled);
        if cancelled {
            tracing::warn!("Crawl cancelled; progress checkpointed");
        } else {
            tracing::info!("Crawl complete!");
        }
        tracing::info!(
            "Pages crawled: {}, links found: {}, PDFs found: {}, language pages skipped: {}",
            summary.pages_crawled,
            summary.total_links_found,
            summary.pdfs_found,
            summary.languages_skipped
        );

        summary
    }

    /// Processes a single URL
    ///
    /// Returns the outcome and, for crawled pages, the internal links to
    /// visit next in document order.
    pub async fn crawl_page(&mut self, url: &Url, depth: u32) -> (PageOutcome, Vec<Url>) {
        let key = url.as_str();

        if depth > self.config.crawler.max_depth {
            tracing::debug!("Depth {} exceeds maximum for {}", depth, url);
            return (PageOutcome::DepthExceeded, Vec::new());
        }

        if self.session.state.is_visited(key) {
            if self.session.pending_replay.remove(key) {
                return self.replay_page(key);
            }
            return (PageOutcome::AlreadyVisited, Vec::new());
        }

        if self.languages.is_language_variant(url) {
            self.session.state.skipped_language_count += 1;
            let count = self.session.state.skipped_language_count;
            let interval = self.config.crawler.language_report_interval;
            if interval <= 1 || count % interval == 1 {
                tracing::info!("Skipping language URL: {} ({} so far)", url, count);
            } else {
                tracing::debug!("Skipping language URL: {}", url);
            }
            return (PageOutcome::LanguageSkipped, Vec::new());
        }

        if !self.robots.can_fetch(url) {
            tracing::info!("Skipping {} (robots.txt disallows)", url);
            self.session.robots_blocked += 1;
            return (PageOutcome::RobotsBlocked, Vec::new());
        }

        if !self.throttle.wait(&self.cancel).await {
            return (PageOutcome::Interrupted, Vec::new());
        }

        self.session.state.mark_visited(key);
        tracing::info!(
            "[{}] Crawling (depth {}): {}",
            self.session.pages_crawled + 1,
            depth,
            url
        );

        let fetched = fetch_page(&self.client, url).await;
        self.throttle.finish();

        let (final_url, body) = match fetched {
            FetchResult::Success {
                final_url, body, ..
            } => (final_url, body),
            FetchResult::NonHtml { content_type } => {
                tracing::info!("Skipping non-HTML content: {} ({})", url, content_type);
                self.session.non_html_skipped += 1;
                return (PageOutcome::NonHtmlSkipped, Vec::new());
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Error fetching {}: HTTP {}", url, status_code);
                self.session.fetch_failures += 1;
                return (PageOutcome::FetchFailed, Vec::new());
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Error fetching {}: {}", url, error);
                self.session.fetch_failures += 1;
                return (PageOutcome::FetchFailed, Vec::new());
            }
        };

        let parsed = parse_html(&body, &final_url, &self.site_domain);
        self.session.state.total_links_found += parsed.links.len() as u64;
        self.session.pages_crawled += 1;

        let (internal, pdfs, external) = parsed.link_counts();
        tracing::info!(
            "  Found {} links: {} internal, {} PDFs, {} external",
            parsed.links.len(),
            internal,
            pdfs,
            external
        );
        tracing::info!(
            "  [Total so far: {} pages crawled, {} links found]",
            self.session.pages_crawled,
            self.session.state.total_links_found
        );

        let page = PageRecord {
            url: key.to_string(),
            title: parsed.title,
            scraped_at: Utc::now(),
            depth,
            html: Some(body),
            links: parsed.links,
            content: None,
        };

        if let Err(e) = self.storage.write_page(&page) {
            tracing::warn!("Could not write page {}: {}", key, e);
        }

        self.session.graph.record(
            key,
            page.links_of(LinkType::Internal).map(|link| link.url.clone()),
        );

        let interval = self.config.crawler.checkpoint_interval.max(1) as usize;
        if self.session.pages_crawled % interval == 0 {
            self.checkpoint();
        }

        for link in page.links_of(LinkType::Pdf) {
            self.catalog_pdf(&link.url, &link.text, key).await;
        }

        (PageOutcome::Crawled, self.children_of(&page))
    }

    /// Re-traverses a page crawled by an earlier run from its stored record
    ///
    /// No request is sent. Pages without a stored record (non-HTML or failed
    /// fetches) are dead ends, as they were originally.
    fn replay_page(&mut self, key: &str) -> (PageOutcome, Vec<Url>) {
        match self.storage.load_page(key) {
            Ok(Some(page)) => {
                tracing::debug!("Replaying links of {} from an earlier run", key);
                (PageOutcome::Replayed, self.children_of(&page))
            }
            Ok(None) => (PageOutcome::AlreadyVisited, Vec::new()),
            Err(e) => {
                tracing::warn!("Could not load stored page {}: {}", key, e);
                (PageOutcome::AlreadyVisited, Vec::new())
            }
        }
    }

    /// Internal links of `page` still worth pushing, in document order
    fn children_of(&self, page: &PageRecord) -> Vec<Url> {
        page.links_of(LinkType::Internal)
            .filter(|link| {
                !self.session.state.is_visited(&link.url)
                    || self.session.pending_replay.contains(&link.url)
            })
            .filter_map(|link| Url::parse(&link.url).ok())
            .collect()
    }

    /// Catalogs a PDF without downloading its content
    ///
    /// A URL already in the catalog is a no-op. A failed probe is logged
    /// and not remembered, so a later link to the same PDF probes again.
    pub async fn catalog_pdf(&mut self, pdf_url: &str, link_text: &str, parent_page: &str) {
        if self.session.pdfs.contains(pdf_url) {
            return;
        }

        let url = match Url::parse(pdf_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Error cataloging PDF {}: {}", pdf_url, e);
                return;
            }
        };

        if !self.throttle.wait(&self.cancel).await {
            return;
        }

        let timeout = Duration::from_secs(self.config.crawler.probe_timeout);
        let probed = probe_pdf(&self.client, &url, timeout).await;
        self.throttle.finish();

        match probed {
            ProbeResult::Found {
                content_length,
                last_modified,
            } => {
                let record =
                    PdfRecord::new(pdf_url, link_text, content_length, last_modified, parent_page);
                tracing::info!(
                    "  [PDF #{}] {} ({} MB)",
                    self.session.pdfs.len() + 1,
                    record.title,
                    record.file_size_mb
                );
                self.session.pdfs.insert(record);

                if let Err(e) = self.storage.write_pdf_catalog(&self.session.pdfs) {
                    tracing::warn!("Could not write PDF catalog: {}", e);
                }
            }
            ProbeResult::Failed { error } => {
                tracing::warn!("  Error cataloging PDF {}: {}", pdf_url, error);
                self.session.pdf_probe_failures += 1;
            }
        }
    }

    /// Writes the resume checkpoint and the site graph
    ///
    /// Failures are logged; the crawl continues either way.
    pub fn checkpoint(&mut self) {
        self.session.state.touch();

        if let Err(e) = self.storage.save_state(&self.session.state) {
            tracing::warn!("Could not save state: {}", e);
        }
        if let Err(e) = self.storage.write_site_graph(&self.session.graph) {
            tracing::warn!("Could not write site graph: {}", e);
        }

        tracing::debug!(
            "Checkpoint saved: {} visited URLs",
            self.session.state.visited_count()
        );
    }
}

/// Restores the session from a previous run's artifacts, if any
fn load_session<S: Storage>(storage: &S, base_url: &Url) -> CrawlSession {
    let mut session = CrawlSession {
        state: CrawlState::new(base_url.as_str()),
        ..CrawlSession::default()
    };

    match storage.load_state() {
        Ok(Some(state)) => {
            tracing::info!(
                "Resuming: Found {} previously crawled URLs",
                state.visited_count()
            );
            session.pending_replay = state.visited_urls.iter().cloned().collect();
            session.state = CrawlState {
                base_url: base_url.to_string(),
                ..state
            };
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not load previous state: {}", e),
    }

    match storage.load_pdf_catalog() {
        Ok(Some(catalog)) => {
            session.pdfs = PdfCatalog::from_records(catalog.pdfs);
            if !session.pdfs.is_empty() {
                tracing::info!("Loaded {} previously cataloged PDFs", session.pdfs.len());
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not load previous PDF catalog: {}", e),
    }

    match storage.load_site_graph() {
        Ok(Some(graph)) => session.graph = graph,
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not load previous site graph: {}", e),
    }

    session
}
