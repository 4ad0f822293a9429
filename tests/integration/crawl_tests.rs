//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitescope::config::{CacheConfig, Config, CrawlerConfig, SearchConfig, UserAgentConfig};
use sitescope::crawler::{extract_page, CrawlSession, Strategy};
use sitescope::state::FetchOutcome;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at the mock server
fn create_test_config(seed_url: &str, max_depth: u32, cache_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: seed_url.to_string(),
            max_depth,
            max_pages: None,
            request_timeout_secs: 5,
            strategy: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        search: SearchConfig::default(),
        cache: CacheConfig {
            directory: cache_dir.to_path_buf(),
        },
    }
}

/// Mounts an HTML page; `expected` pins how often it may be fetched
async fn mount_page(server: &MockServer, route: &str, html: String, expected: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"));
    let mock = match expected {
        Some(times) => mock.expect(times),
        None => mock,
    };
    mock.mount(server).await;
}

fn page(title: &str, body: &str, links: &[(&str, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(href, text)| format!(r#"<a href="{}">{}</a>"#, href, text))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><main><p>{}</p>{}</main></body></html>",
        title, body, anchors
    )
}

fn fetch_order(session: &CrawlSession) -> Vec<String> {
    session
        .pages()
        .iter()
        .map(|p| url::Url::parse(&p.url).unwrap().path().to_string())
        .collect()
}

#[tokio::test]
async fn test_scenario_two_in_scope_links_one_foreign() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        page(
            "Universitas",
            "Selamat datang",
            &[
                ("/a", "Akademik"),
                ("/b", "Berita Kampus"),
                ("https://other.example/c", "Mitra"),
            ],
        ),
        Some(1),
    )
    .await;
    mount_page(
        &server,
        "/a",
        page("Akademik", "Penerimaan mahasiswa baru", &[("/deep", "Lebih dalam")]),
        Some(1),
    )
    .await;
    // No <title>: the anchor text that led here becomes the title
    mount_page(
        &server,
        "/b",
        "<html><body><p>Kabar terbaru</p></body></html>".to_string(),
        Some(1),
    )
    .await;
    mount_page(&server, "/deep", page("Deep", "", &[]), Some(0)).await;

    let config = create_test_config(&format!("{}/", base), 1, cache.path());
    let mut session = CrawlSession::new(config).expect("Failed to create session");
    let report = session.crawl(Strategy::BreadthFirst).await;

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(session.pages().len(), 3);
    assert_eq!(session.visited().len(), session.pages().len());
    assert!(session.pages().iter().all(|p| !p.url.contains("other.example")));
    assert!(session.pages().iter().all(|p| p.depth <= 1));
    assert_eq!(session.max_depth_seen(), 1);

    let stats = session.stats();
    assert_eq!(stats.links_admitted, 2);
    assert_eq!(stats.links_extracted, 4);
    assert_eq!(stats.pages_per_depth.get(&0), Some(&1));
    assert_eq!(stats.pages_per_depth.get(&1), Some(&2));

    let b = session.pages().get(&format!("{}/b", base)).unwrap();
    assert_eq!(b.title, "Berita Kampus");
    assert_eq!(b.parent_url.as_deref(), Some(format!("{}/", base).as_str()));

    let hits = session.search("mahasiswa", 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Akademik");
    assert_eq!(hits[0].path_info.len(), 2);
    assert_eq!(hits[0].path_info[0].anchor_text, "Seed URL");
    assert_eq!(hits[0].path_info[1].anchor_text, "Akademik");

    let path = session.path_of(&format!("{}/a#top", base));
    assert_eq!(path.len(), 2);
    assert!(session.path_of(&format!("{}/deep", base)).is_empty());

    assert!(report.cache_saved);
    assert!(session.cache_location().exists());
}

#[tokio::test]
async fn test_bfs_records_shortest_path() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        page("Home", "", &[("/a", "A"), ("/target", "Langsung")]),
        Some(1),
    )
    .await;
    mount_page(&server, "/a", page("A", "", &[("/b", "B")]), Some(1)).await;
    mount_page(&server, "/b", page("B", "", &[("/target", "Memutar")]), Some(1)).await;
    mount_page(&server, "/target", page("Target", "Tujuan", &[]), Some(1)).await;

    let config = create_test_config(&format!("{}/", base), 3, cache.path());
    let mut session = CrawlSession::new(config).unwrap();
    session.crawl(Strategy::BreadthFirst).await;

    let target = session.pages().get(&format!("{}/target", base)).unwrap();
    assert_eq!(target.depth, 1);
    assert_eq!(target.path_info.last().unwrap().anchor_text, "Langsung");
    assert_eq!(fetch_order(&session), vec!["/", "/a", "/target", "/b"]);

    // Recorded depth never decreases along breadth-first discovery order
    let depths: Vec<u32> = session.pages().iter().map(|p| p.depth).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_traversal_order_by_strategy() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", page("Home", "", &[("/a", "A"), ("/b", "B")]), None).await;
    mount_page(&server, "/a", page("A", "", &[("/a1", "A1")]), None).await;
    mount_page(&server, "/b", page("B", "", &[]), None).await;
    mount_page(&server, "/a1", page("A1", "", &[]), None).await;

    let bfs_cache = TempDir::new().unwrap();
    let mut bfs = CrawlSession::new(create_test_config(&format!("{}/", base), 2, bfs_cache.path()))
        .unwrap();
    bfs.crawl(Strategy::BreadthFirst).await;
    assert_eq!(fetch_order(&bfs), vec!["/", "/a", "/b", "/a1"]);

    let dfs_cache = TempDir::new().unwrap();
    let mut dfs = CrawlSession::new(create_test_config(&format!("{}/", base), 2, dfs_cache.path()))
        .unwrap();
    dfs.crawl(Strategy::DepthFirst).await;
    assert_eq!(fetch_order(&dfs), vec!["/", "/a", "/a1", "/b"]);
    assert_eq!(dfs.strategy(), Some(Strategy::DepthFirst));
}

#[tokio::test]
async fn test_failed_fetches_are_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    // Bind then drop a listener so the port is very likely closed
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let unreachable = format!("http://127.0.0.1:{}/down", closed_port);

    mount_page(
        &server,
        "/",
        page(
            "Home",
            "Beranda",
            &[
                ("/missing", "Halaman hilang"),
                ("/files/panduan.pdf", "Panduan"),
                (unreachable.as_str(), "Server mati"),
                ("/old", "Lama"),
            ],
        ),
        Some(1),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/panduan.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/page.html"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/new/page.html",
        page("Halaman Baru", "Dipindahkan", &[("sibling.html", "Saudara")]),
        Some(1),
    )
    .await;
    mount_page(&server, "/new/sibling.html", page("Saudara", "", &[]), Some(1)).await;

    let config = create_test_config(&format!("{}/", base), 2, cache.path());
    let mut session = CrawlSession::new(config).unwrap();
    let report = session.crawl(Strategy::BreadthFirst).await;

    assert_eq!(report.pages_fetched, 6);

    let missing = session.pages().get(&format!("{}/missing", base)).unwrap();
    assert_eq!(missing.outcome, FetchOutcome::HttpError);
    assert_eq!(missing.status_code, Some(404));
    assert!(!missing.is_html);
    assert!(missing.body.is_empty());
    assert_eq!(missing.title, "Halaman hilang");

    let pdf = session.pages().get(&format!("{}/files/panduan.pdf", base)).unwrap();
    assert_eq!(pdf.outcome, FetchOutcome::NonHtml);
    assert_eq!(pdf.title, "panduan.pdf");
    assert!(pdf.links.is_empty());

    let down = session.pages().get(&unreachable).unwrap();
    assert_eq!(down.outcome, FetchOutcome::TransportError);
    assert_eq!(down.status_code, None);

    // Redirected page keeps its requested URL; its links resolve against the target
    let old = session.pages().get(&format!("{}/old", base)).unwrap();
    assert_eq!(old.title, "Halaman Baru");
    assert!(session.pages().get(&format!("{}/new/page.html", base)).is_none());
    let sibling = session
        .pages()
        .get(&format!("{}/new/sibling.html", base))
        .unwrap();
    assert_eq!(sibling.depth, 2);
    assert_eq!(sibling.parent_url.as_deref(), Some(format!("{}/old", base).as_str()));

    let stats = session.stats();
    assert_eq!(stats.http_errors, 1);
    assert_eq!(stats.non_html_pages, 1);
    assert_eq!(stats.transport_errors, 1);
    assert_eq!(session.visited().len(), session.pages().len());

    // Failed pages are still searchable by title
    assert_eq!(session.search("hilang", 10).len(), 1);
}

#[tokio::test]
async fn test_resume_from_cache_continues_page_bounded_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        page("Home", "", &[("/a", "A"), ("/b", "B"), ("/c", "C")]),
        Some(1),
    )
    .await;
    mount_page(&server, "/a", page("A", "alpha", &[]), Some(1)).await;
    mount_page(&server, "/b", page("B", "beta", &[]), Some(1)).await;
    mount_page(&server, "/c", page("C", "gamma", &[]), Some(1)).await;

    let mut config = create_test_config(&format!("{}/", base), 1, cache.path());
    config.crawler.max_pages = Some(2);

    let mut first = CrawlSession::new(config.clone()).unwrap();
    assert!(!first.load_cache());
    let report = first.crawl(Strategy::BreadthFirst).await;
    assert_eq!(report.pages_fetched, 2);
    assert!(report.page_bound_hit);
    assert!(report.cache_saved);
    assert_eq!(first.pages().len(), 2);

    let mut second = CrawlSession::new(config).unwrap();
    assert!(second.load_cache());
    assert!(second.stats().loaded_from_cache);
    assert_eq!(second.strategy(), Some(Strategy::BreadthFirst));
    assert_eq!(second.stats().links_admitted, 0);
    assert_eq!(second.search("alpha", 10).len(), 1);

    let report = second.crawl(Strategy::BreadthFirst).await;
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_reexpanded, 1);
    assert!(!report.page_bound_hit);
    assert!(report.cache_saved);

    assert_eq!(fetch_order(&second), vec!["/", "/a", "/b", "/c"]);
    assert_eq!(second.stats().links_admitted, 2);
    assert_eq!(second.stats().pages_per_depth.get(&1), Some(&3));
    assert_eq!(second.visited().len(), 4);
}

#[tokio::test]
async fn test_cache_only_walk_fetches_nothing() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    mount_page(&server, "/", page("Home", "", &[("/a", "A")]), Some(1)).await;
    mount_page(&server, "/a", page("A", "", &[]), Some(1)).await;

    let config = create_test_config(&format!("{}/", base), 1, cache.path());
    let mut first = CrawlSession::new(config.clone()).unwrap();
    first.crawl(Strategy::DepthFirst).await;

    let mut second = CrawlSession::new(config).unwrap();
    assert!(second.load_cache());
    let report = second.crawl(Strategy::DepthFirst).await;

    assert_eq!(report.pages_fetched, 0);
    assert_eq!(report.pages_reexpanded, 1);
    assert!(report.cache_saved);
    assert_eq!(second.pages().len(), 2);
    assert_eq!(second.stats().links_admitted, 0);
}

#[tokio::test]
async fn test_unreadable_cache_falls_back_to_fresh_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    mount_page(&server, "/", page("Home", "Beranda", &[]), Some(1)).await;

    let config = create_test_config(&format!("{}/", base), 1, cache.path());
    std::fs::write(config.cache_path(), "garbage ".repeat(200)).unwrap();

    let mut session = CrawlSession::new(config.clone()).unwrap();
    assert!(!session.load_cache());
    assert!(session.pages().is_empty());

    let report = session.crawl(Strategy::BreadthFirst).await;
    assert_eq!(report.pages_fetched, 1);
    assert!(report.cache_saved);

    let mut reloaded = CrawlSession::new(config).unwrap();
    assert!(reloaded.load_cache());
    assert_eq!(reloaded.pages().len(), 1);
    assert_eq!(reloaded.search("beranda", 10).len(), 1);
}

#[tokio::test]
async fn test_resume_adopts_shallower_path_found_by_bfs() {
    let server = MockServer::start().await;
    let base = server.uri();
    let cache = TempDir::new().unwrap();

    mount_page(&server, "/", page("Home", "", &[("/a", "A"), ("/c", "C")]), Some(1)).await;
    mount_page(&server, "/a", page("A", "", &[("/b", "B")]), Some(1)).await;
    mount_page(&server, "/b", page("B", "", &[("/t", "Lewat B")]), Some(1)).await;
    mount_page(&server, "/c", page("C", "", &[("/t", "Lewat C")]), Some(1)).await;
    mount_page(&server, "/t", page("T", "Target", &[("/u", "U")]), Some(1)).await;
    mount_page(&server, "/u", page("U", "Ujung", &[]), Some(1)).await;

    let config = create_test_config(&format!("{}/", base), 3, cache.path());
    let t_url = format!("{}/t", base);
    let u_url = format!("{}/u", base);

    // Depth-first reaches /t through /a and /b, at the depth bound
    let mut first = CrawlSession::new(config.clone()).unwrap();
    let report = first.crawl(Strategy::DepthFirst).await;
    assert_eq!(report.pages_fetched, 5);
    assert_eq!(fetch_order(&first), vec!["/", "/a", "/b", "/t", "/c"]);
    assert_eq!(first.pages().get(&t_url).unwrap().depth, 3);
    assert!(first.pages().get(&u_url).is_none());
    assert!(first.pages().iter().all(|p| p.depth <= 3));

    // Breadth-first resume reaches /t through /c, one hop shorter
    let mut second = CrawlSession::new(config).unwrap();
    assert!(second.load_cache());
    let report = second.crawl(Strategy::BreadthFirst).await;
    assert_eq!(report.pages_fetched, 1);

    let target = second.pages().get(&t_url).unwrap();
    assert_eq!(target.depth, 2);
    assert_eq!(target.parent_url.as_deref(), Some(format!("{}/c", base).as_str()));
    let hops: Vec<&str> = target.path_info.iter().map(|h| h.url.as_str()).collect();
    assert_eq!(hops, vec![format!("{}/", base), format!("{}/c", base), t_url.clone()]);
    assert_eq!(target.path_info.last().unwrap().anchor_text, "Lewat C");

    let leaf = second.pages().get(&u_url).unwrap();
    assert_eq!(leaf.depth, 3);
    assert_eq!(leaf.outcome, FetchOutcome::Ok);
    assert_eq!(second.stats().links_admitted, 1);

    let histogram: Vec<(u32, u64)> = second
        .stats()
        .pages_per_depth
        .iter()
        .map(|(d, c)| (*d, *c))
        .collect();
    assert_eq!(histogram, vec![(0, 1), (1, 2), (2, 2), (3, 1)]);
    assert!(second
        .pages()
        .iter()
        .all(|p| p.path_info.len() == p.depth as usize + 1));
    assert_eq!(second.path_of(&t_url), target.path_info);
}

#[test]
fn test_www_seed_scopes_crawl_to_apex_and_subdomains() {
    let cache = TempDir::new().unwrap();
    let config = create_test_config("https://www.upi.edu/", 2, cache.path());
    let session = CrawlSession::new(config).unwrap();

    assert_eq!(session.base_domain(), "upi.edu");

    let html = page(
        "Beranda",
        "",
        &[
            ("https://upi.edu/profil", "Profil"),
            ("https://fpmipa.upi.edu/", "FPMIPA"),
            ("/berita", "Berita"),
            ("https://upi.edu.example.com/", "Tiruan"),
            ("https://notupi.edu/", "Lain"),
        ],
    );
    let extracted = extract_page(&html, session.seed(), session.base_domain(), "Beranda").unwrap();
    let admitted: Vec<&str> = extracted.links.iter().map(|l| l.url.as_str()).collect();

    assert_eq!(
        admitted,
        vec![
            "https://upi.edu/profil",
            "https://fpmipa.upi.edu/",
            "https://www.upi.edu/berita",
        ]
    );
    assert_eq!(extracted.anchors_seen, 5);
}

#[tokio::test]
async fn test_latin1_page_is_searchable() {
    let server = MockServer::start().await;
    let cache = TempDir::new().unwrap();

    let mut body = b"<html><head><title>Kantin</title></head><body><main><p>Menu caf".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b" murah</p></main></body></html>");
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=ISO-8859-1"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&format!("{}/", server.uri()), 1, cache.path());
    let mut session = CrawlSession::new(config).unwrap();
    session.crawl(Strategy::BreadthFirst).await;

    let record = session.pages().iter().next().unwrap();
    assert_eq!(record.body, "Menu café murah");

    let hits = session.search("café", 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Kantin");
}
