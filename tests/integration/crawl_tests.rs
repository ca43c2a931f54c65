//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use ripple_crawl::config::{
    Config, CrawlerConfig, DiscoveryConfig, MetricsConfig, PolicyConfig, SeedsConfig,
    UserAgentConfig,
};
use ripple_crawl::crawler::{
    build_http_client, run_crawl, Coordinator, FetchFailure, FetchResult, Fetcher, HttpFetcher,
};
use ripple_crawl::metrics::{CrawlMetrics, NoopMetrics};
use ripple_crawl::output::StopReason;
use ripple_crawl::seeds::{discover_seeds, HtmlSearchDiscovery, SeedDiscovery};
use ripple_crawl::{RippleError, SeedError};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration
fn create_test_config(max_depth: u32, max_pages: u64, politeness: f64) -> Config {
    Config {
        crawler: CrawlerConfig {
            politeness_delay: politeness,
            max_pages,
            max_depth,
            workers: 3,
            fetch_timeout: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
        seeds: SeedsConfig {
            path: "seeds.txt".to_string(),
            discovery: None,
        },
        policy: PolicyConfig::default(),
        metrics: MetricsConfig::default(),
    }
}

fn http_fetcher(config: &Config) -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::from_config(&config.user_agent).expect("Failed to build client"))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body).into_bytes(),
        "text/html; charset=utf-8",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/page1">Page 1</a>
               <a href="{}/page2">Page 2</a>
               <a href="/page1#again">Page 1 again</a>
               <a href="mailto:owner@example.com">Mail</a>
               <a href="/logout">Log out</a>"#,
            base_url
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/page1", r#"<a href="/">Home</a><a href="/page2">2</a>"#, 1).await;
    mount_page(&mock_server, "/page2", r#"<a href="/page1">1</a>"#, 1).await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(html("bye"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(3, 100, 0.0);
    let coordinator = Coordinator::new(config.clone(), http_fetcher(&config), Arc::new(NoopMetrics));
    coordinator.seed([format!("{}/", base_url)]).await;

    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_dispatched, 3);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.seen, 3);
    assert_eq!(report.pending, 0);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/level1">1</a>"#, 1).await;
    mount_page(&mock_server, "/level1", r#"<a href="/level2">2</a>"#, 1).await;
    mount_page(&mock_server, "/level2", r#"<a href="/level3">3</a>"#, 1).await;
    mount_page(&mock_server, "/level3", "too deep", 0).await;

    let config = create_test_config(2, 100, 0.0);
    let coordinator = Coordinator::new(config.clone(), http_fetcher(&config), Arc::new(NoopMetrics));
    coordinator.seed([format!("{}/", mock_server.uri())]).await;

    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.seen, 3);
}

#[tokio::test]
async fn test_failures_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/missing">404</a>
           <a href="/broken">500</a>
           <a href="/logo.png">Image</a>
           <a href="/ok">Fine</a>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "/ok", r#"<a href="/after">After</a>"#, 1).await;
    mount_page(&mock_server, "/after", "end", 1).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let metrics = Arc::new(CrawlMetrics::new());
    let config = create_test_config(2, 100, 0.0);
    let coordinator = Coordinator::new(config.clone(), http_fetcher(&config), metrics.clone());
    coordinator.seed([format!("{}/", mock_server.uri())]).await;

    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_dispatched, 6);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.pages_failed(), 3);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.pages_total, 6);
    assert_eq!(snapshot.pages_ok, 3);
    assert_eq!(snapshot.pages_err, 3);
}

#[tokio::test]
async fn test_page_budget_stops_crawl() {
    let mock_server = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&mock_server, "/", &links, 1).await;

    Mock::given(method("GET"))
        .respond_with(html("leaf"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(2, 4, 0.0);
    config.crawler.workers = 1;
    let coordinator = Coordinator::new(config.clone(), http_fetcher(&config), Arc::new(NoopMetrics));
    coordinator.seed([format!("{}/", mock_server.uri())]).await;

    let report = coordinator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_fetched, 4);
    assert_eq!(report.pending, 7);
    assert_eq!(report.stop_reason, StopReason::PageBudget);
}

#[tokio::test]
async fn test_politeness_spaces_requests_to_one_origin() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#, 1).await;
    mount_page(&mock_server, "/a", "a", 1).await;
    mount_page(&mock_server, "/b", "b", 1).await;

    let config = create_test_config(1, 100, 0.2);
    let coordinator = Coordinator::new(config.clone(), http_fetcher(&config), Arc::new(NoopMetrics));
    coordinator.seed([format!("{}/", mock_server.uri())]).await;

    let started = Instant::now();
    coordinator.run().await.expect("Crawl failed");

    // Three dispatches to one origin need two full politeness intervals
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_http_fetcher_success_follows_redirects() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .and(header("user-agent", "TestBot/1.0.0 (+https://example.com/contact)"))
        .respond_with(html("moved"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(1, 100, 0.0);
    let fetcher = http_fetcher(&config);

    match fetcher
        .fetch(&format!("{}/old", base_url), Duration::from_secs(5))
        .await
    {
        FetchResult::Success {
            final_url,
            status_code,
            content_type,
            body,
        } => {
            assert_eq!(final_url, format!("{}/new", base_url));
            assert_eq!(status_code, 200);
            assert!(content_type.starts_with("text/html"));
            assert!(body.contains("moved"));
        }
        other => panic!("Expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_failure_results() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("late").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(1, 100, 0.0);
    let fetcher = http_fetcher(&config);
    let timeout = Duration::from_secs(5);

    assert_eq!(
        fetcher.fetch(&format!("{}/file.pdf", base_url), timeout).await,
        FetchResult::ContentMismatch {
            status_code: 200,
            content_type: "application/pdf".to_string(),
        }
    );

    assert_eq!(
        fetcher.fetch(&format!("{}/missing", base_url), timeout).await,
        FetchResult::HttpError { status_code: 404 }
    );

    let empty = fetcher.fetch(&format!("{}/empty", base_url), timeout).await;
    assert!(empty.is_success());

    match fetcher
        .fetch(&format!("{}/slow", base_url), Duration::from_millis(200))
        .await
    {
        FetchResult::NetworkError { kind, .. } => assert_eq!(kind, FetchFailure::Timeout),
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_fetcher_connection_refused() {
    // Reserve a port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = build_http_client(&create_test_config(1, 100, 0.0).user_agent).unwrap();
    let fetcher = HttpFetcher::new(client);

    match fetcher
        .fetch(&format!("http://127.0.0.1:{}/", port), Duration::from_secs(5))
        .await
    {
        FetchResult::NetworkError { kind, .. } => assert_eq!(kind, FetchFailure::Connect),
        other => panic!("Expected connect error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_search_discovery() {
    let mock_server = MockServer::start().await;
    let endpoint = format!("{}/html/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "web crawling"))
        .respond_with(html(
            r#"<a href="/html/?q=web+crawling&s=30">More</a>
               <a href="https://one.example/intro">One</a>
               <a href="/l/?uddg=https%3A%2F%2Ftwo.example%2F">Two</a>
               <a href="https://one.example/intro">One again</a>
               <a href="https://three.example/">Three</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = build_http_client(&create_test_config(1, 100, 0.0).user_agent).unwrap();
    let provider = HtmlSearchDiscovery::new(client, &endpoint).unwrap();

    let urls = provider.discover("web crawling", 2).await.unwrap();
    assert_eq!(urls, vec!["https://one.example/intro", "https://two.example/"]);
}

#[tokio::test]
async fn test_search_discovery_failure_is_swallowed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = build_http_client(&create_test_config(1, 100, 0.0).user_agent).unwrap();
    let provider = HtmlSearchDiscovery::new(client, &mock_server.uri()).unwrap();

    assert!(matches!(
        provider.discover("anything", 5).await,
        Err(SeedError::DiscoveryStatus(429))
    ));
    assert!(discover_seeds(&provider, "anything", 5).await.is_empty());
}

#[tokio::test]
async fn test_run_crawl_with_seed_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/next">Next</a>"#, 1).await;
    mount_page(&mock_server, "/next", "end", 1).await;

    // Discovery fails; the crawl still runs on the seed file
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let mut seeds = tempfile::NamedTempFile::new().unwrap();
    writeln!(seeds, "# local test site").unwrap();
    writeln!(seeds, "{}/", base_url).unwrap();
    writeln!(seeds, "not a url").unwrap();
    seeds.flush().unwrap();

    let mut config = create_test_config(1, 100, 0.0);
    config.seeds.discovery = Some(DiscoveryConfig {
        query: "anything".to_string(),
        endpoint: format!("{}/search", base_url),
        max_results: 5,
    });

    let report = run_crawl(config, Some(seeds.path().to_path_buf()))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
    let metrics = report.metrics.expect("Metrics are enabled by default");
    assert_eq!(metrics.pages_total, 2);
}

#[tokio::test]
async fn test_run_crawl_missing_seed_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(1, 100, 0.0);

    let result = run_crawl(config, Some(dir.path().join("nope.txt"))).await;
    assert!(matches!(
        result,
        Err(RippleError::Seed(SeedError::NotFound(_)))
    ));
}
