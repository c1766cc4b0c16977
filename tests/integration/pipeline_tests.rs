//! Integration tests for the fetch pipeline
//!
//! These tests use wiremock to create mock HTTP servers and drive whole
//! input lines through the coordinator end-to-end.

use linkprobe::config::Config;
use linkprobe::crawler::{crawl, Coordinator, ExtractError, LinkExtractor, UrlList};
use linkprobe::{ErrorKind, Stage, UrlOutcome};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every base URL it is handed and reports a fixed link count
#[derive(Clone, Default)]
struct RecordingExtractor {
    base_urls: Arc<Mutex<Vec<String>>>,
    response_sizes: Arc<Mutex<Vec<usize>>>,
}

impl LinkExtractor for RecordingExtractor {
    fn extract(&self, response: &[u8], base_url: &str) -> Result<usize, ExtractError> {
        self.base_urls.lock().unwrap().push(base_url.to_string());
        self.response_sizes.lock().unwrap().push(response.len());
        Ok(7)
    }
}

fn create_test_config() -> Config {
    let mut config = Config::default();
    config.fetch.connection_timeout_ms = 3000;
    config.fetch.read_wait_timeout_ms = 2000;
    config.user_agent.crawler_name = "TestProbe".to_string();
    config
}

fn line_for(server: &MockServer, target: &str) -> String {
    format!("http://127.0.0.1:{}{}", server.address().port(), target)
}

async fn mount_page(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_missing_robots_allows_page_fetch() {
    let mock_server = MockServer::start().await;

    // No robots.txt mock: wiremock answers 404
    mount_page(
        &mock_server,
        200,
        r#"<html><body>
        <a href="/page1">Page 1</a>
        <a href="/page2">Page 2</a>
        <a href="http://example.com/">External</a>
        <a href="mailto:someone@example.com">Mail</a>
        </body></html>"#,
    )
    .await;

    let mut coordinator = Coordinator::new(create_test_config()).unwrap();
    let outcome = coordinator
        .process_line(&line_for(&mock_server, "/"))
        .await
        .unwrap();

    assert_eq!(outcome, UrlOutcome::Crawled { links: 3 });

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method.to_string(), "HEAD");
    assert_eq!(requests[0].url.path(), "/robots.txt");
    assert_eq!(requests[1].method.to_string(), "GET");
    assert_eq!(requests[1].url.path(), "/");
}

#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "1"))
        .and(header("user-agent", "TestProbe/1.2"))
        .and(header("host", "127.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(create_test_config()).unwrap();
    let outcome = coordinator
        .process_line(&line_for(&mock_server, "/?q=1#section"))
        .await
        .unwrap();

    assert_eq!(outcome, UrlOutcome::Crawled { links: 0 });
}

#[tokio::test]
async fn test_robots_present_blocks_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(create_test_config()).unwrap();
    let outcome = coordinator
        .process_line(&line_for(&mock_server, "/"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UrlOutcome::Rejected {
            stage: Stage::VerifyRobots,
            status: 200
        }
    );
}

#[tokio::test]
async fn test_page_error_status_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 500, "oops").await;

    let extractor = RecordingExtractor::default();
    let mut coordinator =
        Coordinator::with_extractor(create_test_config(), extractor.clone()).unwrap();
    let outcome = coordinator
        .process_line(&line_for(&mock_server, "/"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        UrlOutcome::Rejected {
            stage: Stage::VerifyPage,
            status: 500
        }
    );
    assert!(extractor.base_urls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_extractor_receives_base_url() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, "<html><body>hello</body></html>").await;

    let extractor = RecordingExtractor::default();
    let mut coordinator =
        Coordinator::with_extractor(create_test_config(), extractor.clone()).unwrap();
    let outcome = coordinator
        .process_line(&line_for(&mock_server, "/"))
        .await
        .unwrap();

    assert_eq!(outcome, UrlOutcome::Crawled { links: 7 });

    let base_urls = extractor.base_urls.lock().unwrap();
    assert_eq!(
        *base_urls,
        vec![format!("http://127.0.0.1:{}", mock_server.address().port())]
    );

    let sizes = extractor.response_sizes.lock().unwrap();
    assert_eq!(sizes[0], coordinator.buffer().len());
}

#[tokio::test]
async fn test_same_host_is_skipped_before_network() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, 200, "<html></html>").await;

    let mut coordinator = Coordinator::new(create_test_config()).unwrap();

    let outcome = coordinator.process_line(&line_for(&first, "/")).await.unwrap();
    assert!(outcome.is_success());

    // Same host, different port
    let outcome = coordinator
        .process_line(&line_for(&second, "/"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        UrlOutcome::Duplicate {
            stage: Stage::CheckHostDedup
        }
    );

    assert!(second.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_same_address_is_skipped_before_connect() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, 200, "<html></html>").await;

    let mut coordinator = Coordinator::new(create_test_config()).unwrap();

    let outcome = coordinator.process_line(&line_for(&first, "/")).await.unwrap();
    assert!(outcome.is_success());

    // localhost resolves to the address already seen
    let line = format!("http://localhost:{}/", second.address().port());
    let outcome = coordinator.process_line(&line).await.unwrap();
    assert_eq!(
        outcome,
        UrlOutcome::Duplicate {
            stage: Stage::CheckIpDedup
        }
    );

    assert_eq!(coordinator.seen().host_count(), 2);
    assert_eq!(coordinator.seen().addr_count(), 1);
    assert!(second.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_continues_after_failures() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 200, r#"<a href="/x">x</a>"#).await;

    let lines = vec![
        String::new(),
        "ftp://example.com/".to_string(),
        "http://example.com:0/".to_string(),
        line_for(&mock_server, "/"),
    ];

    let mut coordinator = Coordinator::new(create_test_config()).unwrap();
    let stats = coordinator.run(&lines).await.unwrap();

    assert_eq!(stats.lines_processed, 4);
    assert_eq!(stats.pages_crawled, 1);
    assert_eq!(stats.total_links, 1);
    assert_eq!(stats.failures_by_stage.get(&Stage::ParseUrl), Some(&3));
    assert_eq!(stats.failures_by_kind.get(&ErrorKind::Parse), Some(&3));
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_crawl_from_input_file() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first, 200, r#"<a href="/a">a</a><a href="/b">b</a>"#).await;

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "{}\r\n{}\r\n",
        line_for(&first, "/"),
        line_for(&second, "/")
    )
    .unwrap();
    file.flush().unwrap();

    let urls = UrlList::load(file.path()).unwrap();
    assert_eq!(urls.len(), 2);

    let stats = crawl(create_test_config(), &urls, false).await.unwrap();

    assert_eq!(stats.lines_processed, 2);
    assert_eq!(stats.pages_crawled, 1);
    assert_eq!(stats.total_links, 2);
    assert_eq!(stats.duplicate_hosts, 1);
}

#[tokio::test]
async fn test_oversized_robots_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404).insert_header("x-padding", "p".repeat(600).as_str()))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.fetch.robots_max_bytes = 256;

    let mut coordinator = Coordinator::new(config).unwrap();
    let outcome = coordinator
        .process_line(&line_for(&mock_server, "/"))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        UrlOutcome::Failed {
            stage: Stage::ReadRobots,
            kind: ErrorKind::Resource,
            ..
        }
    ));
}
