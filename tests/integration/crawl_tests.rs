//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use cache_probe::config::{Config, CrawlerConfig, OutputConfig};
use cache_probe::crawler::{crawl_host, Coordinator};
use cache_probe::output::{load_preview, MemorySink, REPORT_HEADER};
use cache_probe::payload::PayloadPool;
use cache_probe::{CrawlError, CrawlPhase};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn coordinator(server: &MockServer, payloads: &[&str], sink: Arc<MemorySink>) -> Coordinator {
    Coordinator::new(
        Url::parse(&server.uri()).unwrap(),
        &CrawlerConfig::default(),
        Arc::new(PayloadPool::from_values(payloads.iter().copied())),
        sink,
    )
    .unwrap()
}

fn test_config(reports_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_requests: 4,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            reports_dir: reports_dir.to_path_buf(),
            preview_rows: 10,
        },
    }
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Every reachable target is fetched exactly twice
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">A</a>
               <a href="/a?ref=1">A again</a>
               <a href="https://other.test/x">Foreign</a>
               <a href="/img.png">Image</a>
               <form action="/submit" method="post"><input type="text" name="q"></form>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(&format!(
            r#"<a href="/">Home</a><a href="{}/a">Self</a><a href="/b">B</a>"#,
            base
        )))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(body_string("q=hunter2"))
        .respond_with(html(r#"<a href="/a">A</a><a href="/b">B</a>"#))
        .expect(2)
        .mount(&server)
        .await;

    // A failing first request is never retried
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let mut coordinator = coordinator(&server, &["hunter2"], Arc::clone(&sink));
    let outcome = coordinator.run().await.unwrap();

    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert!(!outcome.interrupted);
    assert_eq!(outcome.probes, 4);
    assert_eq!(outcome.bodies, 3);
    assert_eq!(sink.headers_written(), 1);

    let rows = sink.rows();
    let keys: HashSet<(String, String)> = rows
        .iter()
        .map(|r| (r.method.clone(), r.url.clone()))
        .collect();
    assert_eq!(keys.len(), rows.len(), "a target was recorded twice");

    let expected: HashSet<(String, String)> = [
        ("get", "/"),
        ("get", "/a"),
        ("post", "/submit"),
        ("get", "/b"),
    ]
    .iter()
    .map(|(m, p)| (m.to_string(), format!("{}{}", base, p)))
    .collect();
    assert_eq!(keys, expected);

    for row in &rows {
        assert!(row.url.starts_with(&base), "foreign row {}", row.url);
    }

    let failed = rows.iter().find(|r| r.url.ends_with("/b")).unwrap();
    assert!(failed.first_load == 0.0 && failed.second_load == 0.0);
}

#[tokio::test]
async fn test_cache_headers_recorded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html("")
                .insert_header("Cache-Control", "public, max-age=600")
                .insert_header("ETag", "W/\"abc\"")
                .insert_header("Last-Modified", "Mon, 01 Jan 2024 00:00:00 GMT"),
        )
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    coordinator(&server, &["x"], Arc::clone(&sink))
        .run()
        .await
        .unwrap();

    let rows = sink.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cache_control, "public, max-age=600");
    assert_eq!(rows[0].etag, "W/\"abc\"");
    assert_eq!(rows[0].last_modified, "Mon, 01 Jan 2024 00:00:00 GMT");
    assert!(rows[0].expires.is_empty());
}

#[tokio::test]
async fn test_get_form_sends_payload_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<form action="/search" method="GET">
                 <input name="term"><input type="submit" name="go" value="Go">
               </form>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "kittens"))
        .respond_with(html(""))
        .expect(2)
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let outcome = coordinator(&server, &["kittens"], Arc::clone(&sink))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.probes, 2);
    assert_eq!(outcome.bodies, 2);
}

#[tokio::test]
async fn test_empty_payload_pool_fails_the_host() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<form action="/login"><input name="user"></form>"#))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let mut coordinator = coordinator(&server, &[], Arc::clone(&sink));
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, CrawlError::EmptyPayloadPool { .. }));
    // The root row was written before extraction failed
    assert_eq!(sink.rows().len(), 1);
}

#[tokio::test]
async fn test_empty_payload_pool_is_fine_without_form_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<form action="/ping"><input type="submit"></form>"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .respond_with(html(""))
        .expect(2)
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let outcome = coordinator(&server, &[], Arc::clone(&sink))
        .run()
        .await
        .unwrap();
    assert_eq!(outcome.probes, 2);
}

#[tokio::test]
async fn test_coordinator_runs_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(""))
        .mount(&server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let mut coordinator = coordinator(&server, &["x"], Arc::clone(&sink));
    coordinator.run().await.unwrap();

    let err = coordinator.run().await.unwrap_err();
    assert!(matches!(
        err,
        CrawlError::InvalidTransition {
            from: CrawlPhase::Done,
            to: CrawlPhase::Draining
        }
    ));
    assert_eq!(sink.headers_written(), 1);
}

#[tokio::test]
async fn test_concurrent_requests_are_capped() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&links))
        .mount(&server)
        .await;
    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html("").set_delay(Duration::from_millis(200)))
            .expect(2)
            .mount(&server)
            .await;
    }

    let config = CrawlerConfig {
        max_concurrent_requests: 4,
        ..CrawlerConfig::default()
    };
    let sink = Arc::new(MemorySink::new());
    let mut coordinator = Coordinator::new(
        Url::parse(&server.uri()).unwrap(),
        &config,
        Arc::new(PayloadPool::from_values(["x"])),
        sink,
    )
    .unwrap();

    let start = std::time::Instant::now();
    let outcome = coordinator.run().await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome.probes, 21);
    // 20 targets x 2 requests x 200ms spread over 4 slots
    assert!(
        elapsed >= Duration::from_millis(1900),
        "crawl took {:?}; more than 4 probes ran at once",
        elapsed
    );
}

#[tokio::test]
async fn test_crawl_host_writes_sorted_report() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/fast">Fast</a><a href="/slow">Slow</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(html(""))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("").set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let reports = dir.path().join("reports");
    let config = test_config(&reports);
    let payloads = Arc::new(PayloadPool::from_values(["x"]));

    let run = crawl_host(&server.uri(), &config, payloads, std::future::pending())
        .await
        .unwrap();

    assert_eq!(run.report, reports.join("127.0.0.1.csv"));
    assert_eq!(run.outcome.probes, 3);

    let content = std::fs::read_to_string(&run.report).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], REPORT_HEADER.join(","));
    assert!(lines[1].starts_with(&format!("get,{}/slow,", server.uri())));

    let preview = load_preview(&run.report, 2).unwrap();
    assert_eq!(preview.rows.len(), 2);
    assert!(preview.truncated);
    assert_eq!(preview.rows[0][0], format!("{}/slow", server.uri()));
}

#[tokio::test]
async fn test_interrupted_crawl_keeps_header_and_skips_sort() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("").set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let payloads = Arc::new(PayloadPool::from_values(["x"]));

    let shutdown = tokio::time::sleep(Duration::from_millis(200));
    let run = tokio::time::timeout(
        Duration::from_secs(5),
        crawl_host(&server.uri(), &config, payloads, shutdown),
    )
    .await
    .expect("interruption should end the crawl promptly")
    .unwrap();

    assert!(run.outcome.interrupted);
    assert_eq!(run.outcome.probes, 0);

    let content = std::fs::read_to_string(&run.report).unwrap();
    assert_eq!(content, format!("{}\n", REPORT_HEADER.join(",")));
    assert!(!run.report.with_extension("csv.sorting").exists());
}

#[tokio::test]
async fn test_crawl_host_rejects_bad_host() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let payloads = Arc::new(PayloadPool::from_values(["x"]));

    let err = crawl_host("   ", &config, payloads, std::future::pending())
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::UrlError(_)));
}
