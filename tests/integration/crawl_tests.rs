//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use doccrawl::chunk::MeasureUnit;
use doccrawl::config::{
    BackoffKind, ChunkingConfig, Config, CrawlConfig, FetchConfig, OutputConfig, UserAgentConfig,
};
use doccrawl::crawler::{crawl, Coordinator, SkipReason};
use doccrawl::output::{ChunkRecord, MemorySink};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at `{base_url}/guide/`
fn create_test_config(base_url: &str, output_path: &str) -> Config {
    Config {
        crawl: CrawlConfig {
            start_urls: vec![format!("{}/guide/", base_url)],
            scope_root: None,
            max_pages: 10,
            politeness_delay_ms: 0,
            strip_query: true,
        },
        user_agent: UserAgentConfig {
            name: "TestBot".to_string(),
            version: "1.0.0".to_string(),
            contact_url: Some("https://example.com/contact".to_string()),
        },
        fetch: FetchConfig {
            max_attempts: 3,
            backoff: BackoffKind::Fixed,
            base_delay_ms: 0,
            max_delay_ms: 0,
            ..FetchConfig::default()
        },
        chunking: ChunkingConfig {
            measure: MeasureUnit::Chars,
            budget: 200,
            overlap: 20,
            ..ChunkingConfig::default()
        },
        output: OutputConfig {
            path: output_path.to_string(),
        },
    }
}

/// Mounts an HTML page expected to be fetched `times` times
async fn mount_page(server: &MockServer, page_path: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(times)
        .mount(server)
        .await;
}

fn page_a() -> String {
    r#"<html><head><title>Guide</title></head><body>
        <nav><a href="/guide/c">Sidebar link to C</a></nav>
        <main>
            <h1>Guide Home</h1>
            <p>Intro before any section.</p>
            <h2>Install</h2>
            <p>Step one</p>
            <ul><li>Linux</li><li>macOS</li></ul>
            <h2>Next</h2>
            <p>Step two, then read <a href="b">page B</a>.</p>
            <p>Unrelated: <a href="/blog/">blog</a> and <a href="https://other.example.com/guide/">elsewhere</a>.</p>
        </main>
        </body></html>"#
        .to_string()
}

fn page_b() -> String {
    r#"<html><head><title>Page B</title></head><body>
        <article>
            <h2>Back</h2>
            <p>Return to <a href="/guide/">the guide</a> or <a href="/guide/index.html#top">its index</a>.</p>
            <pre><code class="language-sh">cargo install doccrawl</code></pre>
        </article>
        </body></html>"#
        .to_string()
}

fn page_c() -> String {
    r#"<html><head><title>Page C</title></head><body>
        <main><h2>Only</h2><blockquote>Quoted text.</blockquote></main>
        </body></html>"#
        .to_string()
}

#[tokio::test]
async fn test_full_crawl_three_pages() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/", page_a(), 1).await;
    mount_page(&mock_server, "/guide/b", page_b(), 1).await;
    mount_page(&mock_server, "/guide/c", page_c(), 1).await;

    let config = create_test_config(&base_url, "unused.jsonl");
    let mut sink = MemorySink::new();
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let report = coordinator.run(&mut sink).await.expect("Crawl failed");

    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.pages_extracted(), 3);
    assert!(report.skipped.is_empty());
    assert!(!report.hit_page_limit);

    // Breadth-first: C is discovered in the sidebar before B
    let urls: Vec<&str> = sink.pages.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/guide/", base_url),
            format!("{}/guide/c", base_url),
            format!("{}/guide/b", base_url),
        ]
    );

    // Per-page order_index runs 0..n
    for page in &sink.pages {
        for (expected, block) in page.blocks.iter().enumerate() {
            assert_eq!(block.order_index, expected, "page {}", page.url);
        }
    }

    let home = &sink.pages[0];
    assert_eq!(home.title, "Guide Home");
    let tagged: HashMap<&str, &[String]> = home
        .blocks
        .iter()
        .map(|b| (b.text.as_str(), b.heading_path.as_slice()))
        .collect();
    assert_eq!(tagged["Step one"], ["Install".to_string()]);
    assert_eq!(tagged["Step two, then read page B."], ["Next".to_string()]);
    assert!(!tagged.contains_key("Intro before any section."));

    // Every chunk belongs to one section and indexes start at 1 per page
    let mut by_url: HashMap<&str, Vec<&ChunkRecord>> = HashMap::new();
    for record in &sink.records {
        by_url.entry(record.url.as_str()).or_default().push(record);
    }
    assert_eq!(by_url.len(), 3);
    for records in by_url.values() {
        for (offset, record) in records.iter().enumerate() {
            assert_eq!(record.chunk_index, offset + 1);
            assert_eq!(record.id, format!("{}#chunk-{}", record.url, record.chunk_index));
            assert!(record.heading_path.is_some());
        }
    }

    let code_chunk = sink
        .records
        .iter()
        .find(|r| r.text.contains("cargo install"))
        .expect("code chunk");
    assert!(code_chunk.text.contains("```sh\ncargo install doccrawl\n```"));
}

#[tokio::test]
async fn test_crawl_respects_robots_txt() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("User-agent: *\nDisallow: /guide/private", "text/plain"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/guide/",
        r#"<main><h2>Links</h2>
            <p><a href="private/secret">secret</a> <a href="public">public</a></p></main>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/guide/private/secret",
        "<main><h2>Secret</h2><p>hidden</p></main>".to_string(),
        0,
    )
    .await;
    mount_page(
        &mock_server,
        "/guide/public",
        "<main><h2>Public</h2><p>visible</p></main>".to_string(),
        1,
    )
    .await;

    let config = create_test_config(&base_url, "unused.jsonl");
    let mut sink = MemorySink::new();
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let report = coordinator.run(&mut sink).await.expect("Crawl failed");

    assert_eq!(report.pages_extracted(), 2);
    assert!(sink.records.iter().all(|r| !r.text.contains("hidden")));
}

#[tokio::test]
async fn test_crawl_retries_transient_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/guide/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/guide/",
        "<main><h2>Recovered</h2><p>Back online.</p></main>".to_string(),
        1,
    )
    .await;

    let config = create_test_config(&base_url, "unused.jsonl");
    let mut sink = MemorySink::new();
    let report = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run(&mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_extracted(), 1);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].text, "Back online.");
}

#[tokio::test]
async fn test_crawl_skips_failed_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/guide/",
        r#"<main><h2>Links</h2><p>
            <a href="gone">gone</a> <a href="manual">manual</a> <a href="ok">ok</a>
        </p></main>"#
            .to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/guide/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guide/manual"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/guide/ok",
        "<main><h2>Fine</h2><p>Still crawled.</p></main>".to_string(),
        1,
    )
    .await;

    let config = create_test_config(&base_url, "unused.jsonl");
    let mut sink = MemorySink::new();
    let report = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run(&mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_visited, 4);
    assert_eq!(report.pages_extracted(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .all(|s| s.reason == SkipReason::Fetch));
    assert!(report.skipped[0].url.ends_with("/guide/gone"));
}

#[tokio::test]
async fn test_crawl_stops_at_max_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/", page_a(), 1).await;
    mount_page(&mock_server, "/guide/b", page_b(), 0).await;
    mount_page(&mock_server, "/guide/c", page_c(), 0).await;

    let mut config = create_test_config(&base_url, "unused.jsonl");
    config.crawl.max_pages = 1;

    let mut sink = MemorySink::new();
    let report = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run(&mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_extracted(), 1);
    assert!(report.hit_page_limit);
}

#[tokio::test]
async fn test_crawl_waits_between_dispatches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/guide/", page_a(), 1).await;
    mount_page(&mock_server, "/guide/b", page_b(), 1).await;
    mount_page(&mock_server, "/guide/c", page_c(), 1).await;

    let mut config = create_test_config(&base_url, "unused.jsonl");
    config.crawl.politeness_delay_ms = 300;

    let mut sink = MemorySink::new();
    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let started = Instant::now();
    let report = coordinator.run(&mut sink).await.expect("Crawl failed");
    let elapsed = started.elapsed();

    assert_eq!(report.pages_extracted(), 3);
    // Two waits: none before the first dispatch
    assert!(elapsed >= Duration::from_millis(600), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(900), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_crawl_decodes_legacy_encoding() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // ISO-8859-1 bytes declared only in a meta tag
    let mut body = b"<html><head><meta charset=\"iso-8859-1\"></head><body><main>\
        <h2>Caf"
        .to_vec();
    body.push(0xE9);
    body.extend_from_slice(b"</h2><p>Cr");
    body.push(0xE8);
    body.extend_from_slice(b"me br");
    body.push(0xFB);
    body.extend_from_slice(b"l\xE9e</p></main></body></html>");

    Mock::given(method("GET"))
        .and(path("/guide/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "unused.jsonl");
    let mut sink = MemorySink::new();
    let report = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run(&mut sink)
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages[0].encoding, "windows-1252");
    assert_eq!(sink.records[0].text, "Crème brûlée");
    assert_eq!(sink.records[0].heading_path, Some(vec!["Café".to_string()]));
}

#[tokio::test]
async fn test_crawl_writes_jsonl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/guide/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("last-modified", "Wed, 21 Oct 2015 07:28:00 GMT")
                .set_body_raw(page_c(), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("chunks.jsonl");
    let config = create_test_config(&base_url, &output_path.display().to_string());

    let report = crawl(&config).await.expect("Crawl failed");
    assert_eq!(report.chunks_written, 1);

    let content = std::fs::read_to_string(&output_path).expect("Failed to read output");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: ChunkRecord = serde_json::from_str(lines[0]).expect("Invalid JSON line");
    assert_eq!(record.url, format!("{}/guide/", base_url));
    assert_eq!(record.id, format!("{}/guide/#chunk-1", base_url));
    assert_eq!(record.title, "Page C");
    assert_eq!(record.text, "> Quoted text.");
    assert_eq!(record.num_tokens_or_chars, 14);
    assert_eq!(record.heading_path, Some(vec!["Only".to_string()]));
    assert_eq!(
        record.last_modified.as_deref(),
        Some("2015-10-21T07:28:00+00:00")
    );
}
