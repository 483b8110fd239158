//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock encyclopedia servers and run the
//! full crawl cycle end-to-end against a temporary output directory.

use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiki_math_crawler::config::Config;
use wiki_math_crawler::crawler::{run_crawl, Coordinator, CrawlControl};
use wiki_math_crawler::ArticleRecord;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `server` from `seed_path`
fn create_test_config(server: &MockServer, seed_path: &str, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = format!("{}{}", server.uri(), seed_path);
    config.crawler.worker_count = 4;
    config.crawler.sub_batch_factor = 2;
    config.http.retry_delay_ms = 10;
    config.http.timeout_secs = 5;
    config.output.directory = output_dir.to_string_lossy().into_owned();
    config
}

fn article(content: &str) -> String {
    format!(
        r#"<html><head><title>Article</title></head><body>
        <div id="mw-head"><a href="/wiki/Main_Page">Main page</a></div>
        <div id="mw-content-text">{}</div>
        </body></html>"#,
        content
    )
}

async fn mount_article(server: &MockServer, page: &str, content: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_string(article(content)))
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn read_records(config: &Config) -> Vec<ArticleRecord> {
    std::fs::read_to_string(config.output.records_path())
        .unwrap_or_default()
        .lines()
        .map(|line| serde_json::from_str(line).expect("record is valid JSON"))
        .collect()
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_writes_one_record_per_article() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    mount_article(
        &server,
        "/wiki/Seed",
        r#"<p>Seed links to <a href="/wiki/Algebra">algebra</a> and
           <a href="/wiki/Geometry">geometry</a>.</p>
           <p><a href="/wiki/File:Diagram.svg">diagram</a> <a href="/wiki/Special:Random">random</a></p>"#,
        1,
    )
    .await;
    mount_article(
        &server,
        "/wiki/Algebra",
        r#"<p>Let <math alttext="x^2"><mi>x</mi></math> be positive.[1]</p>
           <p>Back to <a href="/wiki/Seed">the seed</a>.</p>
           <h2><span id="References">References</span></h2>
           <p>Smith, Algebra, 2001.</p>"#,
        1,
    )
    .await;
    mount_article(
        &server,
        "/wiki/Geometry",
        r#"<p>Shapes and <a href="/wiki/Algebra">algebra</a>.</p>
           <dl><dd><math alttext="a^2+b^2=c^2"><mi>a</mi></math></dd></dl>"#,
        1,
    )
    .await;

    let config = create_test_config(&server, "/wiki/Seed", output.path());
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.articles_written, 3);
    assert_eq!(stats.failures, 0);
    assert!(!stats.interrupted);
    assert_eq!(stats.pending_at_exit, 0);

    let records = read_records(&config);
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["Seed", "Algebra", "Geometry"]);

    let algebra = &records[1];
    assert_eq!(algebra.url, format!("{}/wiki/Algebra", base));
    assert_eq!(algebra.text, "Let $x^2$ be positive.\nBack to the seed.\n");
    assert!(!algebra.text.contains("Smith"));

    assert_eq!(records[2].text, "Shapes and algebra.\n$a^2+b^2=c^2$\n");

    let checkpoint = read_lines(&config.output.checkpoint_path());
    assert_eq!(
        checkpoint,
        vec![
            format!("{}/wiki/Seed", base),
            format!("{}/wiki/Algebra", base),
            format!("{}/wiki/Geometry", base),
        ]
    );
}

#[tokio::test]
async fn test_link_found_by_two_pages_is_fetched_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(
        &server,
        "/wiki/Seed",
        r#"<p><a href="/wiki/Left">l</a> <a href="/wiki/Right">r</a></p>"#,
        1,
    )
    .await;
    mount_article(&server, "/wiki/Left", r#"<p><a href="/wiki/Shared">s</a></p>"#, 1).await;
    mount_article(&server, "/wiki/Right", r#"<p><a href="/wiki/Shared#Proof">s</a></p>"#, 1).await;
    mount_article(&server, "/wiki/Shared", "<p>Shared page.</p>", 1).await;

    let config = create_test_config(&server, "/wiki/Seed", output.path());
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.rounds, 3);
    assert_eq!(stats.articles_written, 4);
    let shared = read_records(&config)
        .into_iter()
        .filter(|r| r.key == "Shared")
        .count();
    assert_eq!(shared, 1);
}

#[tokio::test]
async fn test_resume_skips_checkpointed_pages() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    // Seed and Done were visited by an earlier session
    std::fs::write(
        output.path().join("session_visited_urls.txt"),
        format!("{}/wiki/Seed\n{}/wiki/Done\n", base, base),
    )
    .unwrap();

    // The seed is fetched again for its links but not re-recorded
    mount_article(
        &server,
        "/wiki/Seed",
        r#"<p><a href="/wiki/Done">done</a> <a href="/wiki/Fresh">fresh</a></p>"#,
        1,
    )
    .await;
    mount_article(&server, "/wiki/Done", "<p>Never fetched.</p>", 0).await;
    mount_article(&server, "/wiki/Fresh", "<p>New content.</p>", 1).await;

    let config = create_test_config(&server, "/wiki/Seed", output.path());
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.already_visited, 1);
    assert_eq!(stats.articles_written, 1);
    assert_eq!(stats.visited_total, 3);

    let records = read_records(&config);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "Fresh");

    let checkpoint = read_lines(&config.output.checkpoint_path());
    assert_eq!(checkpoint.len(), 3);
    assert_eq!(checkpoint[2], format!("{}/wiki/Fresh", base));
}

#[tokio::test]
async fn test_second_session_does_nothing_new() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(&server, "/wiki/Seed", r#"<p><a href="/wiki/Only">o</a></p>"#, 2).await;
    mount_article(&server, "/wiki/Only", "<p>Only child.</p>", 1).await;

    let config = create_test_config(&server, "/wiki/Seed", output.path());
    let first = run_crawl(config.clone()).await.unwrap();
    let second = run_crawl(config.clone()).await.unwrap();

    assert_eq!(first.articles_written, 2);
    assert_eq!(second.articles_written, 0);
    assert_eq!(second.already_visited, 1);
    assert_eq!(read_records(&config).len(), 2);
    assert_eq!(read_lines(&config.output.checkpoint_path()).len(), 2);
}

#[tokio::test]
async fn test_failing_page_is_retried_then_dead_lettered() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    mount_article(&server, "/wiki/Seed", r#"<p><a href="/wiki/Broken">b</a></p>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/wiki/Broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.crawler.max_attempts = 2;
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.failures, 2);
    assert_eq!(stats.dead_lettered, 1);
    assert_eq!(stats.rounds, 3);

    let broken = format!("{}/wiki/Broken", base);
    assert_eq!(read_lines(&config.output.dead_letter_path()), vec![broken.clone()]);
    assert!(!read_lines(&config.output.checkpoint_path()).contains(&broken));
}

#[tokio::test]
async fn test_missing_content_region_fails_the_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wiki/Seed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><p>bare</p></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.crawler.max_attempts = 1;
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.failures, 1);
    assert_eq!(stats.articles_written, 0);
    assert!(read_records(&config).is_empty());
}

#[tokio::test]
async fn test_dead_link_is_recorded_empty() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(&server, "/wiki/Seed", r#"<p><a href="/wiki/Gone">gone</a></p>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/wiki/Gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html><body>Not found</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/wiki/Seed", output.path());
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.failures, 0);
    let records = read_records(&config);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].key, "Gone");
    assert!(records[1].text.is_empty());
}

#[tokio::test]
async fn test_article_limit_caps_dispatch() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(
        &server,
        "/wiki/Seed",
        r#"<p><a href="/wiki/One">1</a> <a href="/wiki/Two">2</a> <a href="/wiki/Three">3</a></p>"#,
        1,
    )
    .await;
    mount_article(&server, "/wiki/One", "<p>One.</p>", 1).await;
    mount_article(&server, "/wiki/Two", "<p>Two.</p>", 0).await;
    mount_article(&server, "/wiki/Three", "<p>Three.</p>", 0).await;

    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.crawler.article_limit = Some(2);
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.pages_dispatched, 2);
    assert_eq!(stats.pending_at_exit, 2);
    let keys: Vec<String> = read_records(&config).into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec!["Seed".to_string(), "One".to_string()]);
}

#[tokio::test]
async fn test_sequential_mode_crawls_everything() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(
        &server,
        "/wiki/Seed",
        r#"<p><a href="/wiki/A">a</a> <a href="/wiki/B">b</a></p>"#,
        1,
    )
    .await;
    mount_article(&server, "/wiki/A", "<p>A.</p>", 1).await;
    mount_article(&server, "/wiki/B", "<p>B.</p>", 1).await;

    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.crawler.mode = wiki_math_crawler::config::CrawlMode::Sequential;
    config.crawler.request_interval_ms = 5;
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.articles_written, 3);
    assert_eq!(stats.rounds, 2);
}

#[tokio::test]
async fn test_plain_record_format() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(&server, "/wiki/Seed", "<p>Plain.</p>", 1).await;

    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.output.record_format = wiki_math_crawler::config::RecordFormat::Plain;
    run_crawl(config.clone()).await.unwrap();

    let content = std::fs::read_to_string(config.output.records_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(content.trim_end()).unwrap();
    assert!(value.get("key").is_none());
    assert_eq!(value["text"], "Plain.\n");
}

#[tokio::test]
async fn test_stop_request_ends_session_before_dispatch() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(&server, "/wiki/Seed", "<p>Never fetched.</p>", 0).await;

    let config = create_test_config(&server, "/wiki/Seed", output.path());
    let (control, rx) = CrawlControl::new();
    control.interrupt();
    control.interrupt();

    let mut coordinator = Coordinator::new(config).unwrap().with_control(rx);
    let stats = coordinator.run().await.unwrap();

    assert!(stats.interrupted);
    assert_eq!(stats.pages_dispatched, 0);
    assert_eq!(stats.pending_at_exit, 1);
}

#[tokio::test]
async fn test_unreachable_seed_is_dead_lettered() {
    let output = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut config = Config::default();
    config.crawler.seed_url = format!("http://127.0.0.1:{}/wiki/Seed", port);
    config.crawler.max_attempts = 1;
    config.http.retry_delay_ms = 10;
    config.output.directory = output.path().to_string_lossy().into_owned();

    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.failures, 1);
    assert_eq!(stats.dead_lettered, 1);
    assert_eq!(stats.visited_total, 0);
    assert_eq!(
        read_lines(&config.output.dead_letter_path()),
        vec![format!("http://127.0.0.1:{}/wiki/Seed", port)]
    );
}

#[tokio::test]
async fn test_seed_with_fragment_is_recorded_once() {
    let server = MockServer::start().await;
    let base = server.uri();
    let output = TempDir::new().unwrap();

    mount_article(&server, "/wiki/Seed", r#"<p><a href="/wiki/Other">other</a></p>"#, 1).await;
    mount_article(&server, "/wiki/Other", r#"<p><a href="/wiki/Seed">back</a></p>"#, 1).await;

    let config = create_test_config(&server, "/wiki/Seed#History", output.path());
    let stats = run_crawl(config.clone()).await.unwrap();

    assert_eq!(stats.articles_written, 2);
    let keys: Vec<String> = read_records(&config).into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec!["Seed".to_string(), "Other".to_string()]);
    assert_eq!(
        read_lines(&config.output.checkpoint_path()),
        vec![format!("{}/wiki/Seed", base), format!("{}/wiki/Other", base)]
    );
}

async fn mount_delayed_article(server: &MockServer, page: &str, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article("<p>Slow page.</p>"))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetches_never_exceed_worker_count() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    let names: Vec<String> = (1..=8).map(|i| format!("Page_{}", i)).collect();
    let links: String = names
        .iter()
        .map(|name| format!(r#"<a href="/wiki/{}">{}</a> "#, name, name))
        .collect();
    mount_article(&server, "/wiki/Seed", &format!("<p>{}</p>", links), 1).await;
    for name in &names {
        mount_delayed_article(&server, &format!("/wiki/{}", name), 200).await;
    }

    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.crawler.worker_count = 2;
    config.crawler.sub_batch_factor = 4;

    let start = Instant::now();
    let stats = run_crawl(config).await.unwrap();

    // Eight 200ms pages, two at a time
    assert_eq!(stats.articles_written, 9);
    assert!(start.elapsed() >= Duration::from_millis(800));
}

#[tokio::test]
async fn test_sub_batch_waits_for_its_slowest_page() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_article(
        &server,
        "/wiki/Seed",
        r#"<p><a href="/wiki/A">a</a> <a href="/wiki/B">b</a> <a href="/wiki/C">c</a> <a href="/wiki/D">d</a></p>"#,
        1,
    )
    .await;
    mount_delayed_article(&server, "/wiki/A", 400).await;
    mount_delayed_article(&server, "/wiki/B", 0).await;
    mount_delayed_article(&server, "/wiki/C", 0).await;
    mount_delayed_article(&server, "/wiki/D", 400).await;

    // Sub-batches of 2 x 1: [A, B] then [C, D]
    let mut config = create_test_config(&server, "/wiki/Seed", output.path());
    config.crawler.worker_count = 2;
    config.crawler.sub_batch_factor = 1;

    let start = Instant::now();
    let stats = run_crawl(config.clone()).await.unwrap();

    // Without the barrier D would overlap A and the crawl would take ~400ms
    assert_eq!(stats.articles_written, 5);
    assert!(start.elapsed() >= Duration::from_millis(800));

    let keys: Vec<String> = read_records(&config).into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec!["Seed", "A", "B", "C", "D"]);
}
