//! Integration tests for the grabber
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full grab cycle end-to-end.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use webgrab::config::CrawlConfig;
use webgrab::storage::{Storage, StorageError};
use webgrab::url::SiteIdentity;
use webgrab::{CrawlState, GrabError, Grabber, StatusEvent, StatusReceiver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at `root`
fn create_test_config(seed: &str, root: &Path, max_depth: u32) -> CrawlConfig {
    let mut config = CrawlConfig::new(seed, root).expect("Failed to build config");
    config.max_depth = max_depth;
    config.max_concurrent_fetches = 4;
    config.request_timeout = Duration::from_secs(5);
    config.user_agent = "TestGrabber/1.0".to_string();
    config
}

/// An HTML response
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// Mounts an HTML page at `route`, expecting exactly `hits` requests
async fn mount_page(server: &MockServer, route: &str, body: &str, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(hits)
        .mount(server)
        .await;
}

/// Drains the status stream until every producer is gone
async fn collect_events(events: &mut StatusReceiver) -> Vec<StatusEvent> {
    let mut collected = Vec::new();
    let drain = async {
        while let Some(event) = events.recv().await {
            collected.push(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(20), drain)
        .await
        .expect("Status stream did not close");
    collected
}

fn progress_lines(events: &[StatusEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            StatusEvent::Progress(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}

fn site_dir(root: &Path, seed: &str) -> PathBuf {
    let seed = url::Url::parse(seed).expect("Failed to parse seed");
    let site = SiteIdentity::from_url(&seed).expect("Seed has no host");
    root.join(site.as_str())
}

#[tokio::test]
async fn test_depth_bound_stops_cycle() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    // A -> B -> C -> A
    mount_page(&server, "/", r#"<html><body><a href="/b">B</a></body></html>"#, 1).await;
    mount_page(&server, "/b", r#"<html><body><a href="/c">C</a></body></html>"#, 1).await;
    mount_page(&server, "/c", r#"<html><body><a href="/">A</a></body></html>"#, 0).await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 1))
        .expect("Failed to start grab");

    let events = collect_events(&mut events).await;
    assert_eq!(grabber.wait().await, CrawlState::Completed);
    assert_eq!(events.last(), Some(&StatusEvent::Completed));

    let lines = progress_lines(&events);
    assert!(lines.contains(&format!("Grabbed: {}/", server.uri())));
    assert!(lines.contains(&format!("Grabbed: {}/b", server.uri())));
    assert_eq!(lines.len(), 2, "unexpected lines: {:?}", lines);

    let stats = grabber.statistics().unwrap();
    assert_eq!(stats.pages_admitted, 2);
    assert_eq!(stats.pages_grabbed, 2);
}

#[tokio::test]
async fn test_root_is_saved_as_index() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    // One request here, one from the grab
    mount_page(&server, "/", "<html><body>Home</body></html>", 2).await;

    let client = reqwest::Client::new();
    let served = client.get(&seed).send().await.unwrap();
    assert_eq!(
        served.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/html"
    );

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    collect_events(&mut events).await;

    let saved = site_dir(output.path(), &seed).join("index.html");
    assert_eq!(
        std::fs::read_to_string(&saved).expect("index.html missing"),
        "<html><body>Home</body></html>"
    );
}

#[tokio::test]
async fn test_output_directory_is_created() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let root = output.path().join("does/not/exist/yet");
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", "<html></html>", 1).await;

    let mut grabber = Grabber::new();
    let mut events = grabber.start(create_test_config(&seed, &root, 0)).unwrap();
    assert!(root.is_dir());

    collect_events(&mut events).await;
    assert!(site_dir(&root, &seed).join("index.html").is_file());
}

#[tokio::test]
async fn test_assets_are_mirrored() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<html><head>
            <link rel="stylesheet" href="/css/site.css">
            <link rel="icon" href="/favicon.ico">
            <script src="/js/app.js"></script>
        </head><body>
            <img src="/img/photo.png">
            <a href="mailto:owner@example.com">Mail</a>
        </body></html>"#,
        1,
    )
    .await;

    // Non-HTML assets are never parsed for links
    Mock::given(method("GET"))
        .and(path("/css/site.css"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                r#"body { background: url("/img/bg.png"); } /* <a href="/hidden">x</a> */"#,
                "text/css",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/js/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("console.log('hi');"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/photo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    let events = collect_events(&mut events).await;
    assert_eq!(events.last(), Some(&StatusEvent::Completed));

    let site = site_dir(output.path(), &seed);
    assert!(site.join("index.html").is_file());
    assert!(site.join("site.css").is_file());
    assert!(site.join("app.js").is_file());
    assert_eq!(
        std::fs::read(site.join("photo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
}

#[tokio::test]
async fn test_extensionless_asset_falls_back_to_html() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<html><body><img src="/img/logo"></body></html>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/img/logo"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xd8, 0xff]))
        .expect(1)
        .mount(&server)
        .await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    collect_events(&mut events).await;

    let site = site_dir(output.path(), &seed);
    assert_eq!(
        std::fs::read(site.join("logo.html")).expect("logo.html missing"),
        vec![0xff, 0xd8, 0xff]
    );
}

#[tokio::test]
async fn test_extensionless_page_is_parsed_whatever_its_type() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<html><body><a href="/gallery">G</a></body></html>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/gallery"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/next">Next</a></body></html>"#,
            "image/png",
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/next", "<html></html>", 1).await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    let events = collect_events(&mut events).await;

    let site = site_dir(output.path(), &seed);
    assert!(site.join("gallery.html").is_file());
    assert!(progress_lines(&events).contains(&format!("Grabbed: {}/next", server.uri())));
    assert_eq!(events.last(), Some(&StatusEvent::Completed));
}

#[tokio::test]
async fn test_failed_fetch_reports_and_continues() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/missing">Gone</a><a href="/ok">Ok</a></body></html>"#,
        1,
    )
    .await;
    mount_page(&server, "/ok", "<html><body>Fine</body></html>", 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    let events = collect_events(&mut events).await;

    let lines = progress_lines(&events);
    assert!(lines.contains(&format!(
        "Failed to grab {}/missing: HTTP 404 Not Found",
        server.uri()
    )));
    assert!(lines.contains(&format!("Grabbed: {}/ok", server.uri())));
    assert_eq!(events.last(), Some(&StatusEvent::Completed));
    assert_eq!(grabber.wait().await, CrawlState::Completed);

    let stats = grabber.statistics().unwrap();
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(stats.pages_grabbed, 2);
}

#[tokio::test]
async fn test_failed_seed_completes() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    let events = collect_events(&mut events).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        StatusEvent::Progress(line) if line.starts_with("Failed to grab")
    ));
    assert_eq!(events[1], StatusEvent::Completed);
}

#[tokio::test]
async fn test_self_links_fetch_once() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(
        &server,
        "/",
        r##"<html><body>
            <a href="/">Home</a>
            <a href="#top">Top</a>
            <a href="./">Here</a>
            <a href="/page">Page</a>
        </body></html>"##,
        1,
    )
    .await;
    mount_page(
        &server,
        "/page",
        r#"<html><body><a href="/">Home</a><a href="/page">Self</a></body></html>"#,
        1,
    )
    .await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 5))
        .unwrap();
    let events = collect_events(&mut events).await;

    assert_eq!(progress_lines(&events).len(), 2);
    assert_eq!(events.last(), Some(&StatusEvent::Completed));
}

#[tokio::test]
async fn test_stop_mid_run() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    let links: String = (0..8)
        .map(|i| format!(r#"<a href="/slow{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links), 1).await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&seed, output.path(), 3);
    config.max_concurrent_fetches = 2;

    let mut grabber = Grabber::new();
    let mut events = grabber.start(config).unwrap();

    // Wait for the seed, then let the slow pages get in flight
    let first = events.recv().await.unwrap();
    assert_eq!(first, StatusEvent::Progress(format!("Grabbed: {}/", server.uri())));
    tokio::time::sleep(Duration::from_millis(200)).await;

    grabber.stop().await;
    assert_eq!(grabber.state(), CrawlState::Stopped);
    assert_eq!(grabber.active_tasks(), 0);

    let rest = collect_events(&mut events).await;
    assert_eq!(rest, vec![StatusEvent::Stopped]);

    // Seed plus at most one worker pool's worth of slow pages
    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() <= 3, "got {} requests", requests.len());

    // A second stop changes nothing
    grabber.stop().await;
    assert_eq!(grabber.state(), CrawlState::Stopped);
}

#[tokio::test]
async fn test_stop_after_completion_keeps_state() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", "<html></html>", 1).await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();
    collect_events(&mut events).await;

    grabber.stop().await;
    assert_eq!(grabber.state(), CrawlState::Completed);
}

#[tokio::test]
async fn test_start_while_running_is_rejected() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let mut grabber = Grabber::new();
    let _events = grabber
        .start(create_test_config(&seed, output.path(), 3))
        .unwrap();

    let second = grabber.start(create_test_config(&seed, output.path(), 3));
    assert!(matches!(second, Err(GrabError::AlreadyRunning)));

    grabber.stop().await;
    assert_eq!(grabber.state(), CrawlState::Stopped);
}

#[tokio::test]
async fn test_new_run_after_completion_starts_fresh() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", "<html></html>", 2).await;

    let mut grabber = Grabber::new();
    for _ in 0..2 {
        let mut events = grabber
            .start(create_test_config(&seed, output.path(), 3))
            .unwrap();
        let events = collect_events(&mut events).await;
        assert_eq!(events.last(), Some(&StatusEvent::Completed));
    }
}

#[tokio::test]
async fn test_worker_pool_is_bounded() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    let links: String = (0..6)
        .map(|i| format!(r#"<a href="/item{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &format!("<html><body>{}</body></html>", links), 1).await;
    Mock::given(method("GET"))
        .respond_with(html("<html></html>").set_delay(Duration::from_millis(300)))
        .expect(6)
        .mount(&server)
        .await;

    let mut config = create_test_config(&seed, output.path(), 1);
    config.max_concurrent_fetches = 2;

    let started = Instant::now();
    let mut grabber = Grabber::new();
    let mut events = grabber.start(config).unwrap();
    let events = collect_events(&mut events).await;

    // Six delayed pages through two workers need at least three rounds
    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(progress_lines(&events).len(), 7);
    assert_eq!(events.last(), Some(&StatusEvent::Completed));
}

/// Storage that refuses every write
struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn save(
        &self,
        _url: &url::Url,
        _content: &[u8],
        _extension: &str,
        _site: Option<&SiteIdentity>,
    ) -> Result<PathBuf, StorageError> {
        Err(StorageError::Write {
            path: PathBuf::from("/read-only/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

#[tokio::test]
async fn test_storage_failure_fails_run() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", r#"<html><body><a href="/next">Next</a></body></html>"#, 1).await;
    mount_page(&server, "/next", "<html></html>", 0).await;

    let mut grabber = Grabber::new();
    let mut events = grabber
        .start_with_storage(
            create_test_config(&seed, output.path(), 3),
            Arc::new(ReadOnlyStorage),
        )
        .unwrap();
    let events = collect_events(&mut events).await;

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        StatusEvent::Progress(format!(
            "Failed to save {}/: Failed to write /read-only/index.html: read-only",
            server.uri()
        ))
    );
    assert_eq!(
        events[1],
        StatusEvent::Failed(
            "Storage error: Failed to write /read-only/index.html: read-only".to_string()
        )
    );
    assert_eq!(grabber.wait().await, CrawlState::Failed);
}

#[tokio::test]
async fn test_unwritable_output_root_is_rejected() {
    let output = TempDir::new().unwrap();
    let blocker = output.path().join("file");
    std::fs::write(&blocker, b"in the way").unwrap();

    let mut grabber = Grabber::new();
    let result = grabber.start(create_test_config("http://127.0.0.1:9/", &blocker, 3));

    assert!(matches!(result, Err(GrabError::Io(_))));
    assert_eq!(grabber.state(), CrawlState::Idle);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected_before_network() {
    assert!(matches!(
        CrawlConfig::new("", "out"),
        Err(GrabError::InvalidSeed(_))
    ));
    assert!(matches!(
        CrawlConfig::new("not a url", "out"),
        Err(GrabError::InvalidSeed(_))
    ));
    assert!(matches!(
        CrawlConfig::new("javascript:alert(1)", "out"),
        Err(GrabError::InvalidSeed(_))
    ));
}
