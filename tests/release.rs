//! Integration tests for latest-release resolution
//!
//! A wiremock server stands in for the hosting API.

use serde_json::json;
use tempfile::TempDir;
use toolkit_layout::{ReleaseError, ReleaseQuery, Resolver};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LATEST: &str = "/repos/owner/repo/releases/latest";

async fn mock_release(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

async fn mock_status(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn query(pattern: &str) -> ReleaseQuery {
    ReleaseQuery::new("owner/repo", pattern).unwrap()
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn test_single_matching_asset_url_returned() {
    let server = mock_release(json!({
        "tag_name": "v1.0.0",
        "assets": [{
            "name": "tool-linux-amd64.tar.gz",
            "browser_download_url": "https://example.com/tool-linux-amd64.tar.gz"
        }]
    }))
    .await;

    let asset = Resolver::with_base(server.uri()).resolve(&query("linux")).unwrap();
    assert_eq!(asset.name, "tool-linux-amd64.tar.gz");
    assert_eq!(asset.browser_download_url, "https://example.com/tool-linux-amd64.tar.gz");
}

#[tokio::test]
async fn test_first_match_in_api_order_wins() {
    let server = mock_release(json!({
        "assets": [
            {"name": "tool-darwin-amd64.zip", "browser_download_url": "https://example.com/1"},
            {"name": "tool-linux-arm64.tar.gz", "browser_download_url": "https://example.com/2"},
            {"name": "tool-linux-amd64.tar.gz", "browser_download_url": "https://example.com/3"}
        ]
    }))
    .await;

    let url = Resolver::with_base(server.uri()).resolve_url(&query("linux"));
    assert_eq!(url.as_deref(), Some("https://example.com/2"));
}

#[tokio::test]
async fn test_no_matching_asset() {
    let server = mock_release(json!({
        "assets": [
            {"name": "tool-linux-amd64.tar.gz", "browser_download_url": "https://example.com/1"},
            {"name": "tool.deb.sha256", "browser_download_url": "https://example.com/2"}
        ]
    }))
    .await;

    let resolver = Resolver::with_base(server.uri());
    let err = resolver.resolve(&query(r".*\.deb$")).unwrap_err();
    assert!(matches!(err, ReleaseError::NoMatch { .. }));
    assert!(err.to_string().contains("owner/repo"));
    assert!(err.to_string().contains(r".*\.deb$"));

    assert_eq!(resolver.resolve_url(&query(r".*\.deb$")), None);
}

#[tokio::test]
async fn test_release_without_assets() {
    let server = mock_release(json!({"tag_name": "v2.0", "assets": []})).await;

    let err = Resolver::with_base(server.uri()).resolve(&query("linux")).unwrap_err();
    assert!(matches!(err, ReleaseError::NoAssets(ref repo) if repo == "owner/repo"));
}

#[tokio::test]
async fn test_repository_url_is_normalized_for_request() {
    let server = mock_release(json!({
        "assets": [{"name": "a-linux", "browser_download_url": "https://example.com/a"}]
    }))
    .await;

    let query = ReleaseQuery::new("https://github.com/owner/repo.git", "linux").unwrap();
    let asset = Resolver::with_base(server.uri()).resolve(&query).unwrap();
    assert_eq!(asset.name, "a-linux");
}

#[tokio::test]
async fn test_api_headers_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .and(header("Accept", "application/vnd.github+json"))
        .and(header("User-Agent", "toolkit-layout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [{"name": "x-linux", "browser_download_url": "https://example.com/x"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(Resolver::with_base(server.uri()).resolve(&query("linux")).is_ok());
}

// =============================================================================
// Remote failures
// =============================================================================

#[tokio::test]
async fn test_404_is_repository_not_found() {
    let server = mock_status(404).await;
    let err = Resolver::with_base(server.uri()).resolve(&query("x")).unwrap_err();
    assert!(matches!(err, ReleaseError::RepositoryNotFound(_)));
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_403_is_rate_limited() {
    let server = mock_status(403).await;
    let err = Resolver::with_base(server.uri()).resolve(&query("x")).unwrap_err();
    assert!(matches!(err, ReleaseError::RateLimited { .. }));
    assert!(err.to_string().contains("rate limit"));
}

#[tokio::test]
async fn test_server_error_is_status() {
    let server = mock_status(502).await;
    let err = Resolver::with_base(server.uri()).resolve(&query("x")).unwrap_err();
    assert!(matches!(err, ReleaseError::Status { status: 502, .. }));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = Resolver::with_base(server.uri()).resolve(&query("x")).unwrap_err();
    assert!(matches!(err, ReleaseError::Decode { .. }));
}

#[test]
fn test_unreachable_api_is_transport_error() {
    // Port 9 (discard) on localhost is not expected to run an HTTP server.
    let err = Resolver::with_base("http://127.0.0.1:9")
        .resolve(&query("x"))
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Transport { .. }));
}

#[tokio::test]
async fn test_no_retry_after_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    assert!(Resolver::with_base(server.uri()).resolve(&query("x")).is_err());
}

// =============================================================================
// Download
// =============================================================================

#[tokio::test]
async fn test_download_platform_asset_streams_to_disk() {
    let server = MockServer::start().await;
    let body = vec![0xABu8; 20_000];

    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [
                {"name": "tool-darwin.zip", "browser_download_url": format!("{}/dl/tool-darwin.zip", server.uri())},
                {"name": "tool_amd64.tar.gz", "browser_download_url": format!("{}/dl/tool_AMD64.tar.gz", server.uri())}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/tool_AMD64.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest_dir = dir.path().join("bin/nested");
    let query = ReleaseQuery::platform("owner/repo").unwrap();

    let path = Resolver::with_base(server.uri()).download(&query, &dest_dir).unwrap();

    assert_eq!(path, dest_dir.join("tool_amd64.tar.gz"));
    assert_eq!(std::fs::read(&path).unwrap(), body);
}

#[tokio::test]
async fn test_download_by_pattern() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [
                {"name": "chisel_linux_arm64.gz", "browser_download_url": format!("{}/dl/arm64", server.uri())},
                {"name": "chisel_linux_amd64.gz", "browser_download_url": format!("{}/dl/amd64", server.uri())}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/amd64"))
        .respond_with(ResponseTemplate::new(200).set_body_string("amd64 build"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let path = Resolver::with_base(server.uri())
        .download(&query("amd64"), dir.path())
        .unwrap();

    assert_eq!(std::fs::read_to_string(path).unwrap(), "amd64 build");
}

#[tokio::test]
async fn test_download_without_platform_asset_fails_but_creates_dir() {
    let server = mock_release(json!({
        "assets": [{"name": "tool.exe", "browser_download_url": "https://example.com/windows/tool.exe"}]
    }))
    .await;

    let dir = TempDir::new().unwrap();
    let dest_dir = dir.path().join("out");
    let query = ReleaseQuery::platform("owner/repo").unwrap();

    let err = Resolver::with_base(server.uri()).download(&query, &dest_dir).unwrap_err();
    assert!(matches!(err, ReleaseError::NoMatch { .. }));
    assert!(dest_dir.is_dir());
    assert_eq!(std::fs::read_dir(&dest_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_body_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "assets": [{"name": "t-linux", "browser_download_url": format!("{}/dl/gone", server.uri())}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = Resolver::with_base(server.uri())
        .download(&query("linux"), dir.path())
        .unwrap_err();
    assert!(matches!(err, ReleaseError::Status { status: 410, .. }));
}
