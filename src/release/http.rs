//! Request construction for the hosting API
//!
//! ## Authentication
//!
//! Set `GITHUB_TOKEN` to send an authenticated request (higher rate limits,
//! access to private repositories):
//! ```bash
//! export GITHUB_TOKEN="ghp_xxxxxxxxxxxxxxxxxxxx"
//! ```

use std::sync::OnceLock;
use std::time::Duration;

use crate::core::error::ReleaseError;

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Timeout for streaming an asset body
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Default API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = "toolkit-layout";

/// Get HTTP timeout from `TOOLKIT_HTTP_TIMEOUT` or use the default.
/// Read once and cached.
pub fn http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("TOOLKIT_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Duration::from_secs(clamp_timeout(secs))
    })
}

fn clamp_timeout(secs: u64) -> u64 {
    secs.clamp(5, 300)
}

/// Get the API token from the environment, if set and non-empty.
fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Build the "latest release" metadata URL for `owner/repo`.
pub fn latest_release_url(api_base: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/releases/latest",
        api_base.trim_end_matches('/'),
        repo
    )
}

/// Create an API request with the standard headers and optional auth.
pub fn api_request(url: &str) -> ureq::Request {
    let request = ureq::get(url)
        .timeout(http_timeout())
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", USER_AGENT);

    authorize(request, github_token())
}

/// Create a plain GET for an asset body.
pub fn download_request(url: &str) -> ureq::Request {
    ureq::get(url)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .set("User-Agent", USER_AGENT)
}

fn authorize(request: ureq::Request, token: Option<String>) -> ureq::Request {
    match token {
        Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
        None => request,
    }
}

/// Map a failed call to a typed error.
///
/// 403 is reported as rate limiting and 404 as a missing repository or release,
/// since that is what the API means by them on this endpoint.
pub fn classify_error(err: ureq::Error, url: &str, repo: &str) -> ReleaseError {
    match err {
        ureq::Error::Status(403, _) => ReleaseError::RateLimited {
            repo: repo.to_string(),
        },
        ureq::Error::Status(404, _) => ReleaseError::RepositoryNotFound(repo.to_string()),
        ureq::Error::Status(status, _) => ReleaseError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(t) => ReleaseError::Transport {
            url: url.to_string(),
            message: t.to_string(),
        },
    }
}
