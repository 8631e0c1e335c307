//! Latest-release asset resolution
//!
//! Queries the hosting API's "latest release" endpoint for a repository and
//! picks one asset from it, either by a regular expression searched in the
//! asset name or by a platform hint in the download URL.
//!
//! ```no_run
//! use toolkit_layout::release::{ReleaseQuery, Resolver};
//!
//! let query = ReleaseQuery::new("jpillora/chisel", r"linux_amd64\.gz$")?;
//! let asset = Resolver::github().resolve(&query)?;
//! println!("{}", asset.browser_download_url);
//! # Ok::<(), toolkit_layout::ReleaseError>(())
//! ```

mod download;
pub mod http;

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::error::ReleaseError;
use crate::core::output;

/// Substrings that mark an asset URL as a Linux/amd64 build.
pub const PLATFORM_HINTS: [&str; 2] = ["linux", "amd64"];

/// A single downloadable file attached to a release.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// The parts of the latest-release metadata we read.
#[derive(Deserialize, Debug, Clone)]
pub struct Release {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// How an asset is chosen from a release.
#[derive(Debug, Clone)]
pub enum AssetSelector {
    /// First asset whose name contains a match for the expression.
    Pattern(Regex),
    /// First asset whose download URL mentions one of [`PLATFORM_HINTS`].
    PlatformHint,
}

impl AssetSelector {
    /// Compile a name pattern. Matching is a search, not a full match.
    pub fn pattern(pattern: &str) -> Result<Self, ReleaseError> {
        Regex::new(pattern)
            .map(AssetSelector::Pattern)
            .map_err(|source| ReleaseError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, asset: &ReleaseAsset) -> bool {
        match self {
            AssetSelector::Pattern(re) => re.is_match(&asset.name),
            AssetSelector::PlatformHint => {
                let url = asset.browser_download_url.to_lowercase();
                PLATFORM_HINTS.iter().any(|hint| url.contains(hint))
            }
        }
    }

    /// Pick the first matching asset, in API order.
    pub fn select<'a>(&self, assets: &'a [ReleaseAsset]) -> Option<&'a ReleaseAsset> {
        assets.iter().find(|asset| self.matches(asset))
    }
}

impl fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSelector::Pattern(re) => f.write_str(re.as_str()),
            AssetSelector::PlatformHint => f.write_str(&PLATFORM_HINTS.join("|")),
        }
    }
}

/// A repository plus the rule for choosing one of its assets.
#[derive(Debug, Clone)]
pub struct ReleaseQuery {
    pub repository: String,
    pub selector: AssetSelector,
}

impl ReleaseQuery {
    /// Query by name pattern. `repository` may be `owner/repo` or a repository URL.
    pub fn new(repository: &str, pattern: &str) -> Result<Self, ReleaseError> {
        Ok(Self {
            repository: normalize_repository(repository)?,
            selector: AssetSelector::pattern(pattern)?,
        })
    }

    /// Query for the first Linux/amd64-looking asset.
    pub fn platform(repository: &str) -> Result<Self, ReleaseError> {
        Ok(Self {
            repository: normalize_repository(repository)?,
            selector: AssetSelector::PlatformHint,
        })
    }
}

/// Normalize `owner/repo`, `https://github.com/owner/repo`,
/// `https://github.com/owner/repo.git` or `github.com/owner/repo` to `owner/repo`.
pub fn normalize_repository(input: &str) -> Result<String, ReleaseError> {
    let trimmed = input.trim();
    let path = match trimmed.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => strip_host(trimmed),
    };
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        [owner, repo] if is_segment(owner) && is_segment(repo) => Ok(format!("{}/{}", owner, repo)),
        _ => Err(ReleaseError::InvalidRepository(input.to_string())),
    }
}

/// Drop a leading `host.tld/` when it is followed by at least two segments.
fn strip_host(path: &str) -> &str {
    match path.split_once('/') {
        Some((host, rest)) if host.contains('.') && rest.trim_matches('/').contains('/') => rest,
        _ => path,
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Client for the latest-release endpoint.
///
/// Stateless: every call issues exactly one metadata request, with no retries.
#[derive(Debug, Clone)]
pub struct Resolver {
    api_base: String,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::github()
    }
}

impl Resolver {
    /// Resolver against the public GitHub API.
    pub fn github() -> Self {
        Self::with_base(http::GITHUB_API_BASE)
    }

    /// Resolver against another API base (GitHub Enterprise, test servers).
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Fetch the latest-release metadata for `owner/repo`.
    pub fn latest_release(&self, repo: &str) -> Result<Release, ReleaseError> {
        let url = http::latest_release_url(&self.api_base, repo);
        let response = http::api_request(&url)
            .call()
            .map_err(|e| http::classify_error(e, &url, repo))?;

        response
            .into_json::<Release>()
            .map_err(|source| ReleaseError::Decode {
                repo: repo.to_string(),
                source,
            })
    }

    /// Resolve the asset a query selects.
    pub fn resolve(&self, query: &ReleaseQuery) -> Result<ReleaseAsset, ReleaseError> {
        let release = self.latest_release(&query.repository)?;
        if release.assets.is_empty() {
            return Err(ReleaseError::NoAssets(query.repository.clone()));
        }

        query
            .selector
            .select(&release.assets)
            .cloned()
            .ok_or_else(|| ReleaseError::NoMatch {
                repo: query.repository.clone(),
                selector: query.selector.to_string(),
            })
    }

    /// Resolve and report: the download URL, or `None` after printing why not.
    pub fn resolve_url(&self, query: &ReleaseQuery) -> Option<String> {
        match self.resolve(query) {
            Ok(asset) => Some(asset.browser_download_url),
            Err(e) => {
                output::error(&e.to_string());
                None
            }
        }
    }

    /// Resolve, then stream the asset into `dest_dir` (created if missing).
    ///
    /// Returns the local path of the downloaded file.
    pub fn download(&self, query: &ReleaseQuery, dest_dir: &Path) -> Result<PathBuf, ReleaseError> {
        std::fs::create_dir_all(dest_dir).map_err(|source| ReleaseError::Io {
            path: dest_dir.to_path_buf(),
            source,
        })?;

        let asset = self.resolve(query)?;
        output::detail(&format!("downloading {} from {}", asset.name, query.repository));

        let dest = download::asset_path(dest_dir, &asset)?;
        let bytes = download::stream_to_file(&asset.browser_download_url, &dest)?;
        output::detail(&format!("downloaded {} ({} bytes)", asset.name, bytes));
        Ok(dest)
    }
}
