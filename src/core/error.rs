//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or downloading a release asset.
///
/// Every variant maps to "not found" for the caller; none of them is retried.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("invalid repository identifier: '{0}' (expected owner/repo or a repository URL)")]
    InvalidRepository(String),

    #[error("invalid asset pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("API rate limit exceeded for {repo}. Try again later or set GITHUB_TOKEN.")]
    RateLimited { repo: String },

    #[error("repository '{0}' not found or has no published release")]
    RepositoryNotFound(String),

    #[error("request for {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("request for {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("failed to parse release metadata for {repo}: {source}")]
    Decode {
        repo: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no assets found in latest release of {0}")]
    NoAssets(String),

    #[error("no asset matching '{selector}' found in {repo}")]
    NoMatch { repo: String, selector: String },

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors from splitting a manifest.
///
/// Per-line problems are never errors; they are reported as warnings.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("input file '{0}' does not exist")]
    MissingInput(PathBuf),

    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keyword table '{path}': {message}")]
    InvalidTable { path: PathBuf, message: String },
}
