//! Helpers for laying out a security toolkit on disk
//!
//! Two independent pieces:
//!
//! - [`release`]: find the download URL of an asset in a repository's latest
//!   release, optionally streaming it to disk.
//! - [`split`]: split a flat tool manifest into one file per category.
//!
//! # Manifest format
//!
//! ```text
//! # Privilege Escalation
//! LinPEAS https://github.com/peass-ng/PEASS-ng/releases/latest/download/linpeas.sh
//! git:LinEnum https://github.com/rebootuser/LinEnum privesc/LinEnum
//!
//! # Tunneling
//! chisel https://github.com/jpillora/chisel/releases/download/v1.9.1/chisel_1.9.1_linux_amd64.gz
//! ```
//!
//! Each record is `name url [dest_subfolder]`. A `git:` prefix on the name
//! marks a repository to clone; it is ignored for categorization and for the
//! default destination subfolder.
//!
//! # Environment
//!
//! - `GITHUB_TOKEN`: sent as a bearer token on API requests when set
//! - `TOOLKIT_HTTP_TIMEOUT`: API request timeout in seconds (default 10, 5..=300)
//! - `GITHUB_API_URL`: API base URL used by the `download_release` binary

pub mod core;
pub mod release;
pub mod split;

pub use crate::core::error::{ReleaseError, SplitError};
pub use crate::core::output;
pub use release::{AssetSelector, ReleaseAsset, ReleaseQuery, Resolver};
pub use split::{KeywordTable, SplitOptions, SplitReport, Strategy, ToolEntry, WriteMode};
