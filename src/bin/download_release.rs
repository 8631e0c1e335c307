//! download_release - print (or fetch) an asset from a repository's latest release
//!
//! Usage:
//!   download_release <repo> <pattern>              Print the matching asset URL
//!   download_release <repo> [pattern] -o <dir>     Download the asset into <dir>
//!
//! Without a pattern, download mode picks the first Linux/amd64 asset.
//! Exits 1 with nothing on stdout when no asset can be resolved.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use toolkit_layout::release::http::GITHUB_API_BASE;
use toolkit_layout::{ReleaseQuery, Resolver, output};

#[derive(Parser)]
#[command(name = "download_release")]
#[command(about = "Resolve an asset from the latest release of a repository")]
#[command(version)]
struct Cli {
    /// Repository as owner/repo or https://github.com/owner/repo
    repo: String,

    /// Regular expression searched for in asset names
    #[arg(required_unless_present = "output_dir")]
    pattern: Option<String>,

    /// Download the asset into this directory instead of printing its URL
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_BASE)]
    api_base: String,

    /// Only print the result and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    output::set_quiet(cli.quiet);

    if let Err(e) = run(cli) {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let query = match &cli.pattern {
        Some(pattern) => ReleaseQuery::new(&cli.repo, pattern)?,
        None => ReleaseQuery::platform(&cli.repo)?,
    };
    let resolver = Resolver::with_base(cli.api_base);

    match &cli.output_dir {
        Some(dir) => {
            output::action(&format!("Fetching latest release of {}", query.repository));
            let path = resolver
                .download(&query, dir)
                .with_context(|| format!("Failed to download release asset of {}", query.repository))?;
            println!("{}", path.display());
        }
        None => {
            let asset = resolver.resolve(&query)?;
            output::detail(&format!("matched {}", asset.name));
            println!("{}", asset.browser_download_url);
        }
    }

    Ok(())
}
