//! Streamed asset download
//!
//! Reads the response body in fixed 8 KiB chunks and writes each one as it
//! arrives, so large assets never sit in memory.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use super::{ReleaseAsset, http};
use crate::core::error::ReleaseError;
use crate::core::output::{self, ProgressGuard};

/// Read chunk size for asset bodies
pub const CHUNK_SIZE: usize = 8192;

/// Local path for an asset inside `dest_dir`.
///
/// The asset name comes from the remote side, so anything that is not a plain
/// file name is refused.
pub fn asset_path(dest_dir: &Path, asset: &ReleaseAsset) -> Result<PathBuf, ReleaseError> {
    let name = asset.name.as_str();
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');

    if !plain {
        return Err(ReleaseError::Io {
            path: dest_dir.join(name),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("refusing unsafe asset name '{}'", name),
            ),
        });
    }
    Ok(dest_dir.join(name))
}

/// GET `url` and write its body to `dest`. Returns the number of bytes written.
pub fn stream_to_file(url: &str, dest: &Path) -> Result<u64, ReleaseError> {
    let filename = dest
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "asset".to_string());

    let pb = output::download_spinner(&format!("downloading {}", filename));
    let _guard = ProgressGuard::new(&pb);

    let response = http::download_request(url).call().map_err(|e| match e {
        ureq::Error::Status(status, _) => ReleaseError::Status {
            url: url.to_string(),
            status,
        },
        ureq::Error::Transport(t) => ReleaseError::Transport {
            url: url.to_string(),
            message: t.to_string(),
        },
    })?;

    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let io_err = |source| ReleaseError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let file = File::create(dest).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    let mut reader = response.into_reader();
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer).map_err(|e| ReleaseError::Transport {
            url: url.to_string(),
            message: format!("read error: {}", e),
        })?;

        if bytes_read == 0 {
            break;
        }

        writer.write_all(&buffer[..bytes_read]).map_err(io_err)?;
        total_bytes += bytes_read as u64;
        pb.set_position(total_bytes);
    }

    writer.flush().map_err(io_err)?;
    Ok(total_bytes)
}
