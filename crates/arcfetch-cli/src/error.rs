//! Error conversion utilities for CLI.
//!
//! Converts arcfetch-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use arcfetch_core::FetchError;

/// Converts `FetchError` to user-friendly anyhow error with context
pub fn convert_fetch_error(err: FetchError, url: &str) -> anyhow::Error {
    match err {
        FetchError::Transfer { status, .. } => {
            anyhow!(
                "Download of '{url}' failed with HTTP status {status}\n\
                 HINT: Check that the URL is correct and the file is still published."
            )
        }
        FetchError::Network { reason, .. } => {
            anyhow!(
                "Network error while downloading '{url}': {reason}\n\
                 HINT: Check your connection, or raise --timeout / --connect-timeout for slow servers."
            )
        }
        FetchError::UnsupportedFormat { content_type } => {
            anyhow!(
                "Archive format not supported: '{url}' was served as {}\n\
                 HINT: Supported content types: application/x-gzip (tar.gz), application/zip",
                content_type.as_deref().unwrap_or("<no content type>")
            )
        }
        FetchError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive from '{url}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Nothing was written to the output directory.",
                path.display()
            )
        }
        FetchError::InvalidArchive { .. } => {
            anyhow!(
                "Invalid archive downloaded from '{url}': {err}\n\
                 HINT: The archive may be corrupted or the server mislabeled its content type."
            )
        }
        FetchError::Io(io_err) => {
            anyhow!("I/O error while processing '{url}': {io_err}")
        }
        FetchError::Cancelled => anyhow!("Download of '{url}' was cancelled"),
    }
}

/// Adds context to a fetch result
pub fn add_fetch_context<T>(result: Result<T, FetchError>, url: &str) -> anyhow::Result<T> {
    result.map_err(|e| convert_fetch_error(e, url))
}
