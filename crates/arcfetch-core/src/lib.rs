//! Streaming archive download with path-traversal-safe extraction.
//!
//! `arcfetch-core` fetches a remote `.tar.gz` or `.zip` archive over HTTP,
//! streams it to a temporary file in bounded chunks, and extracts it into
//! an output directory. The archive format is chosen from the declared
//! `Content-Type`, and every entry path is checked against the output
//! directory before anything is written.
//!
//! # Examples
//!
//! ```no_run
//! use arcfetch_core::Downloader;
//! use arcfetch_core::FetchConfig;
//! use arcfetch_core::NoopProgress;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(FetchConfig::default())?;
//! let report = downloader.download(
//!     "https://example.com/dataset.zip",
//!     Path::new("data"),
//!     &mut NoopProgress,
//! )?;
//! println!(
//!     "Fetched {} bytes, extracted {} files",
//!     report.bytes_downloaded, report.extraction.files_extracted
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod formats;
pub mod io;
pub mod report;
pub mod security;
#[doc(hidden)]
pub mod test_utils;
pub mod types;

// Re-export main API types
pub use config::FetchConfig;
pub use context::FetchContext;
pub use error::FetchError;
pub use error::Result;
pub use fetch::Downloader;
pub use fetch::ReqwestTransport;
pub use fetch::TransferResponse;
pub use fetch::Transport;
pub use formats::ArchiveFormat;
pub use report::ExtractionReport;
pub use report::FetchReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use report::TransferProgress;

// Re-export types module for easier access
pub use types::EntryKind;
pub use types::ExtractionRoot;
pub use types::SafePath;
