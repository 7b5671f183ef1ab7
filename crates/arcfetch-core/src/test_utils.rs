//! Test utilities for archive creation and fake transfers.
//!
//! This module provides in-memory archive builders, a [`Transport`] that
//! serves canned responses, and progress callbacks that record what they
//! see.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use flate2::Compression;
use flate2::write::GzEncoder;
use tokio_util::sync::CancellationToken;

use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;
use crate::TransferProgress;
use crate::fetch::TransferResponse;
use crate::fetch::Transport;

/// Compresses `data` with gzip.
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Creates an in-memory TAR archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are created with mode 0o644.
///
/// # Examples
///
/// ```
/// use arcfetch_core::test_utils::create_test_tar;
///
/// let tar_data = create_test_tar(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_tar(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(TarTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Creates an in-memory gzip-compressed TAR archive.
#[must_use]
pub fn create_test_tar_gz(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    gzip(&create_test_tar(entries))
}

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed
/// with mode 0o644.
#[must_use]
pub fn create_test_zip(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(ZipTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Builder for TAR test archives with various entry types.
///
/// # Examples
///
/// ```
/// use arcfetch_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .add_raw_file("../escape.txt", b"evil")
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    /// Adds a regular file to the archive.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file whose name is stored verbatim.
    ///
    /// Unlike [`add_file`](Self::add_file), the name is not checked by the
    /// tar writer, so it may contain `..` or be absolute.
    #[must_use]
    pub fn add_raw_file(mut self, path: &str, data: &[u8]) -> Self {
        let mut header = tar::Header::new_gnu();
        let name = &mut header.as_old_mut().name;
        name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Adds a directory to the archive.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o755);
        header.set_entry_type(tar::EntryType::Directory);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        self.add_link(tar::EntryType::Symlink, path, target)
    }

    /// Adds a hardlink to the archive.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        self.add_link(tar::EntryType::Link, path, target)
    }

    /// Adds a FIFO entry to the archive.
    #[must_use]
    pub fn add_fifo(mut self, path: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Fifo);
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Adds a pax global extended header carrying one `key=value` record,
    /// as `git archive` writes at the start of every tarball.
    #[must_use]
    pub fn add_pax_global_header(mut self, key: &str, value: &str) -> Self {
        let tail = format!(" {key}={value}\n");
        let mut len = tail.len() + tail.len().to_string().len();
        len = tail.len() + len.to_string().len();
        let record = format!("{len}{tail}");

        let mut header = tar::Header::new_ustar();
        header.set_size(record.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::XGlobalHeader);
        header.set_cksum();
        self.builder
            .append_data(&mut header, "pax_global_header", record.as_bytes())
            .unwrap();
        self
    }

    fn add_link(mut self, kind: tar::EntryType, path: &str, target: &str) -> Self {
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o777);
        header.set_entry_type(kind);
        header.set_link_name(target).unwrap();
        header.set_cksum();
        self.builder
            .append_data(&mut header, path, std::io::empty())
            .unwrap();
        self
    }

    /// Builds and returns the TAR archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ZIP test archives with various entry types.
///
/// # Examples
///
/// ```
/// use arcfetch_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("file.txt", b"content")
///     .add_directory("dir/")
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a regular file to the archive. The name is stored verbatim.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory to the archive.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        use zip::write::SimpleFileOptions;

        self.zip
            .add_symlink(path, target, SimpleFileOptions::default())
            .unwrap();
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A reader that fails on every read, standing in for a dropped connection.
#[derive(Debug, Default)]
pub struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ))
    }
}

/// A reader that blocks for a fixed time and then reports end of input.
#[derive(Debug, Clone, Copy)]
pub struct StallingReader(pub Duration);

impl Read for StallingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        std::thread::sleep(self.0);
        Ok(0)
    }
}

/// A [`Transport`] that serves one canned response for every URL.
#[derive(Debug, Clone)]
pub struct StaticTransport {
    status: u16,
    content_type: Option<String>,
    content_length: Option<u64>,
    body: Vec<u8>,
    truncate_after: Option<usize>,
    stall_after: Option<(usize, Duration)>,
    reachable: bool,
}

impl StaticTransport {
    /// Serves `body` with status 200, the given content type and an exact
    /// `Content-Length`.
    #[must_use]
    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            content_length: Some(body.len() as u64),
            body,
            truncate_after: None,
            stall_after: None,
            reachable: true,
        }
    }

    /// Fails every request as if the host could not be reached.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::ok("application/octet-stream", Vec::new())
        }
    }

    /// Sets the status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets the declared `Content-Length`.
    #[must_use]
    pub const fn with_content_length(mut self, content_length: Option<u64>) -> Self {
        self.content_length = content_length;
        self
    }

    /// Omits the `Content-Length` header.
    #[must_use]
    pub const fn without_content_length(self) -> Self {
        self.with_content_length(None)
    }

    /// Omits the `Content-Type` header.
    #[must_use]
    pub fn without_content_type(mut self) -> Self {
        self.content_type = None;
        self
    }

    /// Drops the connection after `bytes` bytes of the body.
    #[must_use]
    pub const fn truncated_after(mut self, bytes: usize) -> Self {
        self.truncate_after = Some(bytes);
        self
    }

    /// Stops sending for `stall` after `bytes` bytes of the body, as a
    /// server that hangs mid-transfer would.
    #[must_use]
    pub const fn stalled_after(mut self, bytes: usize, stall: Duration) -> Self {
        self.stall_after = Some((bytes, stall));
        self
    }
}

impl Transport for StaticTransport {
    fn get(&self, url: &str) -> Result<TransferResponse> {
        if !self.reachable {
            return Err(FetchError::network(url, "connection refused"));
        }
        let head = |limit: usize| Cursor::new(self.body[..limit.min(self.body.len())].to_vec());
        let body: Box<dyn Read + Send> = match (self.truncate_after, self.stall_after) {
            (Some(limit), _) => Box::new(head(limit).chain(FailingReader)),
            (None, Some((limit, stall))) => Box::new(head(limit).chain(StallingReader(stall))),
            (None, None) => Box::new(Cursor::new(self.body.clone())),
        };
        Ok(TransferResponse {
            status: self.status,
            content_type: self.content_type.clone(),
            content_length: self.content_length,
            body,
        })
    }
}

/// A [`ProgressCallback`] that records every call.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    /// Argument of `on_transfer_start`, once called.
    pub transfer_started: Option<Option<u64>>,
    /// Every chunk snapshot in delivery order.
    pub chunks: Vec<TransferProgress>,
    /// Every extracted entry in extraction order.
    pub entries: Vec<PathBuf>,
    /// Whether `on_complete` was called.
    pub completed: bool,
}

impl ProgressCallback for RecordingProgress {
    fn on_transfer_start(&mut self, total_bytes: Option<u64>) {
        self.transfer_started = Some(total_bytes);
    }

    fn on_chunk(&mut self, progress: &TransferProgress) {
        self.chunks.push(*progress);
    }

    fn on_entry_extracted(&mut self, path: &Path) {
        self.entries.push(path.to_path_buf());
    }

    fn on_complete(&mut self) {
        self.completed = true;
    }
}

/// A [`ProgressCallback`] that cancels a token after a number of chunks.
#[derive(Debug)]
pub struct CancellingProgress {
    token: CancellationToken,
    after_chunks: usize,
    chunks_seen: usize,
}

impl CancellingProgress {
    /// Cancels `token` once `after_chunks` chunks have been reported.
    #[must_use]
    pub const fn new(token: CancellationToken, after_chunks: usize) -> Self {
        Self {
            token,
            after_chunks,
            chunks_seen: 0,
        }
    }

    /// Returns how many chunks were reported.
    #[must_use]
    pub const fn chunks_seen(&self) -> usize {
        self.chunks_seen
    }
}

impl ProgressCallback for CancellingProgress {
    fn on_transfer_start(&mut self, _total_bytes: Option<u64>) {}

    fn on_chunk(&mut self, _progress: &TransferProgress) {
        self.chunks_seen += 1;
        if self.chunks_seen >= self.after_chunks {
            self.token.cancel();
        }
    }

    fn on_entry_extracted(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_tar() {
        let tar_data = create_test_tar(vec![("file.txt", b"hello")]);
        assert!(!tar_data.is_empty());
    }

    #[test]
    fn test_create_test_zip() {
        let zip_data = create_test_zip(vec![("file.txt", b"hello")]);
        assert!(!zip_data.is_empty());
    }

    #[test]
    fn test_raw_tar_name_preserved() {
        let data = TarTestBuilder::new().add_raw_file("../x.txt", b"x").build();
        let mut archive = tar::Archive::new(Cursor::new(data));
        let mut entries = archive.entries().unwrap();
        let entry = entries.next().unwrap().unwrap();
        assert_eq!(entry.path().unwrap(), Path::new("../x.txt"));
    }

    #[test]
    fn test_gzip_magic() {
        assert_eq!(&gzip(b"payload")[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_static_transport_truncation() {
        let transport = StaticTransport::ok("application/zip", vec![1u8; 10]).truncated_after(4);
        let mut response = transport.get("http://t").unwrap();
        let mut buf = Vec::new();
        assert!(response.body.read_to_end(&mut buf).is_err());
        assert_eq!(buf, vec![1u8; 4]);
    }
}
