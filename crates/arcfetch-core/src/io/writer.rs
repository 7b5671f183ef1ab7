//! Temporary archive materialization.
//!
//! The transfer body is appended to a uniquely named temporary file so the
//! extractor can open it with random access. The file lives exactly as long
//! as the [`ArchiveFile`] handle; dropping the handle removes it.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempPath;
use tracing::debug;

use crate::FetchContext;
use crate::FetchError;
use crate::Result;
use crate::io::ChunkStream;

/// File name prefix shared by every temporary archive.
pub const TEMP_PREFIX: &str = "data";

/// Writes a chunk stream to a temporary archive file.
///
/// # Examples
///
/// ```
/// use arcfetch_core::FetchConfig;
/// use arcfetch_core::FetchContext;
/// use arcfetch_core::NoopProgress;
/// use arcfetch_core::io::ArchiveWriter;
/// use arcfetch_core::io::ChunkStream;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let config = FetchConfig::default();
/// let mut progress = NoopProgress;
/// let mut ctx = FetchContext::new(&config, &mut progress);
///
/// let chunks = ChunkStream::from_chunks(vec![b"ab".to_vec(), b"cd".to_vec()]);
/// let archive = ArchiveWriter::new(dir.path(), ".zip").materialize(chunks, &mut ctx)?;
///
/// assert_eq!(std::fs::read(archive.path())?, b"abcd");
/// archive.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    temp_dir: PathBuf,
    suffix: &'static str,
}

impl ArchiveWriter {
    /// Creates a writer that places archives named `data*<suffix>` in
    /// `temp_dir`.
    #[must_use]
    pub fn new(temp_dir: impl Into<PathBuf>, suffix: &'static str) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            suffix,
        }
    }

    /// Consumes `chunks` in order and persists their concatenation.
    ///
    /// The cancellation token in `ctx` is checked before every chunk and once
    /// more after the last one, and every chunk is reported to the context's progress callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be created or written,
    /// if the stream fails, or if the run is cancelled. The partial file is
    /// removed in every case.
    pub fn materialize(
        &self,
        chunks: ChunkStream,
        ctx: &mut FetchContext<'_>,
    ) -> Result<ArchiveFile> {
        let cancel = ctx.cancel.clone();

        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(self.suffix)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| {
                FetchError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "failed to create temporary archive in {}: {}",
                        self.temp_dir.display(),
                        e
                    ),
                ))
            })?;

        let mut len: u64 = 0;
        let mut chunks = chunks.with_progress(&mut *ctx.progress);
        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            let Some(chunk) = chunks.next() else {
                break;
            };
            let chunk = chunk?;
            file.write_all(&chunk)?;
            len += chunk.len() as u64;
        }
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        file.flush()?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), bytes = len, "archive materialized");

        Ok(ArchiveFile { path, len })
    }
}

/// A temporary archive on disk.
///
/// The file is deleted when this handle is dropped. Use
/// [`ArchiveFile::close`] to delete it explicitly and observe failures.
#[derive(Debug)]
pub struct ArchiveFile {
    path: TempPath,
    len: u64,
}

impl ArchiveFile {
    /// Returns the location of the archive.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of bytes in the archive.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` if the archive holds no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Opens the archive for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(&self) -> Result<File> {
        Ok(File::open(&self.path)?)
    }

    /// Deletes the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub fn close(self) -> Result<()> {
        self.path.close()?;
        Ok(())
    }
}
