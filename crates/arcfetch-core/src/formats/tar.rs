//! Gzip-compressed tar extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use flate2::read::GzDecoder;
use tracing::debug;
use tracing::trace;

use super::common;
use super::traits::Extractor;
use crate::ExtractionReport;
use crate::FetchContext;
use crate::FetchError;
use crate::Result;
use crate::io::ArchiveFile;
use crate::security::PathGuard;
use crate::types::EntryKind;
use crate::types::ExtractionRoot;

type TarReader = tar::Archive<GzDecoder<BufReader<File>>>;

/// Extractor for `.tar.gz` archives.
///
/// The archive is read twice. The first pass checks every entry path and
/// fails on the first one that escapes the root; the second pass writes
/// files and directories. Links and special entries are skipped.
///
/// # Examples
///
/// ```no_run
/// use arcfetch_core::FetchConfig;
/// use arcfetch_core::FetchContext;
/// use arcfetch_core::NoopProgress;
/// use arcfetch_core::formats::Extractor;
/// use arcfetch_core::formats::TarExtractor;
/// use arcfetch_core::io::ArchiveWriter;
/// use arcfetch_core::io::ChunkStream;
/// use arcfetch_core::types::ExtractionRoot;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FetchConfig::default();
/// let mut progress = NoopProgress;
/// let mut ctx = FetchContext::new(&config, &mut progress);
///
/// let bytes = std::fs::read("data.tar.gz")?;
/// let archive = ArchiveWriter::new(".", ".tar.gz")
///     .materialize(ChunkStream::from_chunks(vec![bytes]), &mut ctx)?;
/// let root = ExtractionRoot::create("data")?;
///
/// let report = TarExtractor.extract(&archive, &root, &mut ctx)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TarExtractor;

impl TarExtractor {
    fn open(archive: &ArchiveFile) -> Result<TarReader> {
        let file = archive.open()?;
        Ok(tar::Archive::new(GzDecoder::new(BufReader::new(file))))
    }

    /// Checks every entry path without writing anything.
    fn validate(
        archive: &ArchiveFile,
        guard: &PathGuard<'_>,
        ctx: &FetchContext<'_>,
    ) -> Result<usize> {
        let mut reader = Self::open(archive)?;
        let mut checked = 0;
        for entry in reader.entries().map_err(|e| corrupt(None, &e))? {
            ctx.check_cancelled()?;
            let entry = entry.map_err(|e| corrupt(None, &e))?;
            let path = entry.path().map_err(|e| corrupt(None, &e))?;
            guard.check(&path)?;
            checked += 1;
        }
        Ok(checked)
    }
}

impl Extractor for TarExtractor {
    fn extract(
        &self,
        archive: &ArchiveFile,
        root: &ExtractionRoot,
        ctx: &mut FetchContext<'_>,
    ) -> Result<ExtractionReport> {
        ctx.check_cancelled()?;
        let start = Instant::now();
        let guard = PathGuard::new(root);

        let checked = Self::validate(archive, &guard, ctx)?;
        debug!(entries = checked, "tar entries validated");

        let mut report = ExtractionReport::new();
        let mut reader = Self::open(archive)?;
        for entry in reader.entries().map_err(|e| corrupt(None, &e))? {
            ctx.check_cancelled()?;
            let mut entry = entry.map_err(|e| corrupt(None, &e))?;
            let path = entry.path().map_err(|e| corrupt(None, &e))?.into_owned();
            let safe = guard.check(&path)?;

            match EntryKind::from_tar(entry.header().entry_type()) {
                EntryKind::File => common::write_file(&mut entry, root, &safe, &mut report)?,
                EntryKind::Directory => common::create_directory(root, &safe, &mut report)?,
                EntryKind::Metadata => {
                    trace!(entry = %path.display(), "ignoring metadata header");
                    continue;
                }
                kind => {
                    common::skip_entry(&path, kind, &mut report);
                    continue;
                }
            }
            trace!(entry = %safe.as_path().display(), "extracted");
            ctx.progress.on_entry_extracted(safe.as_path());
        }

        report.duration = start.elapsed();
        Ok(report)
    }

    fn format_name(&self) -> &'static str {
        "tar.gz"
    }

    fn file_suffix(&self) -> &'static str {
        ".tar.gz"
    }
}

fn corrupt(entry: Option<&Path>, e: &std::io::Error) -> FetchError {
    FetchError::invalid_archive(entry, e)
}
