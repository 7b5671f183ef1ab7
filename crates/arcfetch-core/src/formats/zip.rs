//! ZIP extraction.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::trace;

use super::common;
use super::traits::Extractor;
use crate::ExtractionReport;
use crate::FetchContext;
use crate::Result;
use crate::io::ArchiveFile;
use crate::security::PathGuard;
use crate::types::EntryKind;
use crate::types::ExtractionRoot;

/// Extractor for ZIP archives.
///
/// Entry names are checked exactly as stored in the central directory; the
/// zip library's own name sanitizing is not relied on. As with tar, every
/// name is checked before the first entry is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    fn open(archive: &ArchiveFile) -> Result<zip::ZipArchive<BufReader<File>>> {
        let file = archive.open()?;
        Ok(zip::ZipArchive::new(BufReader::new(file))?)
    }
}

impl Extractor for ZipExtractor {
    fn extract(
        &self,
        archive: &ArchiveFile,
        root: &ExtractionRoot,
        ctx: &mut FetchContext<'_>,
    ) -> Result<ExtractionReport> {
        ctx.check_cancelled()?;
        let start = Instant::now();
        let guard = PathGuard::new(root);
        let mut zip = Self::open(archive)?;

        for index in 0..zip.len() {
            ctx.check_cancelled()?;
            let entry = zip.by_index_raw(index)?;
            guard.check(&PathBuf::from(entry.name()))?;
        }
        debug!(entries = zip.len(), "zip entries validated");

        let mut report = ExtractionReport::new();
        for index in 0..zip.len() {
            ctx.check_cancelled()?;
            let mut entry = zip.by_index(index)?;
            let path = PathBuf::from(entry.name());
            let safe = guard.check(&path)?;

            match EntryKind::from_zip(entry.is_dir(), entry.unix_mode()) {
                EntryKind::File => common::write_file(&mut entry, root, &safe, &mut report)?,
                EntryKind::Directory => common::create_directory(root, &safe, &mut report)?,
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
        "zip"
    }

    fn file_suffix(&self) -> &'static str {
        ".zip"
    }
}
