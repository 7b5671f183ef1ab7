//! Common traits for archive format handlers.

use crate::ExtractionReport;
use crate::FetchContext;
use crate::Result;
use crate::io::ArchiveFile;
use crate::types::ExtractionRoot;

/// Trait for archive format extractors.
///
/// Implementations must check every entry path with
/// [`PathGuard`](crate::security::PathGuard) before writing anything, and
/// must not create links.
pub trait Extractor {
    /// Extracts `archive` below `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive is corrupt, an entry escapes the
    /// root, a write fails, or the run is cancelled.
    fn extract(
        &self,
        archive: &ArchiveFile,
        root: &ExtractionRoot,
        ctx: &mut FetchContext<'_>,
    ) -> Result<ExtractionReport>;

    /// Returns the archive format name.
    fn format_name(&self) -> &'static str;

    /// Returns the file name suffix used for the temporary archive.
    fn file_suffix(&self) -> &'static str;
}
