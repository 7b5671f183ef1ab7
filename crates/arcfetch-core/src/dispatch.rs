//! Content-type routing from a transfer body to an extractor.
//!
//! Routing is decided from the declared content type alone. An unsupported
//! type fails before any byte is read, so no temporary archive and no output
//! directory is created for it.

use std::path::Path;

use tracing::debug;
use tracing::info;

use crate::ExtractionReport;
use crate::FetchContext;
use crate::FetchError;
use crate::Result;
use crate::formats::ArchiveFormat;
use crate::formats::Extractor;
use crate::formats::TarExtractor;
use crate::formats::ZipExtractor;
use crate::io::ArchiveWriter;
use crate::io::ChunkStream;
use crate::types::ExtractionRoot;

/// Resolves a declared content type to a supported archive format.
///
/// # Errors
///
/// Returns `FetchError::UnsupportedFormat` for a missing header or any
/// type other than `application/x-gzip` and `application/zip`.
///
/// # Examples
///
/// ```
/// use arcfetch_core::dispatch::route;
/// use arcfetch_core::formats::ArchiveFormat;
///
/// assert_eq!(route(Some("application/zip")).unwrap(), ArchiveFormat::Zip);
/// assert!(route(Some("text/html")).is_err());
/// assert!(route(None).is_err());
/// ```
pub fn route(content_type: Option<&str>) -> Result<ArchiveFormat> {
    match ArchiveFormat::from_content_type(content_type) {
        ArchiveFormat::Unknown(content_type) => {
            Err(FetchError::UnsupportedFormat { content_type })
        }
        format => Ok(format),
    }
}

/// Returns the extractor for a resolved format.
///
/// # Errors
///
/// Returns `FetchError::UnsupportedFormat` for [`ArchiveFormat::Unknown`].
pub fn extractor_for(format: &ArchiveFormat) -> Result<Box<dyn Extractor>> {
    match format {
        ArchiveFormat::TarGz => Ok(Box::new(TarExtractor)),
        ArchiveFormat::Zip => Ok(Box::new(ZipExtractor)),
        ArchiveFormat::Unknown(content_type) => Err(FetchError::UnsupportedFormat {
            content_type: content_type.clone(),
        }),
    }
}

/// Routes `chunks` by content type, materializes them and extracts the
/// archive into `output_dir`.
///
/// The output directory is created only once routing has succeeded. The
/// temporary archive is removed before this function returns, whatever the
/// outcome.
///
/// # Errors
///
/// Returns `FetchError::UnsupportedFormat` when the content type has no
/// extractor, and any error raised while writing or extracting the archive.
pub fn dispatch(
    content_type: Option<&str>,
    chunks: ChunkStream,
    output_dir: &Path,
    ctx: &mut FetchContext<'_>,
) -> Result<ExtractionReport> {
    let format = route(content_type)?;
    let (_, report) = dispatch_format(&format, chunks, output_dir, ctx)?;
    Ok(report)
}

/// Materializes and extracts an already routed archive.
///
/// Returns the size of the materialized archive with the extraction report.
pub(crate) fn dispatch_format(
    format: &ArchiveFormat,
    chunks: ChunkStream,
    output_dir: &Path,
    ctx: &mut FetchContext<'_>,
) -> Result<(u64, ExtractionReport)> {
    let extractor = extractor_for(format)?;
    debug!(format = extractor.format_name(), "dispatching archive");

    let writer = ArchiveWriter::new(ctx.config.temp_dir_or_cwd(), extractor.file_suffix());
    let archive = writer.materialize(chunks, ctx)?;
    let archive_len = archive.len();

    let root = ExtractionRoot::create(output_dir)?;
    let report = extractor.extract(&archive, &root, ctx)?;
    archive.close()?;

    info!(
        format = extractor.format_name(),
        files = report.files_extracted,
        directories = report.directories_created,
        skipped = report.entries_skipped,
        "archive extracted"
    );
    Ok((archive_len, report))
}
