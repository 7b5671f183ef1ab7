//! Entry writers shared by the tar and zip extractors.
//!
//! Every function takes a [`SafePath`], so nothing here can write outside
//! the [`ExtractionRoot`].

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::ExtractionReport;
use crate::FetchError;
use crate::Result;
use crate::types::EntryKind;
use crate::types::ExtractionRoot;
use crate::types::SafePath;

/// Buffer size for entry writes (64KB).
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Writes a regular file entry, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the entry names the root itself, or if creating or
/// writing the file fails.
pub(crate) fn write_file<R: Read>(
    reader: &mut R,
    root: &ExtractionRoot,
    path: &SafePath,
    report: &mut ExtractionReport,
) -> Result<()> {
    if path.is_root() {
        return Err(FetchError::invalid_archive(
            Some(path.as_path()),
            "file entry resolves to the extraction root",
        ));
    }

    let output_path = root.join(path);
    if let Some(parent) = output_path.parent() {
        create_dir_all(parent)?;
    }

    let output_file = File::create(&output_path)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, output_file);
    let bytes = std::io::copy(reader, &mut writer).map_err(|e| entry_io(path.as_path(), &e))?;
    writer.flush()?;

    report.files_extracted += 1;
    report.bytes_written = report.bytes_written.saturating_add(bytes);
    Ok(())
}

/// Creates a directory entry. Existing directories are accepted.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub(crate) fn create_directory(
    root: &ExtractionRoot,
    path: &SafePath,
    report: &mut ExtractionReport,
) -> Result<()> {
    if path.is_root() {
        return Ok(());
    }
    create_dir_all(root.join(path))?;
    report.directories_created += 1;
    Ok(())
}

/// Records an entry that is deliberately not materialized.
pub(crate) fn skip_entry(path: &Path, kind: EntryKind, report: &mut ExtractionReport) {
    warn!(entry = %path.display(), %kind, "skipping entry");
    report.entries_skipped += 1;
    report.add_warning(format!("skipped {kind}: {}", path.display()));
}

fn entry_io(path: &Path, e: &std::io::Error) -> FetchError {
    FetchError::Io(std::io::Error::new(
        e.kind(),
        format!("failed to write entry {}: {e}", path.display()),
    ))
}
