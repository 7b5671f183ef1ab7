//! Operation reporting and progress callbacks.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::formats::ArchiveFormat;

/// Report of an archive extraction operation.
///
/// Contains statistics and metadata about the extraction process.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Number of files successfully extracted.
    pub files_extracted: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Number of link or special entries that were not materialized.
    pub entries_skipped: usize,

    /// Duration of the extraction operation.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns total number of items written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Report of a complete download and extraction run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// The URL the archive was fetched from.
    pub url: String,

    /// The format the archive was dispatched as.
    pub format: ArchiveFormat,

    /// Bytes received from the transfer and written to the temporary archive.
    pub bytes_downloaded: u64,

    /// The `Content-Length` the server declared, if any.
    pub content_length: Option<u64>,

    /// Statistics of the extraction step.
    pub extraction: ExtractionReport,

    /// Wall-clock duration of the whole run.
    pub duration: Duration,
}

/// Snapshot of a running transfer, delivered at every chunk boundary.
///
/// # Examples
///
/// ```
/// use arcfetch_core::TransferProgress;
/// use std::time::Duration;
///
/// let progress = TransferProgress {
///     bytes_transferred: 3_000_000,
///     total_bytes: Some(10_000_000),
///     elapsed: Duration::from_secs(3),
/// };
/// assert_eq!(progress.remaining(), Some(Duration::from_secs(7)));
/// assert_eq!(
///     progress.to_string(),
///     "Downloaded: 3.0 MB / 10.0 MB, elapsed 3s, remaining 7s"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub bytes_transferred: u64,

    /// Total size declared by the server, if known.
    pub total_bytes: Option<u64>,

    /// Time since the transfer started.
    pub elapsed: Duration,
}

impl TransferProgress {
    /// Estimates the time left from the average rate so far.
    ///
    /// Returns `None` when the total is unknown, when nothing has been
    /// received yet, or when more bytes arrived than were declared.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let total = self.total_bytes?;
        let left = total.checked_sub(self.bytes_transferred)?;
        if left == 0 {
            return Some(Duration::ZERO);
        }
        if self.bytes_transferred == 0 || self.elapsed.is_zero() {
            return None;
        }
        let nanos =
            self.elapsed.as_nanos() * u128::from(left) / u128::from(self.bytes_transferred);
        u64::try_from(nanos).ok().map(Duration::from_nanos)
    }

    /// Returns the completed fraction in `0.0..=1.0`, if the total is known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> Option<f64> {
        match self.total_bytes? {
            0 => Some(1.0),
            total => Some((self.bytes_transferred as f64 / total as f64).min(1.0)),
        }
    }
}

impl fmt::Display for TransferProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Downloaded: {} / ", format_bytes(self.bytes_transferred))?;
        match self.total_bytes {
            Some(total) => write!(f, "{}", format_bytes(total))?,
            None => f.write_str("unknown")?,
        }
        write!(f, ", elapsed {}, remaining ", format_duration(self.elapsed))?;
        match self.remaining() {
            Some(remaining) => write!(f, "{}", format_duration(remaining)),
            None => f.write_str("unknown"),
        }
    }
}

/// Formats a byte count with decimal units (`512 B`, `1.5 kB`, `3.0 MB`).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["kB", "MB", "GB", "TB"];

    if bytes < 1000 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1000.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m {:02}s", secs / 60, secs % 60),
        _ => format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60),
    }
}

/// Callback trait for progress reporting during a fetch.
///
/// Implement this trait to receive transfer and extraction updates. The
/// trait requires `Send` to allow use in multi-threaded contexts.
///
/// # Examples
///
/// ```
/// use arcfetch_core::ProgressCallback;
/// use arcfetch_core::TransferProgress;
/// use std::path::Path;
///
/// struct PrintProgress;
///
/// impl ProgressCallback for PrintProgress {
///     fn on_transfer_start(&mut self, total_bytes: Option<u64>) {
///         println!("Starting transfer of {total_bytes:?} bytes");
///     }
///
///     fn on_chunk(&mut self, progress: &TransferProgress) {
///         println!("{progress}");
///     }
///
///     fn on_entry_extracted(&mut self, path: &Path) {
///         println!("Extracted: {}", path.display());
///     }
///
///     fn on_complete(&mut self) {
///         println!("Done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called once before the first chunk is read.
    ///
    /// # Arguments
    ///
    /// * `total_bytes` - Declared transfer size, if the server sent one
    fn on_transfer_start(&mut self, total_bytes: Option<u64>);

    /// Called after each chunk has been received.
    fn on_chunk(&mut self, progress: &TransferProgress);

    /// Called after an entry has been written below the extraction root.
    ///
    /// # Arguments
    ///
    /// * `path` - Entry path relative to the root
    fn on_entry_extracted(&mut self, path: &Path);

    /// Called when the entire operation is complete.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback` that does nothing.
///
/// Use this when you don't need progress reporting but the API requires
/// a callback implementation.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_transfer_start(&mut self, _total_bytes: Option<u64>) {}

    fn on_chunk(&mut self, _progress: &TransferProgress) {}

    fn on_entry_extracted(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
