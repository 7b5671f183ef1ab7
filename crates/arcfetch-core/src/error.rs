//! Error types for archive download and extraction.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `FetchError`.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while downloading or extracting an archive.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    #[error("transfer failed: {url} returned non-success status {status}")]
    Transfer {
        /// The requested URL.
        url: String,
        /// The HTTP status code received.
        status: u16,
    },

    /// The connection could not be established or broke mid-stream.
    #[error("network error while fetching {url}: {reason}")]
    Network {
        /// The requested URL.
        url: String,
        /// Description of the underlying failure.
        reason: String,
    },

    /// The declared content type has no extractor.
    #[error("unsupported archive format: {}", content_type.as_deref().unwrap_or("<missing content type>"))]
    UnsupportedFormat {
        /// The declared content type, if the header was present.
        content_type: Option<String>,
    },

    /// Path traversal attempt detected.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The entry path that attempted traversal.
        path: PathBuf,
    },

    /// Archive is corrupted or invalid.
    #[error("invalid archive{}: {reason}", entry.as_ref().map(|e| format!(" at entry {}", e.display())).unwrap_or_default())]
    InvalidArchive {
        /// The entry being processed, when known.
        entry: Option<PathBuf>,
        /// Description of the problem.
        reason: String,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation was cancelled through its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

impl FetchError {
    pub(crate) fn network(url: &str, reason: impl ToString) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_archive(entry: Option<&Path>, reason: impl ToString) -> Self {
        Self::InvalidArchive {
            entry: entry.map(Path::to_path_buf),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` if this error represents a security violation.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcfetch_core::FetchError;
    /// use std::path::PathBuf;
    ///
    /// let err = FetchError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    ///
    /// let err = FetchError::Cancelled;
    /// assert!(!err.is_security_violation());
    /// ```
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Returns `true` if the failure happened on the network side of the
    /// pipeline, before any archive was materialized.
    #[must_use]
    pub const fn is_transfer_error(&self) -> bool {
        matches!(self, Self::Transfer { .. } | Self::Network { .. })
    }

    /// Returns `true` if the failure happened while reading or writing
    /// archive entries.
    #[must_use]
    pub const fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::InvalidArchive { .. } | Self::Io(_)
        )
    }

    /// Returns the offending archive entry, if one is known.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcfetch_core::FetchError;
    /// use std::path::Path;
    /// use std::path::PathBuf;
    ///
    /// let err = FetchError::PathTraversal {
    ///     path: PathBuf::from("../../etc/passwd"),
    /// };
    /// assert_eq!(err.entry(), Some(Path::new("../../etc/passwd")));
    ///
    /// let err = FetchError::UnsupportedFormat { content_type: None };
    /// assert_eq!(err.entry(), None);
    /// ```
    #[must_use]
    pub fn entry(&self) -> Option<&Path> {
        match self {
            Self::PathTraversal { path } => Some(path),
            Self::InvalidArchive { entry, .. } => entry.as_deref(),
            _ => None,
        }
    }
}

impl From<zip::result::ZipError> for FetchError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::invalid_archive(None, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_display() {
        let err = FetchError::Transfer {
            url: "https://example.com/data.zip".into(),
            status: 404,
        };
        let display = err.to_string();
        assert!(display.contains("non-success status"));
        assert!(display.contains("404"));
        assert!(display.contains("https://example.com/data.zip"));
        assert!(err.is_transfer_error());
        assert!(!err.is_extraction_error());
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = FetchError::UnsupportedFormat {
            content_type: Some("text/html".into()),
        };
        assert_eq!(err.to_string(), "unsupported archive format: text/html");

        let err = FetchError::UnsupportedFormat { content_type: None };
        assert!(err.to_string().contains("missing content type"));
    }

    #[test]
    fn test_path_traversal_error() {
        let err = FetchError::PathTraversal {
            path: PathBuf::from("../etc/passwd"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
        assert!(err.is_extraction_error());
    }

    #[test]
    fn test_invalid_archive_display() {
        let err = FetchError::invalid_archive(Some(Path::new("sub/b.txt")), "truncated");
        assert_eq!(
            err.to_string(),
            "invalid archive at entry sub/b.txt: truncated"
        );
        assert_eq!(err.entry(), Some(Path::new("sub/b.txt")));

        let err = FetchError::invalid_archive(None, "bad header");
        assert_eq!(err.to_string(), "invalid archive: bad header");
        assert_eq!(err.entry(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FetchError = io_err.into();
        assert!(matches!(err, FetchError::Io(_)));
        assert!(!err.is_security_violation());
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: FetchError = zip::result::ZipError::InvalidArchive("bad cdr".into()).into();
        assert!(matches!(err, FetchError::InvalidArchive { entry: None, .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: FetchError = zip::result::ZipError::Io(io_err).into();
        assert!(matches!(err, FetchError::Io(_)));
    }

    #[test]
    fn test_network_error_is_transfer() {
        let err = FetchError::network("http://localhost", "connection refused");
        assert!(err.is_transfer_error());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_cancelled_is_neither() {
        let err = FetchError::Cancelled;
        assert!(!err.is_transfer_error());
        assert!(!err.is_extraction_error());
        assert_eq!(err.to_string(), "operation cancelled");
    }
}
