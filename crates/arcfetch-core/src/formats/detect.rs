//! Archive format resolution from the declared content type.

use std::fmt;

/// Content type that routes to the zip extractor.
pub const MIME_ZIP: &str = "application/zip";

/// Content type that routes to the gzip tarball extractor.
pub const MIME_GZIP: &str = "application/x-gzip";

/// Archive format resolved from a `Content-Type` header.
///
/// Only the exact media types [`MIME_GZIP`] and [`MIME_ZIP`] are
/// recognized. Case, surrounding whitespace and parameters are ignored;
/// the file's own signature is never consulted.
///
/// # Examples
///
/// ```
/// use arcfetch_core::formats::ArchiveFormat;
///
/// assert_eq!(ArchiveFormat::from_content_type(Some("application/zip")), ArchiveFormat::Zip);
/// assert_eq!(
///     ArchiveFormat::from_content_type(Some("Application/X-Gzip; charset=binary")),
///     ArchiveFormat::TarGz
/// );
/// assert!(!ArchiveFormat::from_content_type(Some("text/html")).is_supported());
/// assert!(!ArchiveFormat::from_content_type(None).is_supported());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive.
    TarGz,

    /// ZIP archive.
    Zip,

    /// Any other content type, or `None` when the header was absent.
    Unknown(Option<String>),
}

impl ArchiveFormat {
    /// Resolves the format from a raw header value.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return Self::Unknown(None);
        };
        let essence = raw.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(MIME_GZIP) {
            Self::TarGz
        } else if essence.eq_ignore_ascii_case(MIME_ZIP) {
            Self::Zip
        } else {
            Self::Unknown(Some(raw.to_string()))
        }
    }

    /// Returns `true` if an extractor exists for this format.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Returns the canonical content type for supported formats.
    #[must_use]
    pub const fn mime_type(&self) -> Option<&'static str> {
        match self {
            Self::TarGz => Some(MIME_GZIP),
            Self::Zip => Some(MIME_ZIP),
            Self::Unknown(_) => None,
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TarGz => f.write_str("tar.gz"),
            Self::Zip => f.write_str("zip"),
            Self::Unknown(Some(content_type)) => write!(f, "unknown ({content_type})"),
            Self::Unknown(None) => f.write_str("unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_types() {
        assert_eq!(
            ArchiveFormat::from_content_type(Some("application/x-gzip")),
            ArchiveFormat::TarGz
        );
        assert_eq!(
            ArchiveFormat::from_content_type(Some("application/zip")),
            ArchiveFormat::Zip
        );
    }

    #[test]
    fn test_case_whitespace_and_parameters() {
        assert_eq!(
            ArchiveFormat::from_content_type(Some("  APPLICATION/ZIP ")),
            ArchiveFormat::Zip
        );
        assert_eq!(
            ArchiveFormat::from_content_type(Some("application/x-gzip ; name=data.tar.gz")),
            ArchiveFormat::TarGz
        );
    }

    #[test]
    fn test_unrecognized_types() {
        for content_type in [
            "application/gzip",
            "application/x-tar",
            "application/octet-stream",
            "text/html; charset=utf-8",
            "application/zip2",
            "",
        ] {
            assert_eq!(
                ArchiveFormat::from_content_type(Some(content_type)),
                ArchiveFormat::Unknown(Some(content_type.to_string())),
                "{content_type} should not be recognized"
            );
        }
    }

    #[test]
    fn test_missing_header() {
        let format = ArchiveFormat::from_content_type(None);
        assert_eq!(format, ArchiveFormat::Unknown(None));
        assert!(!format.is_supported());
        assert_eq!(format.mime_type(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ArchiveFormat::TarGz.to_string(), "tar.gz");
        assert_eq!(ArchiveFormat::Zip.to_string(), "zip");
        assert_eq!(
            ArchiveFormat::Unknown(Some("text/html".into())).to_string(),
            "unknown (text/html)"
        );
        assert_eq!(ArchiveFormat::Unknown(None).to_string(), "unknown");
    }
}
