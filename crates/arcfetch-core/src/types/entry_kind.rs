//! Archive entry kind enumeration.

use std::fmt;

/// Unix file-type bits of a mode.
const S_IFMT: u32 = 0o170_000;
/// Unix file-type bits of a symbolic link.
const S_IFLNK: u32 = 0o120_000;

/// Kind of entry found while iterating an archive.
///
/// Only [`EntryKind::File`] and [`EntryKind::Directory`] are written to the
/// extraction root. Links and special files are skipped and reported;
/// metadata headers are ignored.
///
/// # Examples
///
/// ```
/// use arcfetch_core::types::EntryKind;
///
/// assert!(EntryKind::File.is_materialized());
/// assert!(EntryKind::Directory.is_materialized());
/// assert!(!EntryKind::Link.is_materialized());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file entry.
    File,

    /// Directory entry.
    Directory,

    /// Symbolic or hard link entry.
    Link,

    /// Device node, FIFO, or any other special entry.
    Other,

    /// Tar extension header (pax global or local, GNU long name or link)
    /// that describes other entries and has no content of its own.
    Metadata,
}

impl EntryKind {
    /// Classifies a tar header entry type.
    #[must_use]
    pub fn from_tar(entry_type: tar::EntryType) -> Self {
        match entry_type {
            tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::GNUSparse => {
                Self::File
            }
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Symlink | tar::EntryType::Link => Self::Link,
            tar::EntryType::XGlobalHeader
            | tar::EntryType::XHeader
            | tar::EntryType::GNULongName
            | tar::EntryType::GNULongLink => Self::Metadata,
            _ => Self::Other,
        }
    }

    /// Classifies a zip entry from its directory flag and unix mode.
    ///
    /// Zip archives produced on Unix record symlinks through the file-type
    /// bits of the external attributes; entries without a unix mode are
    /// regular files or directories.
    #[must_use]
    pub fn from_zip(is_dir: bool, unix_mode: Option<u32>) -> Self {
        if is_dir {
            return Self::Directory;
        }
        match unix_mode {
            Some(mode) if mode & S_IFMT == S_IFLNK => Self::Link,
            _ => Self::File,
        }
    }

    /// Returns `true` if entries of this kind are written to disk.
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::File | Self::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Link => "link",
            Self::Other => "special file",
            Self::Metadata => "metadata header",
        };
        f.write_str(name)
    }
}
