//! Guarded entry path type.

use std::path::Path;
use std::path::PathBuf;

/// An archive entry path that has been checked against an
/// [`ExtractionRoot`](super::ExtractionRoot).
///
/// The path is relative to the root and lexically normalized: it contains no
/// `.` or `..` components and no root or prefix. An empty `SafePath`
/// denotes the root itself.
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`PathGuard::check`](crate::security::PathGuard::check)
/// - NO `From<PathBuf>` implementation
/// - Always resolves within the root it was checked against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    pub(crate) fn new_unchecked(path: PathBuf) -> Self {
        Self(path)
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns `true` if the path resolves to the extraction root itself.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_root() {
        assert!(SafePath::new_unchecked(PathBuf::new()).is_root());
        assert!(!SafePath::new_unchecked(PathBuf::from("a.txt")).is_root());
    }

    #[test]
    fn test_into_path_buf() {
        let safe = SafePath::new_unchecked(PathBuf::from("sub/b.txt"));
        assert_eq!(safe.as_path(), Path::new("sub/b.txt"));
        assert_eq!(safe.into_path_buf(), PathBuf::from("sub/b.txt"));
    }
}
