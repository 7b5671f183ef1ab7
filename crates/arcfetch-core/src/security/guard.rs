//! Path traversal guard.
//!
//! The guard resolves an entry path against the extraction root purely
//! lexically (`.` is dropped, `..` pops a component) and accepts it only if
//! the result is the root itself or lies underneath it. The containment test
//! compares whole path components, so a root of `/data` never admits
//! `/data2` or `/data-other/evil`.
//!
//! Symlinks already present on disk are not followed; extraction never
//! creates links, so an archive cannot plant one to escape through.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::FetchError;
use crate::Result;
use crate::types::ExtractionRoot;
use crate::types::SafePath;

/// Checks archive entry paths against an [`ExtractionRoot`].
///
/// # Examples
///
/// ```no_run
/// use arcfetch_core::security::PathGuard;
/// use arcfetch_core::types::ExtractionRoot;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = ExtractionRoot::create("data")?;
/// let guard = PathGuard::new(&root);
///
/// let safe = guard.check(Path::new("sub/b.txt"))?;
/// assert_eq!(safe.as_path(), Path::new("sub/b.txt"));
///
/// assert!(guard.check(Path::new("../../etc/passwd")).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathGuard<'a> {
    root: &'a ExtractionRoot,
}

impl<'a> PathGuard<'a> {
    /// Creates a guard for the given root.
    #[must_use]
    pub const fn new(root: &'a ExtractionRoot) -> Self {
        Self { root }
    }

    /// Returns the root this guard checks against.
    #[must_use]
    pub const fn root(&self) -> &'a ExtractionRoot {
        self.root
    }

    /// Validates an entry path and returns it relative to the root.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::PathTraversal` if the entry resolves outside the
    /// root (through `..`, an absolute path, or a drive prefix) or contains a
    /// NUL byte.
    pub fn check(&self, entry: &Path) -> Result<SafePath> {
        let traversal = || FetchError::PathTraversal {
            path: entry.to_path_buf(),
        };

        if has_null_bytes(entry) {
            return Err(traversal());
        }

        let root = self.root.as_path();
        let resolved = normalize(&root.join(entry));
        let relative = resolved.strip_prefix(root).map_err(|_| traversal())?;

        Ok(SafePath::new_unchecked(relative.to_path_buf()))
    }
}

/// Returns `true` if `candidate`, resolved against `root`, stays within it.
///
/// Both paths are made absolute (relative roots are taken from the current
/// directory) and normalized lexically. The candidate is safe when its
/// resolved form equals the resolved root or starts with it component-wise.
///
/// # Examples
///
/// ```
/// use arcfetch_core::security::is_safe;
/// use std::path::Path;
///
/// assert!(is_safe(Path::new("/data"), Path::new("sub/file.txt")));
/// assert!(is_safe(Path::new("/data"), Path::new("sub/../file.txt")));
/// assert!(!is_safe(Path::new("/data"), Path::new("../data-other/evil")));
/// assert!(!is_safe(Path::new("/data"), Path::new("/etc/passwd")));
/// ```
#[must_use]
pub fn is_safe(root: &Path, candidate: &Path) -> bool {
    if has_null_bytes(candidate) {
        return false;
    }
    let Ok(root) = std::path::absolute(root) else {
        return false;
    };
    let root = normalize(&root);
    normalize(&root.join(candidate)).starts_with(&root)
}

/// Lexically normalizes a path.
///
/// `.` components are dropped and `..` removes the preceding normal
/// component. A `..` directly under the filesystem root is discarded, and a
/// leading `..` of a relative path is kept.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => {
                    normalized.push(component);
                }
            },
        }
    }
    normalized
}

#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_root() -> (TempDir, ExtractionRoot) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = ExtractionRoot::new(temp.path()).expect("failed to create root");
        (temp, root)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/b/../../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("./")), PathBuf::new());
    }

    #[test]
    #[cfg(unix)]
    fn test_is_safe_nested() {
        let root = Path::new("/data");
        assert!(is_safe(root, Path::new("a.txt")));
        assert!(is_safe(root, Path::new("sub/b.txt")));
        assert!(is_safe(root, Path::new("sub/deeper/../c.txt")));
        assert!(is_safe(root, Path::new("./sub/./d.txt")));
    }

    #[test]
    #[cfg(unix)]
    fn test_is_safe_root_itself() {
        let root = Path::new("/data");
        assert!(is_safe(root, Path::new("")));
        assert!(is_safe(root, Path::new(".")));
        assert!(is_safe(root, Path::new("sub/..")));
    }

    #[test]
    #[cfg(unix)]
    fn test_is_safe_traversal() {
        let root = Path::new("/data");
        assert!(!is_safe(root, Path::new("..")));
        assert!(!is_safe(root, Path::new("../etc/passwd")));
        assert!(!is_safe(root, Path::new("../../etc/passthrough")));
        assert!(!is_safe(root, Path::new("sub/../../etc/passwd")));
        assert!(!is_safe(root, Path::new("/etc/passwd")));
    }

    #[test]
    #[cfg(unix)]
    fn test_is_safe_prefix_collision() {
        let root = Path::new("/data");
        assert!(!is_safe(root, Path::new("../data-other/evil")));
        assert!(!is_safe(root, Path::new("../data2")));
        assert!(!is_safe(root, Path::new("/data-other/evil")));
    }

    #[test]
    #[cfg(unix)]
    fn test_is_safe_unnormalized_root() {
        let root = Path::new("/srv/./data/../data");
        assert!(is_safe(root, Path::new("file.txt")));
        assert!(!is_safe(root, Path::new("../other")));
    }

    #[test]
    fn test_is_safe_relative_root() {
        assert!(is_safe(Path::new("data"), Path::new("sub/b.txt")));
        assert!(!is_safe(Path::new("data"), Path::new("../outside")));
    }

    #[test]
    #[cfg(unix)]
    fn test_is_safe_null_byte() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let candidate = Path::new(OsStr::from_bytes(b"file\0.txt"));
        assert!(!is_safe(Path::new("/data"), candidate));
    }

    #[test]
    fn test_check_valid_relative() {
        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);

        let safe = guard.check(Path::new("foo/bar/baz.txt")).unwrap();
        assert_eq!(safe.as_path(), Path::new("foo/bar/baz.txt"));
        assert!(root.join(&safe).starts_with(root.as_path()));
    }

    #[test]
    fn test_check_normalizes() {
        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);

        let safe = guard.check(Path::new("./foo/./bar/../baz.txt")).unwrap();
        assert_eq!(safe.as_path(), Path::new("foo/baz.txt"));
    }

    #[test]
    fn test_check_root_entry() {
        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);

        let safe = guard.check(Path::new("./")).unwrap();
        assert!(safe.is_root());
    }

    #[test]
    fn test_check_rejects_traversal() {
        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);

        for path in [
            "../etc/passwd",
            "../../etc/passthrough",
            "foo/../../etc/passwd",
            "foo/../../../etc/passwd",
        ] {
            let result = guard.check(Path::new(path));
            assert!(
                matches!(result, Err(FetchError::PathTraversal { path: ref p }) if p == Path::new(path)),
                "path should be rejected: {path}"
            );
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_check_rejects_absolute() {
        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);

        assert!(matches!(
            guard.check(Path::new("/etc/passwd")),
            Err(FetchError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_check_rejects_sibling_with_shared_prefix() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let data = temp.path().join("data");
        std::fs::create_dir(&data).unwrap();
        let root = ExtractionRoot::new(&data).unwrap();
        let guard = PathGuard::new(&root);

        assert!(matches!(
            guard.check(Path::new("../data-other/evil")),
            Err(FetchError::PathTraversal { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_check_rejects_null_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);

        let path = Path::new(OsStr::from_bytes(b"file\0.txt"));
        assert!(matches!(
            guard.check(path),
            Err(FetchError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_guard_root_accessor() {
        let (_temp, root) = create_test_root();
        let guard = PathGuard::new(&root);
        assert_eq!(guard.root(), &root);
    }
}
