//! Type-safe wrappers for extraction paths.
//!
//! Paths that reach the filesystem go through these newtypes. A
//! [`SafePath`] can only be produced by the path guard, so code that writes
//! entries cannot accidentally use an unchecked archive path.

pub mod entry_kind;
pub mod root;
pub mod safe_path;

pub use entry_kind::EntryKind;
pub use root::ExtractionRoot;
pub use safe_path::SafePath;
