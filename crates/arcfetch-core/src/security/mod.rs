//! Path validation for archive entries.

pub mod guard;

pub use guard::PathGuard;
pub use guard::is_safe;
