//! Subcommand implementations.

pub mod completion;
pub mod fetch;
