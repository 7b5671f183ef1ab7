//! Output formatting module.
//!
//! `--json` selects the machine-readable formatter and takes precedence over
//! `--verbose` and `--quiet`, which only shape the human output.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;

use crate::cli::Cli;
use human::HumanFormatter;
use json::JsonFormatter;

/// Creates the formatter selected by the global output flags.
pub fn create_formatter(cli: &Cli) -> Box<dyn OutputFormatter> {
    if cli.json {
        return Box::new(JsonFormatter);
    }
    Box::new(HumanFormatter::new(cli.verbose, cli.quiet))
}
