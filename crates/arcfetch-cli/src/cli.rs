//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arcfetch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download an archive and extract it
    Fetch(FetchArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// URL of the archive to download
    #[arg(value_name = "URL")]
    pub url: String,

    /// Directory to extract into
    #[arg(value_name = "OUTPUT_DIR", default_value = "data")]
    pub output_dir: PathBuf,

    /// Directory for the temporary archive (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Transfer chunk size in bytes (K, M and G suffixes accepted)
    #[arg(long, value_name = "SIZE", default_value = "1M", value_parser = parse_chunk_size)]
    pub chunk_size: usize,

    /// Whole-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "30")]
    pub connect_timeout: u64,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum, value_name = "SHELL")]
    pub shell: Shell,
}

/// Parse a chunk size with optional suffix (K, M, G)
#[allow(clippy::option_if_let_else)]
fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty chunk size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_usize.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_usize.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    let size = num_str
        .parse::<usize>()
        .map_err(|_| format!("invalid chunk size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("chunk size overflow: {s}"))
        })?;

    if size == 0 {
        return Err("chunk size must be greater than zero".to_string());
    }
    Ok(size)
}
