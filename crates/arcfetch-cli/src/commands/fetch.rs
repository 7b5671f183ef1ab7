//! Fetch command implementation.

use crate::cli::FetchArgs;
use crate::error::add_fetch_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use crate::progress::LogProgress;
use anyhow::Context;
use anyhow::Result;
use arcfetch_core::Downloader;
use arcfetch_core::FetchConfig;
use arcfetch_core::FetchReport;
use arcfetch_core::report::format_bytes;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Exit status when a second Ctrl-C aborts a run that is not winding down.
const INTERRUPTED: i32 = 130;

/// Builds the core configuration from command-line arguments.
pub fn build_config(args: &FetchArgs) -> FetchConfig {
    FetchConfig::default()
        .with_chunk_size(args.chunk_size)
        .with_temp_dir(args.temp_dir.clone())
        .with_timeout(args.timeout.map(Duration::from_secs))
        .with_connect_timeout(Some(Duration::from_secs(args.connect_timeout)))
}

pub fn execute(args: &FetchArgs, formatter: &dyn OutputFormatter, show_progress: bool) -> Result<()> {
    let downloader = add_fetch_context(Downloader::new(build_config(args)), &args.url)?;

    let token = downloader.cancel_token().clone();
    ctrlc::set_handler(move || {
        if interrupt(&token) {
            std::process::exit(INTERRUPTED);
        }
    })
    .context("failed to install Ctrl-C handler")?;

    // Use progress bar if TTY is detected (not quiet, not JSON, is terminal),
    // otherwise progress goes to the log
    let report = if show_progress && CliProgress::should_show() {
        let mut progress = CliProgress::new(&args.url);
        add_fetch_context(
            downloader.download(&args.url, &args.output_dir, &mut progress),
            &args.url,
        )?
    } else {
        let mut progress = LogProgress::new();
        add_fetch_context(
            downloader.download(&args.url, &args.output_dir, &mut progress),
            &args.url,
        )?
    };

    if let Some(message) = length_mismatch(&report) {
        formatter.format_warning(&message);
    }
    formatter.format_fetch_result(&report)?;

    Ok(())
}

/// Handles one Ctrl-C. The first press cancels the run; any later press
/// returns `true` so the caller can exit without waiting.
fn interrupt(token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return true;
    }
    token.cancel();
    false
}

fn length_mismatch(report: &FetchReport) -> Option<String> {
    let declared = report.content_length?;
    (declared != report.bytes_downloaded).then(|| {
        format!(
            "server announced {} but sent {}",
            format_bytes(declared),
            format_bytes(report.bytes_downloaded)
        )
    })
}
