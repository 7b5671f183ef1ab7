//! Progress reporting for CLI downloads.
//!
//! [`CliProgress`] draws a bar on an interactive terminal. [`LogProgress`]
//! routes the same events through `tracing` when there is no terminal to
//! draw on.

use arcfetch_core::ProgressCallback;
use arcfetch_core::TransferProgress;
use arcfetch_core::report::format_bytes;
use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use std::fmt::Write;
use std::path::Path;
use std::time::Duration;
use std::time::Instant;
use tracing::debug;
use tracing::info;

/// Minimum time between two logged transfer snapshots.
const LOG_INTERVAL: Duration = Duration::from_secs(2);

/// CLI progress bar wrapper implementing `ProgressCallback`.
///
/// Shows a byte bar with speed and ETA when the server announced the
/// transfer size. Otherwise a spinner shows the running total and states
/// that the total and remaining time are unknown. The bar is cleared on drop.
pub struct CliProgress {
    bar: ProgressBar,
    entries: usize,
}

impl CliProgress {
    /// Creates a progress display for a download from `url`.
    #[must_use]
    pub fn new(url: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_message(format!("Fetching {url}"));
        Self { bar, entries: 0 }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    fn sized_style() -> ProgressStyle {
        // Template: "Downloading [████████░░░░] 3.0 MB/10.0 MB (1.2 MB/s, 6s)"
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {done}/{total} ({speed}, {eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .with_key("done", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", format_bytes(state.pos())).unwrap_or(());
            })
            .with_key("total", |state: &ProgressState, w: &mut dyn Write| {
                write!(w, "{}", format_bytes(state.len().unwrap_or(0))).unwrap_or(());
            })
            .with_key("speed", |state: &ProgressState, w: &mut dyn Write| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let bytes_per_sec = state.per_sec() as u64;
                write!(w, "{}/s", format_bytes(bytes_per_sec)).unwrap_or(());
            })
            .progress_chars("█▓░")
    }

    fn unsized_style() -> ProgressStyle {
        // Template: "⠙ Downloaded: 3.0 MB / unknown, elapsed 2s, remaining unknown"
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_transfer_start(&mut self, total_bytes: Option<u64>) {
        if let Some(total) = total_bytes {
            self.bar.set_length(total);
            self.bar.set_style(Self::sized_style());
        } else {
            self.bar.set_style(Self::unsized_style());
            self.bar.enable_steady_tick(Duration::from_millis(120));
        }
        self.bar.set_message("Downloading");
    }

    fn on_chunk(&mut self, progress: &TransferProgress) {
        self.bar.set_position(progress.bytes_transferred);
        if progress.total_bytes.is_none() {
            self.bar.set_message(progress.to_string());
        }
    }

    fn on_entry_extracted(&mut self, path: &Path) {
        self.entries += 1;
        self.bar
            .set_message(format!("Extracting ({}) {}", self.entries, path.display()));
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// `ProgressCallback` that logs transfer snapshots at most every
/// [`LOG_INTERVAL`], plus the first and last one.
#[derive(Debug)]
pub struct LogProgress {
    interval: Duration,
    last_logged: Option<Instant>,
    last_seen: Option<TransferProgress>,
    entries: usize,
}

impl LogProgress {
    #[must_use]
    pub const fn new() -> Self {
        Self::with_interval(LOG_INTERVAL)
    }

    #[must_use]
    pub const fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            last_logged: None,
            last_seen: None,
            entries: 0,
        }
    }

    /// Returns `true` when a snapshot is due and records the time.
    fn due(&mut self) -> bool {
        let now = Instant::now();
        let due = self
            .last_logged
            .is_none_or(|last| now.duration_since(last) >= self.interval);
        if due {
            self.last_logged = Some(now);
        }
        due
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for LogProgress {
    fn on_transfer_start(&mut self, total_bytes: Option<u64>) {
        match total_bytes {
            Some(total) => info!(total = %format_bytes(total), "transfer started"),
            None => info!("transfer started, total size unknown"),
        }
    }

    fn on_chunk(&mut self, progress: &TransferProgress) {
        if self.due() {
            info!("{progress}");
            self.last_seen = None;
        } else {
            self.last_seen = Some(*progress);
        }
    }

    fn on_entry_extracted(&mut self, path: &Path) {
        if let Some(progress) = self.last_seen.take() {
            info!("{progress}");
        }
        self.entries += 1;
        debug!(entry = %path.display(), "extracted");
    }

    fn on_complete(&mut self) {
        if let Some(progress) = self.last_seen.take() {
            info!("{progress}");
        }
        info!(entries = self.entries, "extraction finished");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_callback_sized() {
        let mut progress = CliProgress::new("https://example.com/a.zip");
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        progress.on_transfer_start(Some(2048));
        progress.on_chunk(&TransferProgress {
            bytes_transferred: 1024,
            total_bytes: Some(2048),
            elapsed: Duration::from_millis(10),
        });
        assert_eq!(progress.bar.position(), 1024);
        assert_eq!(progress.bar.length(), Some(2048));

        progress.on_entry_extracted(Path::new("a.txt"));
        assert_eq!(progress.entries, 1);
        progress.on_complete();
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn test_progress_callback_unsized() {
        let mut progress = CliProgress::new("https://example.com/a.tar.gz");
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        progress.on_transfer_start(None);
        progress.on_chunk(&TransferProgress {
            bytes_transferred: 4096,
            total_bytes: None,
            elapsed: Duration::from_millis(10),
        });
        assert_eq!(progress.bar.position(), 4096);
        assert!(progress.bar.message().contains("/ unknown"));
        assert!(progress.bar.message().contains("remaining unknown"));
        progress.on_complete();
    }

    fn snapshot(bytes_transferred: u64) -> TransferProgress {
        TransferProgress {
            bytes_transferred,
            total_bytes: Some(300),
            elapsed: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_log_progress_throttles_snapshots() {
        let mut progress = LogProgress::with_interval(Duration::from_secs(3600));

        progress.on_transfer_start(Some(300));
        progress.on_chunk(&snapshot(100));
        assert!(progress.last_seen.is_none());

        progress.on_chunk(&snapshot(200));
        progress.on_chunk(&snapshot(300));
        assert_eq!(progress.last_seen.as_ref().unwrap().bytes_transferred, 300);

        progress.on_entry_extracted(Path::new("a.txt"));
        assert!(progress.last_seen.is_none());
        assert_eq!(progress.entries, 1);
        progress.on_complete();
    }

    #[test]
    fn test_log_progress_zero_interval_logs_every_chunk() {
        let mut progress = LogProgress::with_interval(Duration::ZERO);

        progress.on_chunk(&snapshot(100));
        progress.on_chunk(&snapshot(200));

        assert!(progress.last_seen.is_none());
    }
}
