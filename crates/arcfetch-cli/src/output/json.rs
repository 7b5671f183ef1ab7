//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use arcfetch_core::FetchReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct FetchOutput {
    url: String,
    format: String,
    bytes_downloaded: u64,
    content_length: Option<u64>,
    files_extracted: usize,
    directories_created: usize,
    bytes_written: u64,
    entries_skipped: usize,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl From<&FetchReport> for FetchOutput {
    fn from(report: &FetchReport) -> Self {
        Self {
            url: report.url.clone(),
            format: report.format.to_string(),
            bytes_downloaded: report.bytes_downloaded,
            content_length: report.content_length,
            files_extracted: report.extraction.files_extracted,
            directories_created: report.extraction.directories_created,
            bytes_written: report.extraction.bytes_written,
            entries_skipped: report.extraction.entries_skipped,
            duration_ms: report.duration.as_millis(),
            warnings: report.extraction.warnings.clone(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_fetch_result(&self, report: &FetchReport) -> Result<()> {
        let output = JsonOutput::success("fetch", FetchOutput::from(report));
        Self::output(&output)
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::failure("fetch", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
