//! Output formatter trait for CLI results.

use anyhow::Result;
use arcfetch_core::FetchReport;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a completed fetch
    fn format_fetch_result(&self, report: &FetchReport) -> Result<()>;

    /// Format error message (shown even in quiet mode)
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Envelope for every JSON document printed on stdout
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: &'static str,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub const fn success(operation: &'static str, data: T) -> Self {
        Self {
            operation,
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub const fn failure(operation: &'static str, error: String) -> Self {
        Self {
            operation,
            status: Status::Error,
            data: None,
            error: Some(error),
        }
    }
}
