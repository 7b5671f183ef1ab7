//! Configuration for download-and-extract operations.

use std::path::PathBuf;
use std::time::Duration;

use crate::FetchError;
use crate::Result;

/// Default number of bytes pulled from the network per read (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a [`Downloader`](crate::Downloader).
///
/// Controls chunking, where the temporary archive lives, and the
/// transport timeouts. None of these settings affect which bytes end up on
/// disk.
///
/// # Examples
///
/// ```
/// use arcfetch_core::FetchConfig;
/// use std::time::Duration;
///
/// // Use defaults
/// let config = FetchConfig::default();
///
/// // Customize for specific needs
/// let custom = FetchConfig::default()
///     .with_chunk_size(256 * 1024)
///     .with_timeout(Some(Duration::from_secs(600)));
/// ```
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum number of bytes read from the response per chunk.
    ///
    /// Default: 1 MiB.
    pub chunk_size: usize,

    /// Directory where the temporary archive is written.
    ///
    /// `None` means the current working directory.
    ///
    /// Default: `None`.
    pub temp_dir: Option<PathBuf>,

    /// Whole-request timeout, including reading the body.
    ///
    /// Default: `None` (large archives may take arbitrarily long).
    pub timeout: Option<Duration>,

    /// Timeout for establishing the connection.
    ///
    /// Default: 30 seconds.
    pub connect_timeout: Option<Duration>,

    /// `User-Agent` header sent with the request.
    ///
    /// Default: `arcfetch/<version>`.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            temp_dir: None,
            timeout: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            user_agent: concat!("arcfetch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchConfig {
    /// Creates a new `FetchConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the directory for the temporary archive.
    #[must_use]
    pub fn with_temp_dir(mut self, temp_dir: Option<PathBuf>) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the whole-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the directory the temporary archive is created in.
    pub(crate) fn temp_dir_or_cwd(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunk size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "chunk size must be greater than zero",
            )));
        }
        Ok(())
    }
}
