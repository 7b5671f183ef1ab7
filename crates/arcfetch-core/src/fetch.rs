//! Streaming HTTP download driving the extraction pipeline.
//!
//! [`Downloader`] opens the transfer through a [`Transport`], checks the
//! status, routes on the declared content type, then hands the body to
//! [`dispatch`](crate::dispatch) as a bounded [`ChunkStream`].

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::FetchConfig;
use crate::FetchContext;
use crate::FetchError;
use crate::FetchReport;
use crate::ProgressCallback;
use crate::Result;
use crate::dispatch;
use crate::io::ChunkStream;

/// HTTP status that counts as a successful transfer.
const STATUS_OK: u16 = 200;

/// An open transfer: status line, the headers the pipeline uses, and the
/// unread body.
pub struct TransferResponse {
    /// HTTP status code.
    pub status: u16,

    /// Raw `Content-Type` header value.
    pub content_type: Option<String>,

    /// Declared `Content-Length`.
    pub content_length: Option<u64>,

    /// The response body, read incrementally.
    pub body: Box<dyn Read + Send>,
}

impl TransferResponse {
    /// Turns the body into a chunk stream of at most `chunk_size` bytes per
    /// chunk. Read failures are attributed to `url`.
    #[must_use]
    pub fn into_chunks(self, chunk_size: usize, url: &str) -> ChunkStream {
        ChunkStream::from_reader(self.body, chunk_size, url).with_total_bytes(self.content_length)
    }
}

impl fmt::Debug for TransferResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Opens streaming GET requests.
///
/// Implementations must not buffer the body: the returned reader should
/// pull bytes from the connection as it is read.
pub trait Transport: Send + Sync {
    /// Sends a GET request for `url`.
    ///
    /// Any status code is a successful return; only connection-level
    /// failures are errors.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the request cannot be sent.
    fn get(&self, url: &str) -> Result<TransferResponse>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a client with the timeouts and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout);
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build().map_err(std::io::Error::other)?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<TransferResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::network(url, e))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(TransferResponse {
            status: response.status().as_u16(),
            content_type,
            content_length: response.content_length(),
            body: Box::new(response),
        })
    }
}

/// Downloads an archive and extracts it into a directory.
///
/// # Examples
///
/// ```no_run
/// use arcfetch_core::Downloader;
/// use arcfetch_core::FetchConfig;
/// use arcfetch_core::NoopProgress;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::new(FetchConfig::default())?;
/// let report = downloader.download(
///     "https://example.com/data.tar.gz",
///     Path::new("data"),
///     &mut NoopProgress,
/// )?;
/// println!("Extracted {} files", report.extraction.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Downloader<T = ReqwestTransport> {
    transport: T,
    config: FetchConfig,
    cancel: CancellationToken,
}

impl Downloader<ReqwestTransport> {
    /// Creates a downloader that uses a `reqwest` client built from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> Downloader<T> {
    /// Creates a downloader over a custom transport.
    #[must_use]
    pub fn with_transport(transport: T, config: FetchConfig) -> Self {
        Self {
            transport,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token.
    ///
    /// Cancelling the token stops the run with [`FetchError::Cancelled`]:
    /// during the transfer within a poll interval, even if the server has
    /// stopped sending, and during extraction at the next entry.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the cancellation token used by this downloader.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches `url` and extracts the archive into `output_dir`.
    ///
    /// The status must be exactly 200 and the content type must be
    /// `application/x-gzip` or `application/zip`; both are checked before
    /// the body is read and before anything is written to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The connection fails (`Network`) or the status is not 200
    ///   (`Transfer`)
    /// - The content type is missing or unsupported (`UnsupportedFormat`)
    /// - An entry escapes the output directory (`PathTraversal`)
    /// - The archive is corrupt or a write fails
    /// - The run is cancelled (`Cancelled`)
    pub fn download(
        &self,
        url: &str,
        output_dir: &Path,
        progress: &mut dyn ProgressCallback,
    ) -> Result<FetchReport> {
        let start = Instant::now();
        self.config.validate()?;
        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        info!(url, output = %output_dir.display(), "starting download");
        let response = self.transport.get(url)?;
        debug!(
            status = response.status,
            content_type = response.content_type.as_deref(),
            content_length = response.content_length,
            "response received"
        );

        if response.status != STATUS_OK {
            return Err(FetchError::Transfer {
                url: url.to_string(),
                status: response.status,
            });
        }

        let format = dispatch::route(response.content_type.as_deref())?;
        let content_length = response.content_length;
        let chunks = response
            .into_chunks(self.config.chunk_size, url)
            .cancellable(self.cancel.clone())?;

        let (bytes_downloaded, extraction) = {
            let mut ctx = FetchContext::new(&self.config, &mut *progress)
                .with_cancel_token(self.cancel.clone());
            dispatch::dispatch_format(&format, chunks, output_dir, &mut ctx)?
        };

        if let Some(expected) = content_length
            && expected != bytes_downloaded
        {
            warn!(
                url,
                expected,
                received = bytes_downloaded,
                "body length differs from Content-Length"
            );
        }

        progress.on_complete();
        info!(url, bytes = bytes_downloaded, %format, "download complete");

        Ok(FetchReport {
            url: url.to_string(),
            format,
            bytes_downloaded,
            content_length,
            extraction,
            duration: start.elapsed(),
        })
    }
}
