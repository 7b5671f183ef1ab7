//! Per-run state shared by the pipeline stages.

use tokio_util::sync::CancellationToken;

use crate::FetchConfig;
use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;

/// Borrowed configuration, progress sink and cancellation token for one run.
///
/// A context is built by [`Downloader`](crate::Downloader) for each
/// download, or directly by callers that drive
/// [`dispatch`](crate::dispatch::dispatch) themselves.
///
/// # Examples
///
/// ```
/// use arcfetch_core::FetchConfig;
/// use arcfetch_core::FetchContext;
/// use arcfetch_core::NoopProgress;
/// use tokio_util::sync::CancellationToken;
///
/// let config = FetchConfig::default();
/// let mut progress = NoopProgress;
/// let token = CancellationToken::new();
/// let ctx = FetchContext::new(&config, &mut progress).with_cancel_token(token.clone());
///
/// token.cancel();
/// assert!(ctx.check_cancelled().is_err());
/// ```
pub struct FetchContext<'a> {
    pub(crate) config: &'a FetchConfig,
    pub(crate) progress: &'a mut dyn ProgressCallback,
    pub(crate) cancel: CancellationToken,
}

impl<'a> FetchContext<'a> {
    /// Creates a context with a fresh, never-cancelled token.
    #[must_use]
    pub fn new(config: &'a FetchConfig, progress: &'a mut dyn ProgressCallback) -> Self {
        Self {
            config,
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns the configuration for this run.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        self.config
    }

    /// Returns the cancellation token for this run.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fails with [`FetchError::Cancelled`] once the token has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Cancelled` if cancellation was requested.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FetchContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
