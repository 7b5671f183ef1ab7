//! Bounded chunk streams over a transfer body.
//!
//! A [`ChunkStream`] yields the body as a finite, single-pass sequence of
//! byte buffers no larger than the configured chunk size, so the payload is
//! never held in memory as a whole. [`ProgressChunks`] wraps a stream and
//! reports a [`TransferProgress`] snapshot after every chunk without
//! touching the bytes.

use std::io::ErrorKind;
use std::io::Read;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::FetchError;
use crate::ProgressCallback;
use crate::Result;
use crate::TransferProgress;

type ChunkIter = Box<dyn Iterator<Item = Result<Vec<u8>>> + Send>;

/// How often a consumer waiting on a blocked read looks at its token.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// A single-pass sequence of body chunks.
///
/// The stream is consumed by value; once exhausted or failed it yields
/// nothing further.
///
/// # Examples
///
/// ```
/// use arcfetch_core::io::ChunkStream;
///
/// let body: &[u8] = b"hello world";
/// let chunks: Vec<Vec<u8>> = ChunkStream::from_reader(body, 4, "memory")
///     .collect::<Result<_, _>>()?;
///
/// assert_eq!(chunks, vec![b"hell".to_vec(), b"o wo".to_vec(), b"rld".to_vec()]);
/// # Ok::<(), arcfetch_core::FetchError>(())
/// ```
pub struct ChunkStream {
    inner: ChunkIter,
    total_bytes: Option<u64>,
}

impl ChunkStream {
    /// Reads `reader` in chunks of at most `chunk_size` bytes.
    ///
    /// Read failures are reported as [`FetchError::Network`] against
    /// `source`, which is normally the URL being fetched.
    #[must_use]
    pub fn from_reader(
        reader: impl Read + Send + 'static,
        chunk_size: usize,
        source: impl Into<String>,
    ) -> Self {
        Self {
            inner: Box::new(ReaderChunks {
                reader: Box::new(reader),
                chunk_size: chunk_size.max(1),
                source: source.into(),
                done: false,
            }),
            total_bytes: None,
        }
    }

    /// Builds a stream from buffers that are already in memory.
    #[must_use]
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(chunks.into_iter().map(Ok)),
            total_bytes: None,
        }
    }

    /// Records the size the producer announced for the whole stream.
    ///
    /// The value is informational and only used for progress reporting.
    #[must_use]
    pub const fn with_total_bytes(mut self, total_bytes: Option<u64>) -> Self {
        self.total_bytes = total_bytes;
        self
    }

    /// Returns the announced total size, if any.
    #[must_use]
    pub const fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Moves the reads onto a background thread so that cancelling `token`
    /// ends the stream with [`FetchError::Cancelled`] even while a read is
    /// blocked on the network.
    ///
    /// At most one chunk is buffered ahead of the consumer. A reader thread
    /// stuck in a read after cancellation is detached and exits when that
    /// read returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader thread cannot be spawned.
    pub fn cancellable(self, token: CancellationToken) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel(1);
        let inner = self.inner;
        thread::Builder::new()
            .name("arcfetch-body".to_string())
            .spawn(move || {
                for item in inner {
                    if tx.send(item).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            inner: Box::new(CancellableChunks {
                rx,
                token,
                done: false,
            }),
            total_bytes: self.total_bytes,
        })
    }

    /// Wraps the stream so every chunk is reported to `progress`.
    pub fn with_progress(self, progress: &mut dyn ProgressCallback) -> ProgressChunks<'_> {
        ProgressChunks::new(self, progress)
    }
}

impl Iterator for ChunkStream {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}

struct ReaderChunks {
    reader: Box<dyn Read + Send>,
    chunk_size: usize,
    source: String,
    done: bool,
}

impl ReaderChunks {
    /// Fills one chunk, stopping early only at end of input.
    fn fill(&mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl Iterator for ReaderChunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(chunk) if chunk.is_empty() => {
                self.done = true;
                None
            }
            Ok(chunk) => {
                if chunk.len() < self.chunk_size {
                    self.done = true;
                }
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(FetchError::network(&self.source, e)))
            }
        }
    }
}

/// Receiving half of [`ChunkStream::cancellable`].
struct CancellableChunks {
    rx: Receiver<Result<Vec<u8>>>,
    token: CancellationToken,
    done: bool,
}

impl Iterator for CancellableChunks {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if self.token.is_cancelled() {
                self.done = true;
                return Some(Err(FetchError::Cancelled));
            }
            match self.rx.recv_timeout(CANCEL_POLL) {
                Ok(item) => return Some(item),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

/// Chunk stream adapter that reports transfer progress.
///
/// Chunks pass through unchanged and in order. The callback receives
/// `on_transfer_start` before the first read and a snapshot after each
/// chunk.
pub struct ProgressChunks<'a> {
    stream: ChunkStream,
    progress: &'a mut dyn ProgressCallback,
    started: Option<Instant>,
    bytes_transferred: u64,
}

impl<'a> ProgressChunks<'a> {
    fn new(stream: ChunkStream, progress: &'a mut dyn ProgressCallback) -> Self {
        Self {
            stream,
            progress,
            started: None,
            bytes_transferred: 0,
        }
    }

    /// Returns the bytes delivered so far.
    #[must_use]
    pub const fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }
}

impl Iterator for ProgressChunks<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let started = *self.started.get_or_insert_with(|| {
            self.progress.on_transfer_start(self.stream.total_bytes());
            Instant::now()
        });

        let item = self.stream.next()?;
        if let Ok(chunk) = &item {
            self.bytes_transferred = self.bytes_transferred.saturating_add(chunk.len() as u64);
            self.progress.on_chunk(&TransferProgress {
                bytes_transferred: self.bytes_transferred,
                total_bytes: self.stream.total_bytes(),
                elapsed: started.elapsed(),
            });
        }
        Some(item)
    }
}
