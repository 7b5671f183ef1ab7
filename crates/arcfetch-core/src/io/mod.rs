//! Streaming I/O for the transfer body.
//!
//! [`ChunkStream`] turns a response body into bounded chunks and
//! [`ArchiveWriter`] persists them to a temporary [`ArchiveFile`].

pub mod chunks;
pub mod writer;

pub use chunks::ChunkStream;
pub use chunks::ProgressChunks;
pub use writer::ArchiveFile;
pub use writer::ArchiveWriter;
