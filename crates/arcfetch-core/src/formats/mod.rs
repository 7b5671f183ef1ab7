//! Archive format resolution and extractors.

pub(crate) mod common;
pub mod detect;
pub mod tar;
pub mod traits;
pub mod zip;

pub use detect::ArchiveFormat;
pub use tar::TarExtractor;
pub use traits::Extractor;
pub use zip::ZipExtractor;
