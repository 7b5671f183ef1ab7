//! Integration tests for arcfetch-core.
//!
//! These tests drive the full download, dispatch and extraction pipeline
//! against an in-memory transport with real filesystem operations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use arcfetch_core::Downloader;
use arcfetch_core::FetchConfig;
use arcfetch_core::FetchError;
use arcfetch_core::NoopProgress;
use arcfetch_core::formats::ArchiveFormat;
use arcfetch_core::test_utils::CancellingProgress;
use arcfetch_core::test_utils::RecordingProgress;
use arcfetch_core::test_utils::StaticTransport;
use arcfetch_core::test_utils::TarTestBuilder;
use arcfetch_core::test_utils::ZipTestBuilder;
use arcfetch_core::test_utils::create_test_tar_gz;
use arcfetch_core::test_utils::create_test_zip;
use arcfetch_core::test_utils::gzip;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

const URL: &str = "http://archive.test/dataset";

/// Working area: `tmp/` receives temporary archives, `data/` is the output.
struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        fs::create_dir(temp.path().join("tmp")).unwrap();
        Self { temp }
    }

    fn tmp(&self) -> PathBuf {
        self.temp.path().join("tmp")
    }

    fn output(&self) -> PathBuf {
        self.temp.path().join("data")
    }

    fn downloader(&self, transport: StaticTransport) -> Downloader<StaticTransport> {
        let config = FetchConfig::default()
            .with_chunk_size(1024)
            .with_temp_dir(Some(self.tmp()));
        Downloader::with_transport(transport, config)
    }

    /// Every file below the workspace, relative to it.
    fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(self.temp.path())
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| !e.file_type().is_dir())
            .map(|e| e.path().strip_prefix(self.temp.path()).unwrap().to_path_buf())
            .collect();
        files.sort();
        files
    }

    fn temporaries(&self) -> Vec<PathBuf> {
        fs::read_dir(self.tmp())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }
}

#[test]
fn test_tar_gz_end_to_end() {
    let ws = Workspace::new();
    let body = create_test_tar_gz(vec![
        ("a.txt", b"alpha".as_slice()),
        ("sub/b.txt", b"beta".as_slice()),
        ("sub/deeper/c.txt", b"gamma".as_slice()),
    ]);

    let report = ws
        .downloader(StaticTransport::ok("application/x-gzip", body))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();

    assert_eq!(report.format, ArchiveFormat::TarGz);
    assert_eq!(report.extraction.files_extracted, 3);
    assert_eq!(
        ws.files(),
        vec![
            PathBuf::from("data/a.txt"),
            PathBuf::from("data/sub/b.txt"),
            PathBuf::from("data/sub/deeper/c.txt"),
        ]
    );
    assert_eq!(fs::read(ws.output().join("sub/deeper/c.txt")).unwrap(), b"gamma");
}

#[test]
fn test_zip_end_to_end() {
    let ws = Workspace::new();
    let body = ZipTestBuilder::new()
        .add_directory("empty/")
        .add_file("a.txt", b"alpha")
        .add_file("sub/b.txt", b"beta")
        .build();

    let report = ws
        .downloader(StaticTransport::ok("application/zip", body))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();

    assert_eq!(report.format, ArchiveFormat::Zip);
    assert_eq!(report.extraction.files_extracted, 2);
    assert_eq!(report.extraction.directories_created, 1);
    assert!(ws.output().join("empty").is_dir());
    assert_eq!(fs::read(ws.output().join("sub/b.txt")).unwrap(), b"beta");
}

#[test]
fn test_content_type_parameters_and_case() {
    let ws = Workspace::new();
    let body = create_test_zip(vec![("a.txt", b"alpha".as_slice())]);

    ws.downloader(StaticTransport::ok("Application/ZIP; name=\"a.zip\"", body))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();

    assert!(ws.output().join("a.txt").is_file());
}

#[test]
fn test_existing_output_directory_is_reused() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.output()).unwrap();
    fs::write(ws.output().join("keep.txt"), b"keep").unwrap();
    let body = create_test_zip(vec![("a.txt", b"alpha".as_slice())]);

    ws.downloader(StaticTransport::ok("application/zip", body))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();

    assert_eq!(fs::read(ws.output().join("keep.txt")).unwrap(), b"keep");
    assert!(ws.output().join("a.txt").is_file());
}

#[test]
fn test_tar_traversal_leaves_nothing_behind() {
    let ws = Workspace::new();
    let body = gzip(
        &TarTestBuilder::new()
            .add_file("a.txt", b"alpha")
            .add_file("sub/b.txt", b"beta")
            .add_raw_file("../../etc/passthrough", b"evil")
            .build(),
    );

    let result = ws
        .downloader(StaticTransport::ok("application/x-gzip", body))
        .download(URL, &ws.output(), &mut NoopProgress);

    let err = result.unwrap_err();
    assert!(err.is_security_violation());
    assert_eq!(err.entry(), Some(Path::new("../../etc/passthrough")));
    assert!(ws.files().is_empty(), "unexpected files: {:?}", ws.files());
    assert!(!ws.temp.path().join("etc").exists());
}

#[test]
fn test_zip_traversal_leaves_nothing_behind() {
    let ws = Workspace::new();
    let body = ZipTestBuilder::new()
        .add_file("a.txt", b"alpha")
        .add_file("sub/../../../escape.txt", b"evil")
        .build();

    let result = ws
        .downloader(StaticTransport::ok("application/zip", body))
        .download(URL, &ws.output(), &mut NoopProgress);

    assert!(matches!(result, Err(FetchError::PathTraversal { .. })));
    assert!(ws.files().is_empty(), "unexpected files: {:?}", ws.files());
}

#[test]
fn test_sibling_prefix_directory_not_reachable() {
    let ws = Workspace::new();
    let body = gzip(
        &TarTestBuilder::new()
            .add_raw_file("../data-other/evil", b"evil")
            .build(),
    );

    let result = ws
        .downloader(StaticTransport::ok("application/x-gzip", body))
        .download(URL, &ws.output(), &mut NoopProgress);

    assert!(matches!(result, Err(FetchError::PathTraversal { .. })));
    assert!(!ws.temp.path().join("data-other").exists());
}

#[test]
fn test_transfer_errors_create_nothing() {
    for status in [404_u16, 500] {
        let ws = Workspace::new();
        let body = create_test_zip(vec![("a.txt", b"alpha".as_slice())]);

        let result = ws
            .downloader(StaticTransport::ok("application/zip", body).with_status(status))
            .download(URL, &ws.output(), &mut NoopProgress);

        assert!(matches!(result, Err(FetchError::Transfer { .. })));
        assert!(ws.temporaries().is_empty());
        assert!(!ws.output().exists());
    }
}

#[test]
fn test_unsupported_format_creates_nothing() {
    let ws = Workspace::new();

    let result = ws
        .downloader(StaticTransport::ok("application/octet-stream", vec![0u8; 64]))
        .download(URL, &ws.output(), &mut NoopProgress);

    let err = result.unwrap_err();
    assert!(matches!(
        err,
        FetchError::UnsupportedFormat { content_type: Some(ref ct) } if ct == "application/octet-stream"
    ));
    assert!(ws.temporaries().is_empty());
    assert!(!ws.output().exists());
}

#[test]
fn test_no_temporaries_after_success_or_failure() {
    let ws = Workspace::new();
    let good = create_test_tar_gz(vec![("a.txt", b"alpha".as_slice())]);
    let corrupt = b"\x1f\x8b garbage that is not deflate".to_vec();

    ws.downloader(StaticTransport::ok("application/x-gzip", good))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();
    assert!(ws.temporaries().is_empty());

    let result = ws
        .downloader(StaticTransport::ok("application/x-gzip", corrupt))
        .download(URL, &ws.temp.path().join("other"), &mut NoopProgress);
    assert!(result.is_err());
    assert!(ws.temporaries().is_empty());
}

#[test]
fn test_truncated_transfer_is_network_error() {
    let ws = Workspace::new();
    let body = create_test_zip(vec![("a.txt", vec![b'x'; 10_000].as_slice())]);

    let result = ws
        .downloader(StaticTransport::ok("application/zip", body).truncated_after(3000))
        .download(URL, &ws.output(), &mut NoopProgress);

    assert!(matches!(result, Err(FetchError::Network { .. })));
    assert!(ws.temporaries().is_empty());
    assert!(!ws.output().exists());
}

#[test]
fn test_missing_content_length_degrades_progress_only() {
    let ws = Workspace::new();
    let payload = vec![b'z'; 5000];
    let body = create_test_zip(vec![("big.bin", payload.as_slice())]);

    let mut progress = RecordingProgress::default();
    let report = ws
        .downloader(StaticTransport::ok("application/zip", body.clone()).without_content_length())
        .download(URL, &ws.output(), &mut progress)
        .unwrap();

    assert_eq!(report.bytes_downloaded, body.len() as u64);
    assert_eq!(fs::read(ws.output().join("big.bin")).unwrap(), payload);
    assert_eq!(progress.transfer_started, Some(None));
    assert!(progress.chunks.len() > 1);
    for snapshot in &progress.chunks {
        assert_eq!(snapshot.total_bytes, None);
        assert!(snapshot.to_string().contains("/ unknown"));
        assert!(snapshot.to_string().ends_with("remaining unknown"));
    }
}

#[test]
fn test_wrong_content_length_does_not_change_output() {
    let ws = Workspace::new();
    let body = create_test_zip(vec![("a.txt", b"alpha".as_slice())]);
    let len = body.len() as u64;

    let report = ws
        .downloader(StaticTransport::ok("application/zip", body).with_content_length(Some(len / 2)))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();

    assert_eq!(report.bytes_downloaded, len);
    assert_eq!(report.content_length, Some(len / 2));
    assert_eq!(fs::read(ws.output().join("a.txt")).unwrap(), b"alpha");
}

#[test]
fn test_progress_is_monotonic() {
    let ws = Workspace::new();
    let body = create_test_zip(vec![("big.bin", vec![7u8; 20_000].as_slice())]);
    let len = body.len() as u64;

    let mut progress = RecordingProgress::default();
    ws.downloader(StaticTransport::ok("application/zip", body))
        .download(URL, &ws.output(), &mut progress)
        .unwrap();

    assert_eq!(progress.transfer_started, Some(Some(len)));
    let counts: Vec<u64> = progress.chunks.iter().map(|p| p.bytes_transferred).collect();
    assert!(counts.windows(2).all(|w| w[0] < w[1]));
    assert!(progress.chunks.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
    assert_eq!(counts.last().copied(), Some(len));
    assert_eq!(progress.entries, vec![PathBuf::from("big.bin")]);
    assert!(progress.completed);
}

#[test]
fn test_cancel_during_transfer() {
    let ws = Workspace::new();
    let body = create_test_zip(vec![("big.bin", vec![1u8; 50_000].as_slice())]);
    let token = CancellationToken::new();
    let mut progress = CancellingProgress::new(token.clone(), 3);

    let result = ws
        .downloader(StaticTransport::ok("application/zip", body))
        .with_cancel_token(token)
        .download(URL, &ws.output(), &mut progress);

    assert!(matches!(result, Err(FetchError::Cancelled)));
    assert_eq!(progress.chunks_seen(), 3);
    assert!(ws.temporaries().is_empty());
    assert!(!ws.output().exists());
}

#[test]
fn test_links_in_tarball_are_not_created() {
    let ws = Workspace::new();
    let body = gzip(
        &TarTestBuilder::new()
            .add_file("real.txt", b"real")
            .add_symlink("escape", "../../../../etc")
            .add_hardlink("hard", "real.txt")
            .add_fifo("pipe")
            .build(),
    );

    let report = ws
        .downloader(StaticTransport::ok("application/x-gzip", body))
        .download(URL, &ws.output(), &mut NoopProgress)
        .unwrap();

    assert_eq!(report.extraction.files_extracted, 1);
    assert_eq!(report.extraction.entries_skipped, 3);
    assert_eq!(ws.files(), vec![PathBuf::from("data/real.txt")]);
}
