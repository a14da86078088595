//! Archive origin tests
//!
//! Serves the archive from an in-test HTTP listener so the download path is
//! exercised without touching the network.

use std::io::{Read, Write};
use std::net::TcpListener;

use srcsync::{Origin, PinSet, RemoteCheck, RepoStatus, SourceDescriptor, evaluate, fetch};
use tempfile::TempDir;

/// Serve one HTTP response on an ephemeral loopback port.
fn serve_once(body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept connection");
        let mut request = [0u8; 4096];
        let _ = stream.read(&mut request);
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(header.as_bytes()).expect("Failed to write header");
        stream.write_all(body).expect("Failed to write body");
    });

    format!("http://{addr}/archive.tar.gz")
}

fn archive_descriptor(temp: &TempDir, url: String) -> SourceDescriptor {
    SourceDescriptor::new("tarball", Origin::Archive { url }, temp.path().join("src"))
        .with_archive_file(temp.path().join("archive.tar.gz"))
}

#[test]
fn test_archive_missing_then_downloaded_then_good() {
    let temp = TempDir::new().unwrap();
    let url = serve_once(b"archive payload bytes");
    let source = archive_descriptor(&temp, url);

    assert_eq!(evaluate(&source, RemoteCheck::All).unwrap(), RepoStatus::Missing);

    fetch(&PinSet::new(), &source).unwrap();

    let contents = std::fs::read(&source.source_archive_file).unwrap();
    assert_eq!(contents, b"archive payload bytes");
    assert_eq!(evaluate(&source, RemoteCheck::All).unwrap(), RepoStatus::Good);
}

#[test]
fn test_archive_download_overwrites_existing_file() {
    let temp = TempDir::new().unwrap();
    let url = serve_once(b"fresh contents");
    let source = archive_descriptor(&temp, url);

    std::fs::write(&source.source_archive_file, b"stale contents").unwrap();

    fetch(&PinSet::new(), &source).unwrap();

    let contents = std::fs::read(&source.source_archive_file).unwrap();
    assert_eq!(contents, b"fresh contents");
}

#[test]
fn test_archive_download_creates_parent_directory() {
    let temp = TempDir::new().unwrap();
    let url = serve_once(b"payload");
    let source = SourceDescriptor::new(
        "tarball",
        Origin::Archive { url },
        temp.path().join("deep/nested/src"),
    )
    .with_archive_file(temp.path().join("deep/nested/archive.tar.gz"));

    fetch(&PinSet::new(), &source).unwrap();

    assert!(source.source_archive_file.is_file());
}
