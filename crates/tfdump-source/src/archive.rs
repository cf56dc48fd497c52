//! Artifact archive extraction.
//!
//! Artifacts are gzip-compressed tarballs. Plain tar is accepted as well;
//! the format is sniffed from the payload, not from a file name.

use std::io::Read;
use std::path::Path;

use tfdump_common::error::{Result, TfdumpError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extracts an in-memory archive into `target`, preserving relative paths.
///
/// Entries that would land outside `target` are skipped. Returns the number
/// of entries unpacked.
///
/// # Errors
///
/// Returns `TfdumpError::Io` if `target` cannot be created and
/// `TfdumpError::Extraction` if the archive is malformed.
pub fn extract_archive(data: &[u8], target: &Path) -> Result<usize> {
    tracing::info!(target = %target.display(), bytes = data.len(), "extracting artifact");

    std::fs::create_dir_all(target).map_err(|e| TfdumpError::Io {
        path: target.to_path_buf(),
        source: e,
    })?;

    let unpacked = if is_gzip(data) {
        unpack(tar::Archive::new(flate2::read::GzDecoder::new(data)), target)?
    } else {
        unpack(tar::Archive::new(data), target)?
    };

    tracing::info!(entries = unpacked, "artifact extracted");
    Ok(unpacked)
}

fn unpack<R: Read>(mut archive: tar::Archive<R>, target: &Path) -> Result<usize> {
    let entries = archive.entries().map_err(malformed)?;
    let mut unpacked = 0;
    for entry in entries {
        let mut entry = entry.map_err(malformed)?;
        let path = entry.path().map_err(malformed)?.into_owned();
        let inside = entry.unpack_in(target).map_err(|e| TfdumpError::Extraction {
            message: format!("{}: {e}", path.display()),
        })?;
        if inside {
            unpacked += 1;
        } else {
            tracing::warn!(path = %path.display(), "skipping archive entry outside target");
        }
    }
    Ok(unpacked)
}

fn malformed(e: std::io::Error) -> TfdumpError {
    TfdumpError::Extraction {
        message: e.to_string(),
    }
}

fn is_gzip(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, name, *data)
                .expect("failed to append data");
        }
        builder.into_inner().expect("failed to finish tar")
    }

    fn tar_gz_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        use std::io::Write;
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&tar_bytes(files))
            .expect("failed to compress");
        encoder.finish().expect("failed to finish gzip")
    }

    #[test]
    fn extract_gzip_tar_preserves_relative_paths() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let data = tar_gz_bytes(&[
            ("main.tf", b"terraform {}"),
            ("modules/net/main.tf", b"# net"),
        ]);

        let count = extract_archive(&data, dir.path()).expect("extract failed");
        assert_eq!(count, 2);
        let content =
            std::fs::read_to_string(dir.path().join("modules/net/main.tf")).expect("read failed");
        assert_eq!(content, "# net");
    }

    #[test]
    fn extract_plain_tar_is_accepted() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let data = tar_bytes(&[("hello.txt", b"hello from artifact")]);

        let _ = extract_archive(&data, dir.path()).expect("extract failed");
        let content = std::fs::read_to_string(dir.path().join("hello.txt")).expect("read failed");
        assert_eq!(content, "hello from artifact");
    }

    #[test]
    fn extract_creates_missing_target() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let target = dir.path().join("nested").join("out");
        let data = tar_gz_bytes(&[("a.tf", b"")]);

        let _ = extract_archive(&data, &target).expect("extract failed");
        assert!(target.join("a.tf").exists());
    }

    #[test]
    fn extract_garbage_is_extraction_error() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let err = extract_archive(b"definitely not a tarball", dir.path())
            .expect_err("should fail");
        assert!(matches!(err, TfdumpError::Extraction { .. }));
    }

    #[test]
    fn extract_truncated_gzip_is_extraction_error() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut data = tar_gz_bytes(&[("main.tf", &[b'x'; 4096])]);
        data.truncate(data.len() / 2);
        let err = extract_archive(&data, dir.path()).expect_err("should fail");
        assert!(matches!(err, TfdumpError::Extraction { .. }));
    }

    #[test]
    fn is_gzip_detects_magic_bytes() {
        assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzip(b"ustar"));
        assert!(!is_gzip(&[]));
    }
}
