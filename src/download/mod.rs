//! Checksum-verified downloads.
//!
//! Bytes are hashed while they are written to a temporary file next to the
//! destination. A file whose checksum does not match is deleted before the
//! error is returned, so a bad download never lingers at its final path.
use crate::config::{CatalogConfig, DEFAULT_DOWNLOAD_BUFFER};
use log::{debug, warn};
use sha2::{Digest as _, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind, Read, Write as _};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Checksum of '{}' does not match: expected {expected}, got {actual}", path.display())]
    ChecksumDoesNotMatch { path: PathBuf, expected: String, actual: String },
}

pub type Result<T> = std::result::Result<T, DownloadError>;

/// Streams `reader` into `dest`, returning the SHA-256 of what was written.
///
/// With `expected_sha256` set, a mismatch removes the partial file and
/// returns `ChecksumDoesNotMatch`; `dest` is left untouched.
pub fn save_stream<R: Read>(reader: R, dest: &Path, expected_sha256: Option<&str>) -> Result<String> {
    save_stream_buffered(reader, dest, expected_sha256, DEFAULT_DOWNLOAD_BUFFER)
}

/// `save_stream` reading through `config.download_buffer_size` byte chunks.
pub fn save_stream_with_config<R: Read>(
    reader: R,
    dest: &Path,
    expected_sha256: Option<&str>,
    config: &CatalogConfig,
) -> Result<String> {
    save_stream_buffered(reader, dest, expected_sha256, config.download_buffer_size)
}

pub fn save_stream_buffered<R: Read>(
    mut reader: R,
    dest: &Path,
    expected_sha256: Option<&str>,
    buffer_size: usize,
) -> Result<String> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; buffer_size.max(1)];
    let mut written = 0usize;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buffer[..n]);
        tmp.write_all(&buffer[..n])?;
        written += n;
    }
    tmp.flush()?;

    let actual = format!("{:x}", hasher.finalize());
    if let Some(expected) = expected_sha256 {
        if !expected.trim().eq_ignore_ascii_case(&actual) {
            tmp.close()?;
            warn!("Discarded download for '{}': checksum mismatch", dest.display());
            return Err(DownloadError::ChecksumDoesNotMatch {
                path: dest.to_path_buf(),
                expected: expected.trim().to_ascii_lowercase(),
                actual,
            });
        }
    }

    tmp.persist(dest).map_err(|e| e.error)?;
    debug!("Saved {} bytes to '{}' (sha256 {})", written, dest.display(), actual);
    Ok(actual)
}

/// SHA-256 of a file, as lowercase hex.
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut reader = BufReader::with_capacity(DEFAULT_DOWNLOAD_BUFFER, File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Checks an existing file against `expected`, deleting it on mismatch.
pub fn verify_file_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = file_sha256(path)?;
    if expected.trim().eq_ignore_ascii_case(&actual) {
        return Ok(());
    }
    fs::remove_file(path)?;
    warn!("Deleted '{}': checksum mismatch", path.display());
    Err(DownloadError::ChecksumDoesNotMatch {
        path: path.to_path_buf(),
        expected: expected.trim().to_ascii_lowercase(),
        actual,
    })
}
