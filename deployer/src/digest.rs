//! Content digests of release artefacts.
//!
//! The plugin manager validates downloads by the MD5 of the DLL, while the
//! plugin list pins each archive by its SHA-256. Both are computed by
//! streaming the file in chunks.

use crate::error::Result;
use camino::Utf8Path;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};

const CHUNK_SIZE: usize = 64 * 1024;

/// A lowercase hex MD5 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Md5Digest(String);

/// A lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Md5Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the MD5 digest of the file at `path`.
///
/// # Errors
///
/// Returns [`crate::error::DeployError::Io`] if the file cannot be read.
pub fn compute_md5(path: &Utf8Path) -> Result<Md5Digest> {
    let mut context = md5::Context::new();
    for_each_chunk(path, |chunk| context.consume(chunk))?;
    Ok(Md5Digest(format!("{:x}", context.compute())))
}

/// Compute the SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns [`crate::error::DeployError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<Sha256Digest> {
    let mut hasher = Sha256::new();
    for_each_chunk(path, |chunk| hasher.update(chunk))?;
    Ok(Sha256Digest(format!("{:x}", hasher.finalize())))
}

fn for_each_chunk(path: &Utf8Path, mut consume: impl FnMut(&[u8])) -> Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = vec![0_u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        consume(&buf[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("temp dir creation succeeds")
    }

    fn write(dir: &TempDir, bytes: &[u8]) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join("artefact.bin")).expect("utf-8 path");
        std::fs::write(&path, bytes).expect("write artefact");
        path
    }

    #[rstest]
    fn md5_of_known_content(temp_dir: TempDir) {
        let path = write(&temp_dir, b"hello world");
        assert_eq!(
            compute_md5(&path).expect("digest").as_str(),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }

    #[rstest]
    fn sha256_of_known_content(temp_dir: TempDir) {
        let path = write(&temp_dir, b"hello world");
        assert_eq!(
            compute_sha256(&path).expect("digest").to_string(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[rstest]
    fn digests_span_multiple_chunks(temp_dir: TempDir) {
        let bytes = vec![0x5A_u8; CHUNK_SIZE * 2 + 17];
        let path = write(&temp_dir, &bytes);
        let expected = format!("{:x}", Sha256::digest(&bytes));
        assert_eq!(compute_sha256(&path).expect("digest").as_str(), expected);
        assert_eq!(
            compute_md5(&path).expect("digest").as_str(),
            format!("{:x}", md5::compute(&bytes))
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = compute_md5(Utf8Path::new("/nonexistent/artefact.bin")).expect_err("missing");
        assert!(matches!(err, crate::error::DeployError::Io(_)));
    }
}
