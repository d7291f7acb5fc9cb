//! Binary content sources for file/media resources.
//!
//! Grounded on `plastron-models/src/plastron/files/__init__.py::BinarySource`
//! and its `StringSource`. Only in-memory and local-file sources are
//! implemented; SFTP/HTTP/ZIP sources are documented extension points
//! (out-of-scope external collaborators).

use std::io::Read;
use std::path::{Path, PathBuf};

/// Where the bytes of a binary (file/media) resource come from.
pub trait BinarySource {
    /// Opens a fresh reader over the source's bytes.
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>>;

    fn mimetype(&self) -> &str;

    fn exists(&self) -> bool;

    /// Size in bytes, if cheaply knowable without reading the whole source.
    fn len(&self) -> Option<u64> {
        None
    }

    /// A hex-encoded SHA-1 digest of the source's bytes, prefixed
    /// `sha1=`, matching Fedora's `Content-Digest`/`Digest` header
    /// convention. Reads the whole source once; implementations with a
    /// cheaper way to know this (e.g. a repository-stored binary whose
    /// digest the server already computed) should override it.
    fn digest(&self) -> std::io::Result<String> {
        use sha1::{Digest, Sha1};
        let mut hasher = Sha1::new();
        let mut reader = self.open()?;
        std::io::copy(&mut reader, &mut hasher)?;
        Ok(format!("sha1={:x}", hasher.finalize()))
    }
}

/// An in-memory binary source, e.g. a generated thumbnail or fixture data
/// in a test. Grounded on `files/__init__.py::StringSource`.
pub struct BytesSource {
    bytes: Vec<u8>,
    mimetype: String,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Vec<u8>>, mimetype: impl Into<String>) -> Self {
        BytesSource { bytes: bytes.into(), mimetype: mimetype.into() }
    }
}

impl BinarySource for BytesSource {
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(std::io::Cursor::new(self.bytes.clone())))
    }

    fn mimetype(&self) -> &str {
        &self.mimetype
    }

    fn exists(&self) -> bool {
        true
    }

    fn len(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }
}

/// A binary source backed by a file on local disk.
pub struct FileSource {
    path: PathBuf,
    mimetype: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, mimetype: impl Into<String>) -> Self {
        FileSource { path: path.into(), mimetype: mimetype.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BinarySource for FileSource {
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(std::fs::File::open(&self.path)?))
    }

    fn mimetype(&self) -> &str {
        &self.mimetype
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn len(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn test_bytes_source_roundtrip() {
        let source = BytesSource::new(b"hello".to_vec(), "text/plain");
        assert!(source.exists());
        assert_eq!(source.len(), Some(5));
        let mut buf = String::new();
        source.open().unwrap().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "hello");
    }

    #[test]
    fn test_file_source_missing_file_does_not_exist() {
        let source = FileSource::new("/nonexistent/path/for/test", "application/octet-stream");
        assert!(!source.exists());
    }

    #[test]
    fn test_digest_matches_known_sha1() {
        let source = BytesSource::new(b"hello".to_vec(), "text/plain");
        assert_eq!(source.digest().unwrap(), "sha1=aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }
}
