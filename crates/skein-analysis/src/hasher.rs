//! Streaming file hashing.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Read buffer size for hash streaming.
const CHUNK_SIZE: usize = 64 * 1024;

/// Size and content hash of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// File size in bytes (from stat).
    pub size: u64,
    /// Lowercase hex SHA-256 of the file bytes (64 chars).
    pub hash_hex: String,
}

/// Hash a file's contents, streaming chunks through SHA-256.
pub fn hash_file(path: &Path) -> io::Result<HashedFile> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(HashedFile {
        size,
        hash_hex: format!("{:x}", hasher.finalize()),
    })
}

/// Best-effort variant of [`hash_file`]; unreadable paths yield `None`.
pub fn try_hash_file(path: &Path) -> Option<HashedFile> {
    hash_file(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn hashes_known_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, b"hello").unwrap();
        let hashed = hash_file(&path).unwrap();
        assert_eq!(hashed.size, 5);
        // sha256("hello")
        assert_eq!(
            hashed.hash_hex,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn empty_file_hashes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty");
        fs::write(&path, b"").unwrap();
        let hashed = hash_file(&path).unwrap();
        assert_eq!(hashed.size, 0);
        assert_eq!(hashed.hash_hex.len(), 64);
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(hash_file(&temp.path().join("nope")).is_err());
        assert!(try_hash_file(&temp.path().join("nope")).is_none());
    }
}
