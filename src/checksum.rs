use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::SyncError;

// 1 MiB streaming reads keep memory flat for multi-gigabyte fastq files.
const CHUNK_SIZE: usize = 1 << 20;

pub trait ContentHasher: Send + Sync {
    fn digest_file(&self, path: &Path) -> Result<String, SyncError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hasher;

impl ContentHasher for Md5Hasher {
    fn digest_file(&self, path: &Path) -> Result<String, SyncError> {
        let mut file = File::open(path).map_err(|err| SyncError::UnreadableFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut buffer).map_err(|err| SyncError::UnreadableFile {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn digest_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fastq");
        std::fs::write(&path, b"hello world").unwrap();

        let digest = Md5Hasher.digest_file(&path).unwrap();
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn digest_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fastq");
        std::fs::write(&path, b"").unwrap();

        let digest = Md5Hasher.digest_file(&path).unwrap();
        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn digest_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = Md5Hasher
            .digest_file(&dir.path().join("absent.fastq"))
            .unwrap_err();
        assert_matches!(err, SyncError::UnreadableFile { .. });
    }
}
