//! Small filesystem helpers shared by the store and the renderer.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Write `contents` to `path` through a sibling temp file and a rename, so a
/// concurrent reader never observes a partially written file.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "out".to_string());
    let tmp = path.with_file_name(format!("{}.tmp", file_name));

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Hex-encoded SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conf");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        // no temp file left behind
        assert!(!dir.path().join("out.conf.tmp").exists());
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"anki"),
            sha256_hex(b"anki"),
            "digest must be deterministic"
        );
        assert_ne!(sha256_hex(b"anki"), sha256_hex(b"anki2"));
        assert_eq!(sha256_hex(b"").len(), 64);
    }
}
