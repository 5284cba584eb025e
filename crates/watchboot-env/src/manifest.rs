//! `requirements.txt` handling: line parsing and content hashing.
//!
//! The requirement syntax itself is pip's business, and so is the file's
//! existence during install; this module only splits lines for logging and
//! fingerprints the file for the completion marker.

use std::io::ErrorKind;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::EnvError;

/// Split manifest content into requirement lines.
/// Blank lines and `#` comments are dropped, order is preserved.
pub fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

/// SHA-256 hex of the manifest bytes; empty string when the file is absent.
/// Recorded in the completion marker and compared under `AlwaysVerify`.
pub fn content_hash(path: &Path) -> Result<String, EnvError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => {
            return Err(EnvError::ManifestRead {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_skips_comments_and_blanks() {
        let content = "watchdog==3.0.0\n\n# dev tooling\n  pyyaml>=6\n";
        assert_eq!(parse(content), vec!["watchdog==3.0.0", "pyyaml>=6"]);
    }

    #[test]
    fn parse_preserves_order() {
        let content = "b\na\nc\n";
        assert_eq!(parse(content), vec!["b", "a", "c"]);
    }

    #[test]
    fn hash_tracks_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.txt");

        let absent = content_hash(&path).unwrap();
        assert_eq!(absent, "");

        std::fs::write(&path, "watchdog==3.0.0\n").unwrap();
        let h1 = content_hash(&path).unwrap();
        assert_eq!(h1.len(), 64); // SHA256 hex

        std::fs::write(&path, "watchdog==4.0.0\n").unwrap();
        let h2 = content_hash(&path).unwrap();
        assert_ne!(h1, h2);
    }
}
