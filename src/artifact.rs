use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Fingerprint of the library file that was actually loaded, for the
/// machine-readable report.
#[derive(Debug, Serialize)]
pub struct ArtifactInfo {
    pub path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

pub fn inspect(path: &Path) -> Result<ArtifactInfo, String> {
    let meta = std::fs::metadata(path)
        .map_err(|e| format!("failed to stat {}: {e}", path.display()))?;
    if !meta.is_file() {
        return Err(format!("not a regular file: {}", path.display()));
    }
    Ok(ArtifactInfo {
        path: path.display().to_string(),
        size_bytes: meta.len(),
        sha256: sha256_hex(path)?,
    })
}

pub fn sha256_hex(path: &Path) -> Result<String, String> {
    let mut file = File::open(path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(contents: &[u8]) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("web5-smoke-artifact-{stamp}"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn hashes_known_contents() {
        let path = temp_file(b"hello");
        assert_eq!(
            sha256_hex(&path).unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn inspect_reports_size_and_digest() {
        let path = temp_file(b"prebuilt artifact bytes");
        let info = inspect(&path).unwrap();
        assert_eq!(info.size_bytes, 23);
        assert_eq!(info.sha256.len(), 64);
        assert_eq!(info.path, path.display().to_string());
    }

    #[test]
    fn inspect_missing_file_is_an_error() {
        let err = inspect(Path::new("/nonexistent/libweb5_uniffi.so")).unwrap_err();
        assert!(err.contains("/nonexistent/libweb5_uniffi.so"), "{err}");
    }
}
