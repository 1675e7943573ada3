use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::ConfigError;

const SNAPSHOT_EXTENSION: &str = "txt";

/// Writes decoded response bodies to a working directory for offline
/// inspection. Failures are logged and swallowed; snapshots never affect a
/// verdict.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    /// Prepare `dir`, creating it if needed and purging `.txt` snapshots left
    /// by previous runs.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| ConfigError::WorkDir {
            path: dir.display().to_string(),
            source,
        })?;

        let entries = fs::read_dir(&dir).map_err(|source| ConfigError::WorkDir {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == SNAPSHOT_EXTENSION) {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("[snapshot] cannot remove stale file {}: {e}", path.display());
                }
            }
        }

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist already-decoded text as `<dir>/<YYYYmmdd_HHMMSS>_<suffix>`.
    /// Returns the written path, or `None` when the write failed.
    pub fn save_text(&self, text: &str, suffix: &str) -> Option<PathBuf> {
        let name = format!("{}_{}", Local::now().format("%Y%m%d_%H%M%S"), suffix);
        let path = self.dir.join(name);
        match fs::write(&path, text) {
            Ok(()) => {
                log::debug!("[snapshot] saved {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::warn!("[snapshot] failed to write {}: {e}", path.display());
                None
            }
        }
    }

    /// Decode a raw body with its declared encoding and persist the text.
    pub fn save_body(&self, bytes: &[u8], declared_encoding: &str, suffix: &str) -> Option<PathBuf> {
        self.save_text(&super::decode(bytes, declared_encoding), suffix)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    #[test]
    fn stale_snapshots_are_purged_but_other_files_kept() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("20240101_000000_old.txt"), "stale").expect("write");
        fs::write(tmp.path().join("notes.md"), "keep me").expect("write");

        let writer = SnapshotWriter::new(tmp.path()).expect("writer");

        assert!(!tmp.path().join("20240101_000000_old.txt").exists());
        assert!(tmp.path().join("notes.md").exists());
        assert_eq!(writer.dir(), tmp.path());
    }

    #[test]
    fn missing_directory_is_created() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let nested = tmp.path().join("a").join("b");
        SnapshotWriter::new(&nested).expect("writer");
        assert!(nested.is_dir());
    }

    #[test]
    fn saved_file_is_named_by_timestamp_and_suffix() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let writer = SnapshotWriter::new(tmp.path()).expect("writer");

        let path = writer.save_text("hello", "page.txt").expect("saved");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");

        assert!(name.ends_with("_page.txt"));
        // YYYYmmdd_HHMMSS_
        assert_eq!(name.len(), "20240101_000000_".len() + "page.txt".len());
        assert_eq!(fs::read_to_string(&path).expect("read"), "hello");
    }

    #[test]
    fn compressed_body_is_stored_decoded() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let writer = SnapshotWriter::new(tmp.path()).expect("writer");

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"<p>Japan</p>").expect("write");
        let body = enc.finish().expect("finish");

        let path = writer.save_body(&body, "gzip", "body.txt").expect("saved");
        assert_eq!(fs::read_to_string(path).expect("read"), "<p>Japan</p>");
    }
}
