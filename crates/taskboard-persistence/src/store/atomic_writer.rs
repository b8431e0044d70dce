use std::io::Write;
use std::path::{Path, PathBuf};

use taskboard_core::{TaskboardError, TaskboardResult};
use tokio::fs;

/// Writes whole files so readers see either the old or the new content.
pub struct AtomicWriter;

impl AtomicWriter {
    /// Write `data` to a temporary file next to `path`, sync it, then rename
    /// it over `path`. The temporary file is removed if any step fails.
    pub async fn write_atomic(path: &Path, data: &[u8]) -> TaskboardResult<()> {
        let target: PathBuf = path.to_path_buf();
        let bytes = data.to_vec();
        let len = bytes.len();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let parent = match target.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&parent)?;
            let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
            temp.write_all(&bytes)?;
            temp.as_file().sync_all()?;
            temp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| TaskboardError::Storage(format!("write task failed: {e}")))??;

        tracing::debug!("Atomically wrote {} bytes to {}", len, path.display());
        Ok(())
    }

    /// Read the whole file, or `None` when it does not exist.
    pub async fn read_if_exists(path: &Path) -> TaskboardResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("store.json");

        AtomicWriter::write_atomic(&file_path, b"First").await.unwrap();
        AtomicWriter::write_atomic(&file_path, b"Second").await.unwrap();

        let read_data = AtomicWriter::read_if_exists(&file_path).await.unwrap();
        assert_eq!(read_data.as_deref(), Some(&b"Second"[..]));
    }

    #[tokio::test]
    async fn test_creates_missing_parent_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("store.json");

        AtomicWriter::write_atomic(&file_path, b"{}").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let missing = AtomicWriter::read_if_exists(&dir.path().join("none.json"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
