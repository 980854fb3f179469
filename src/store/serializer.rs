use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-file write coordination: at most one in-flight mutation per physical
/// file, committed via write-to-temp-then-rename so readers never observe a
/// partially written file.
#[derive(Debug, Clone, Default)]
pub struct WriteSerializer {
    locks: Arc<Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>>,
}

impl WriteSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for one file. Waiters are served in arrival
    /// order; locks for different files are independent.
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().expect("lock table poisoned");
            locks.entry(path.to_path_buf()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Durably replace `path` with `bytes`. A failure before the rename leaves
    /// the previous file state fully intact.
    pub async fn commit(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let tmp = temp_path(path);

        if let Err(e) = tokio::fs::write(&tmp, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        match tokio::fs::rename(&tmp, path).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = tokio::fs::remove_file(&tmp).await;
                Err(e)
            }
        }
    }
}

// Sibling temp file so the rename stays within one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_replaces_content_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");

        let serializer = WriteSerializer::new();
        serializer.commit(&path, b"{\"a\":1}").await.unwrap();
        serializer.commit(&path, b"{\"a\":2}").await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "{\"a\":2}");
        assert!(!temp_path(&path).exists(), "temp file left behind");
    }

    #[tokio::test]
    async fn lock_serializes_writers_on_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let serializer = WriteSerializer::new();

        let guard = serializer.lock(&path).await;

        let contended = serializer.clone();
        let contended_path = path.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contended.lock(&contended_path).await;
        });

        // The second writer cannot acquire the lock while we hold it.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn locks_for_different_files_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let serializer = WriteSerializer::new();

        let _primary = serializer.lock(&dir.path().join("db.json")).await;
        // Must not deadlock.
        let _demo = serializer.lock(&dir.path().join("demo_db.json")).await;
    }
}
