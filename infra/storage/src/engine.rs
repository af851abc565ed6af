use crate::TMP_MARKER;
use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::security;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// On-disk encoding applied to every payload.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    fn encode(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decode(self, data: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data),
            Self::Lz4 => lz4_flex::decompress_size_prepended(&data).context("LZ4 payload"),
        }
    }
}

#[derive(Debug)]
pub struct StorageInner {
    pub(crate) root: PathBuf,
    pub(crate) compression: Compression,
    pub(crate) tmp_counter: AtomicU64,
}

impl StorageInner {
    /// Canonical sandbox root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }
}

/// Cloneable handle to a sandboxed directory.
///
/// Keys are relative paths such as `snapshots/ledger.json`. Each write lands in
/// a unique temp file that is synced and then renamed over the target, so a
/// concurrent reader sees either the previous payload or the new one.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Maps a key to its physical path inside the sandbox.
    ///
    /// # Errors
    /// [`StorageError::PathTraversalAttempt`] when the key is absolute, empty,
    /// climbs above the root, or crosses a symlink that leaves it.
    pub fn resolve(&self, key: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, key)
    }

    /// Reads and decodes a payload.
    ///
    /// # Errors
    /// [`StorageError::FileNotFound`] for a missing key, [`StorageError::Decompress`]
    /// for a corrupt LZ4 payload.
    pub async fn read(&self, key: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(key)?;

        let raw = fs::read(&resolved).await.map_err(|e| not_found_or_io(e, &resolved, "Read"))?;
        self.compression.decode(raw)
    }

    /// Atomically replaces the payload stored under `key`.
    ///
    /// Missing parent directories are created.
    pub async fn write(&self, key: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(key)?;
        let parent = resolved.parent().map(Path::to_path_buf);

        if let Some(parent) = &parent {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.tmp_path(&resolved);
        let encoded = self.compression.encode(data);

        if let Err(e) = write_synced(&temp, &encoded).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp, &resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Io {
                source: e,
                context: Some(
                    format!("Atomic swap {} -> {}", temp.display(), resolved.display()).into(),
                ),
            });
        }

        if let Some(parent) = &parent {
            sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = encoded.len(), "Payload written");
        Ok(())
    }

    /// Removes a stored payload.
    ///
    /// # Errors
    /// [`StorageError::FileNotFound`] when nothing is stored under `key`.
    pub async fn delete(&self, key: impl AsRef<Path>) -> Result<(), StorageError> {
        let resolved = self.resolve(key)?;

        fs::remove_file(&resolved).await.map_err(|e| not_found_or_io(e, &resolved, "Delete"))?;
        debug!(path = %resolved.display(), "Payload deleted");
        Ok(())
    }

    pub async fn exists(&self, key: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve(key)?;
        fs::try_exists(&resolved).await.context(format!("Probe {}", resolved.display()))
    }

    /// Sweeps temp files abandoned by interrupted writes.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let seq = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = target.file_name().and_then(|n| n.to_str()).unwrap_or("payload");
        target.with_file_name(format!("{name}{TMP_MARKER}{seq}"))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .await
        .context(format!("Temp file {}", path.display()))?;
    file.write_all(data).await.context("Write failed")?;
    file.sync_all().await.context("fsync failed")?;
    Ok(())
}

fn not_found_or_io(err: std::io::Error, path: &Path, op: &str) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::FileNotFound { message: path.display().to_string().into(), context: None }
    } else {
        StorageError::Io { source: err, context: Some(format!("{op} {}", path.display()).into()) }
    }
}

async fn sync_dir(path: &Path) {
    // Directory fsync is best effort; some platforms refuse to open directories.
    match fs::File::open(path).await {
        Ok(dir) => {
            if let Err(e) = dir.sync_all().await {
                warn!(path = %path.display(), error = %e, "Directory sync failed");
            }
        },
        Err(e) => debug!(path = %path.display(), error = %e, "Directory open failed"),
    }
}
