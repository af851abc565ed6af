use crate::engine::{Compression, Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    compression: Compression,
    create: bool,
}

impl Default for StorageBuilder<NoRoot> {
    fn default() -> Self {
        Self { state: NoRoot, compression: Compression::None, create: true }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    #[must_use]
    pub const fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Whether a missing root directory is created on connect (default: `true`).
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        StorageBuilder { state: WithRoot(path.into()), compression: self.compression, create: self.create }
    }
}

impl StorageBuilder<WithRoot> {
    /// Prepares the root and returns a shareable [`Storage`] handle.
    ///
    /// The root is created when allowed, canonicalized, and swept for stale temp
    /// files. A failed sweep only logs a warning.
    ///
    /// # Errors
    /// Returns [`StorageError::Io`] if the root is missing (and `create` is off)
    /// or cannot be resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = &self.state.0;

        if self.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        info!(path = %canonical.display(), compression = ?self.compression, "Storage connected");

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                compression: self.compression,
                tmp_counter: AtomicU64::new(1),
            }),
        };
        storage.purge_tmp().await;

        Ok(storage)
    }
}
