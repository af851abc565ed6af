//! Sandboxed file storage used for ledger snapshots and seed catalogs.
//!
//! # Core Features
//!
//! - **Sandbox**: every key is resolved below the canonical root; absolute paths,
//!   `..` escapes and symlinks leaving the root are rejected.
//! - **Atomic writes**: unique temp file, `fsync`, then `rename`. A reader never
//!   observes a half-written snapshot.
//! - **Compression**: optional LZ4 block compression, transparent to callers.
//! - **Self-healing**: stale temp files from crashed writers are purged on connect.
//!
//! # Example
//!
//! ```rust
//! use unireg_storage::{Compression, Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let storage = Storage::builder()
//!         .root(tmp.path().join("data"))
//!         .compression(Compression::Lz4)
//!         .connect()
//!         .await?;
//!
//!     storage.write("snapshots/ledger.json", br#"{"courses":[]}"#).await?;
//!     let bytes = storage.read("snapshots/ledger.json").await?;
//!     assert_eq!(bytes, br#"{"courses":[]}"#);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::{Compression, Storage};
pub use error::{StorageError, StorageErrorExt};

/// Marker embedded in temporary file names while a write is in flight.
pub(crate) const TMP_MARKER: &str = ".uniregtmp.";
