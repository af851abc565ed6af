//! Ledger snapshots on top of `unireg-storage`.

use crate::error::{EnrollmentError, EnrollmentErrorExt};
use crate::ledger::{EnrollmentLedger, LedgerSnapshot};
use crate::model::CourseOffering;
use crate::planner::SelectionLimits;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use unireg_kernel::domain::constants::{LEDGER_SNAPSHOT_KEY, SEED_CATALOG_KEY};
use unireg_storage::Storage;

/// Where a restored ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOrigin {
    Snapshot,
    Seed,
    Empty,
}

/// Serializes snapshot writes so the file always ends at the newest revision.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    storage: Storage,
    /// Highest revision written so far.
    written: Arc<Mutex<Option<u64>>>,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage, written: Arc::new(Mutex::new(None)) }
    }

    /// Restores the ledger from the last snapshot, else the seed catalog, else empty.
    ///
    /// # Errors
    /// Storage or decoding failures, and [`EnrollmentError::Validation`] when
    /// the stored data breaks a ledger invariant.
    pub async fn load(
        &self,
        limits: SelectionLimits,
    ) -> Result<(EnrollmentLedger, LedgerOrigin), EnrollmentError> {
        if let Some(bytes) = self.read_optional(LEDGER_SNAPSHOT_KEY).await? {
            let snapshot: LedgerSnapshot = serde_json::from_slice(&bytes).context(LEDGER_SNAPSHOT_KEY)?;
            let revision = snapshot.revision;
            let ledger = EnrollmentLedger::from_snapshot(snapshot, limits).context(LEDGER_SNAPSHOT_KEY)?;
            *self.written.lock().await = Some(revision);
            info!(revision, "Ledger restored from snapshot");
            return Ok((ledger, LedgerOrigin::Snapshot));
        }

        if let Some(bytes) = self.read_optional(SEED_CATALOG_KEY).await? {
            let catalog: Vec<CourseOffering> = serde_json::from_slice(&bytes).context(SEED_CATALOG_KEY)?;
            let courses = catalog.len();
            let ledger = EnrollmentLedger::with_catalog(catalog, limits).context(SEED_CATALOG_KEY)?;
            info!(courses, "Ledger seeded from catalog");
            return Ok((ledger, LedgerOrigin::Seed));
        }

        warn!("No snapshot or seed catalog found; starting with an empty ledger");
        Ok((EnrollmentLedger::new(limits), LedgerOrigin::Empty))
    }

    /// Writes the ledger unless a revision at least as new is already on disk.
    ///
    /// The snapshot is taken after acquiring the write lock, so when several
    /// saves race the last writer always carries the newest state.
    pub async fn save(&self, ledger: &EnrollmentLedger) -> Result<(), EnrollmentError> {
        let mut written = self.written.lock().await;

        let snapshot = ledger.snapshot();
        if written.is_some_and(|rev| rev >= snapshot.revision) {
            debug!(revision = snapshot.revision, "Snapshot already current");
            return Ok(());
        }

        let bytes = serde_json::to_vec(&snapshot).context("encode ledger snapshot")?;
        self.storage.write(LEDGER_SNAPSHOT_KEY, &bytes).await.context("write ledger snapshot")?;
        *written = Some(snapshot.revision);

        debug!(revision = snapshot.revision, bytes = bytes.len(), "Snapshot written");
        Ok(())
    }

    async fn read_optional(&self, key: &str) -> Result<Option<Vec<u8>>, EnrollmentError> {
        match self.storage.read(key).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err).context(key.to_owned()),
        }
    }
}
