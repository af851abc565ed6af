//! Course enrollment slice.
//!
//! [`EnrollmentLedger`] is the single source of truth for seats and per-student
//! selections. [`RegistrationPlanner`] and [`RegistrationSession`] give clients
//! advisory answers while they build a selection. The slice wires the ledger
//! to the event bus and to snapshot storage; with the `server` feature,
//! [`api::router`] exposes it over REST.

#[cfg(feature = "server")]
pub mod api;
mod error;
pub mod events;
pub mod ledger;
pub mod model;
pub mod persist;
pub mod planner;
mod service;
pub mod session;

pub use error::{EnrollmentError, EnrollmentErrorExt};
pub use events::EnrollmentEvent;
pub use ledger::{EnrollmentLedger, LedgerSnapshot, SubmitOutcome};
pub use model::{CourseId, CourseOffering, RosterEntry, Student, StudentId, StudentProfile, TimeSlot};
pub use persist::{LedgerOrigin, SnapshotStore};
pub use planner::{Admission, RegistrationPlanner, SelectionLimits};
pub use service::RegistrationCheck;
pub use session::{RegistrationSession, Toggle};

use tracing::info;
use unireg_event_bus::EventBus;
use unireg_kernel::domain::config::ApiConfig;
use unireg_kernel::domain::registry::InitializedSlice;
use unireg_storage::Storage;

/// Enrollment feature state shared by every handler.
#[unireg_derive::unireg_slice]
pub struct Enrollment {
    pub ledger: EnrollmentLedger,
    pub planner: RegistrationPlanner,
    events: EventBus,
    /// `None` when persistence is switched off.
    store: Option<SnapshotStore>,
}

impl Enrollment {
    /// Restores the ledger from storage and assembles the slice.
    ///
    /// # Errors
    /// Invalid selection bounds in the config, or a snapshot/seed that cannot
    /// be read or fails validation.
    pub async fn open(
        config: &ApiConfig,
        storage: &Storage,
        events: &EventBus,
    ) -> Result<Self, EnrollmentError> {
        let registration = &config.registration;
        let limits = SelectionLimits::new(registration.min_courses, registration.max_courses)
            .context("registration bounds")?;

        let store = SnapshotStore::new(storage.clone());
        let (ledger, origin) = store.load(limits).await?;
        info!(?origin, %limits, persist = registration.persist, "Enrollment ledger ready");

        Ok(Self::new(EnrollmentInner {
            ledger,
            planner: RegistrationPlanner::new(limits),
            events: events.clone(),
            store: registration.persist.then_some(store),
        }))
    }

    /// A slice over an existing ledger that never touches storage.
    #[must_use]
    pub fn detached(ledger: EnrollmentLedger, events: EventBus) -> Self {
        let planner = RegistrationPlanner::new(ledger.limits());
        Self::new(EnrollmentInner { ledger, planner, events, store: None })
    }
}

/// Initializes the enrollment slice for registration in the API state.
///
/// # Errors
/// See [`Enrollment::open`].
pub async fn init(
    config: &ApiConfig,
    storage: &Storage,
    events: &EventBus,
) -> Result<InitializedSlice, EnrollmentError> {
    let slice = Enrollment::open(config, storage, events).await?;
    info!("Enrollment slice initialized");
    Ok(InitializedSlice::new(slice))
}
