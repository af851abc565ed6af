//! Facade crate for UniReg.
//! Re-exports the shared domain and kernel and aggregates slice initialization.
//! Keep this crate thin: it composes other crates, it does not hold business logic.
//!
//! ## Usage
//! - Depend on `unireg` with the `server` feature for the REST surface.
//! - Call [`init`] once at startup and register the returned slices in the API state.

pub use unireg_domain as domain;
pub use unireg_kernel as kernel;

use domain::config::ApiConfig;
use domain::registry::InitializedSlice;
use tracing::info;
use unireg_event_bus::EventBus;
use unireg_storage::Storage;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use unireg_enrollment::api::router as enrollment_router;
        pub use unireg_kernel::server::router::system_router;
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use unireg_enrollment as enrollment;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "enrollment",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initializes every slice against shared infrastructure.
///
/// # Errors
/// Returns the first slice failure; nothing is registered in that case.
pub async fn init(
    config: &ApiConfig,
    storage: &Storage,
    events: &EventBus,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let mut slices = Vec::new();

    slices.push(features::enrollment::init(config, storage, events).await?);

    info!(slices = slices.len(), "Feature slices initialized");
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_is_always_enabled() {
        assert!(features::is_enabled("enrollment"));
        assert!(!features::is_enabled("licensing"));
    }

    #[tokio::test]
    async fn init_registers_every_slice() {
        let temp = tempfile::TempDir::new().unwrap();
        let storage = Storage::builder().root(temp.path()).connect().await.unwrap();

        let slices = init(&ApiConfig::default(), &storage, &EventBus::new()).await.unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].id, std::any::TypeId::of::<features::enrollment::Enrollment>());
    }
}
