//! Well-known names shared between the API surface and storage.

/// OpenAPI tag for course catalog routes.
pub const TAG_COURSES: &str = "Courses";
/// OpenAPI tag for student routes.
pub const TAG_STUDENTS: &str = "Students";
/// OpenAPI tag for advisory registration checks.
pub const TAG_REGISTRATION: &str = "Registration";
pub const TAG_SYSTEM: &str = "System";

/// Storage key of the persisted ledger snapshot.
pub const LEDGER_SNAPSHOT_KEY: &str = "snapshots/ledger.json";
/// Storage key of the catalog used when no snapshot exists.
pub const SEED_CATALOG_KEY: &str = "seed/catalog.json";

/// Environment prefix for configuration overrides (`UNIREG__SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "UNIREG";
