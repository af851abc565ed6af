//! Axum-facing pieces shared by every slice.

pub mod error;
mod health;
pub mod router;
pub mod state;

pub use error::{ApiErrorBody, error_response};
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
