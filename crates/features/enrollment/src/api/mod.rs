//! REST surface of the enrollment slice.

mod dto;
mod handlers;

pub use dto::*;

use crate::error::EnrollmentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use unireg_kernel::server::{ApiState, ApiStateError, error_response};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Catalog, student and registration routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_courses))
        .routes(routes!(handlers::get_course))
        .routes(routes!(handlers::course_roster))
        .routes(routes!(handlers::list_students, handlers::register_student))
        .routes(routes!(handlers::get_student))
        .routes(routes!(handlers::submit_selection))
        .routes(routes!(handlers::enroll_course, handlers::drop_course))
        .routes(routes!(handlers::check_registration))
}

impl EnrollmentError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::CapacityExceeded { .. }
            | Self::DuplicateEnrollment { .. }
            | Self::InvariantViolation { .. } => StatusCode::CONFLICT,
            Self::SelectionOutOfBounds { .. } | Self::Validation { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            },
            Self::Storage { .. } | Self::Serialization { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for EnrollmentError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Enrollment request failed");
            return error_response(status, self.code(), "Internal server error");
        }
        error_response(status, self.code(), self.to_string())
    }
}

impl From<ApiStateError> for EnrollmentError {
    fn from(err: ApiStateError) -> Self {
        Self::Internal { message: err.to_string().into(), context: Some("api state".into()) }
    }
}
