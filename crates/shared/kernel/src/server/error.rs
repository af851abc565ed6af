use super::state::ApiStateError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use unireg_derive::api_model;

/// JSON body of every failed request.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Stable machine-readable code, e.g. `CAPACITY_EXCEEDED`.
    pub code: String,
    pub message: String,
}

/// Builds an error response with a `{ code, message }` body.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (status, Json(ApiErrorBody { code: code.to_owned(), message: message.into() })).into_response()
}

impl IntoResponse for ApiStateError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "API state misconfigured");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Service unavailable")
    }
}
