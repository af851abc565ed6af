use super::state::ApiState;
use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use std::sync::LazyLock;
use std::time::Instant;
use unireg_derive::{api_handler, api_model};
use unireg_domain::constants::TAG_SYSTEM;

#[api_model]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Seconds since the first health request.
    uptime: u64,
    /// Number of registered feature slices.
    slices: usize,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Service is up", body = HealthResponse)),
    tag = TAG_SYSTEM,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
        slices: state.slice_ids().count(),
    };

    (
        [(header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"), (header::PRAGMA, "no-cache")],
        Json(body),
    )
}
