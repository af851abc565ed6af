use axum::Router;
use tower_http::trace::TraceLayer;
use unireg::kernel::server::ApiState;
use unireg::server::router::{enrollment_router, system_router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "UniReg", description = "Course registration and enrollment API"))]
struct ApiDoc;

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(enrollment_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    Router::new().merge(openapi_routes).merge(Scalar::with_url("/api", api_doc))
}
