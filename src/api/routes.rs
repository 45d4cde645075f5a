use std::any::Any;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::error::AppError;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Canonical recommendation path
pub const RECOMMEND_PATH: &str = "/api/recommend";

/// Older client paths served by the same handler
pub const LEGACY_RECOMMEND_PATHS: [&str; 2] = ["/api/predict", "/recommend"];

/// Creates the main API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/genres", get(handlers::list_genres))
        .route(RECOMMEND_PATH, post(handlers::recommend).options(handlers::preflight));

    for path in LEGACY_RECOMMEND_PATHS {
        router = router.route(path, post(handlers::recommend).options(handlers::preflight));
    }

    with_middleware(router).with_state(state)
}

/// Wraps `router` in the shared middleware stack.
///
/// Outermost first: CORS answers preflights before anything else runs, the
/// request ID is assigned outside the panic guard so a 500 still carries it,
/// and it exists before the trace span is created.
fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(cors_layer())
            .layer(middleware::from_fn(request_id_middleware))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
    )
}

/// Any origin, JSON bodies, optional bearer header
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Converts a handler panic into the standard 500 body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(detail).into_response()
}
