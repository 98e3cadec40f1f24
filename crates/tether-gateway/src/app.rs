use std::any::Any;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::handlers::{
    create_link_handler, delete_link_handler, fallback_handler, get_link_handler, health_handler,
    increment_access_handler, link_stats_handler, missing_code_handler, update_link_handler,
};
use crate::model::ErrorResponse;
use crate::state::AppState;

/// Per-request time limits.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Bounds reading the request body.
    pub read: Duration,
    /// Bounds the whole request, handler included.
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(5),
            write: Duration::from_secs(5),
        }
    }
}

pub struct App {}

impl App {
    pub fn router(state: AppState, timeouts: Timeouts) -> Router {
        let v1 = Router::new()
            .route("/health", get(health_handler))
            .route("/shorten", post(create_link_handler))
            .route("/shorten/", any(missing_code_handler))
            .route(
                "/shorten/{code}",
                get(get_link_handler)
                    .put(update_link_handler)
                    .delete(delete_link_handler),
            )
            .route("/shorten/{code}/stats", get(link_stats_handler))
            .route("/shorten/{code}/increment", post(increment_access_handler));

        Router::new()
            .nest("/v1", v1)
            .fallback(fallback_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CatchPanicLayer::custom(panic_response))
                    .layer(RequestBodyTimeoutLayer::new(timeouts.read))
                    .layer(TimeoutLayer::new(timeouts.write)),
            )
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("internal_error", "internal server error")),
    )
        .into_response()
}
