//! Combined router for all authentication endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Router for every authentication endpoint, meant to be nested at
/// [`PASSGATE_ROUTE_PREFIX`](crate::PASSGATE_ROUTE_PREFIX):
/// - `GET  /providers`
/// - `GET  /session`
/// - `GET  /signin/{provider}`
/// - `GET  /callback/{provider}`
/// - `POST /callback/credentials`
/// - `GET|POST /signout`
pub fn passgate_router() -> Router {
    passgate_router_no_trace().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same routes as [`passgate_router`] without HTTP tracing.
pub fn passgate_router_no_trace() -> Router {
    Router::new()
        .merge(super::auth::router())
        .merge(super::credentials::router())
        .merge(super::oauth2::router())
}
