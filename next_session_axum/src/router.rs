//! Router for the session endpoints

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use next_session::SessionManager;

use super::session::{issue_csrf, logout};

/// Create a router for the session endpoints
///
/// Mount it under [`crate::NEXT_SESSION_ROUTE_PREFIX`]. The endpoints are:
/// - `GET {prefix}/csrf`: issue a CSRF token (JSON body and header)
/// - `POST {prefix}/logout`: destroy the session, optionally redirecting via `?redirect=/path`
pub fn session_router(manager: Arc<SessionManager>) -> Router {
    session_router_no_trace(manager).layer(
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

/// Same as [`session_router`] without the HTTP tracing middleware.
pub fn session_router_no_trace(manager: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/csrf", get(issue_csrf))
        .route("/logout", post(logout))
        .with_state(manager)
}
