use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{HeaderMap, Method, header::SET_COOKIE};

use next_session::SessionManager;

use super::config::NEXT_SESSION_CSRF_HEADER;
use super::error::IntoResponseError;

/// Reject state-changing requests that do not carry the session's pending CSRF token.
///
/// Use with [`axum::middleware::from_fn_with_state`]. The token is read from the
/// CSRF header and consumed whether or not it matches, so clients must fetch a
/// new one before each protected request.
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{Router, middleware, routing::post};
/// use next_session_axum::csrf_protect;
///
/// # async fn demo(manager: Arc<next_session::SessionManager>) {
/// let app: Router = Router::new()
///     .route("/transfer", post(|| async { "done" }))
///     .layer(middleware::from_fn_with_state(manager, csrf_protect));
/// # }
/// ```
pub async fn csrf_protect(
    State(manager): State<Arc<SessionManager>>,
    req: Request,
    next: Next,
) -> Response {
    if !requires_csrf(req.method()) {
        return next.run(req).await;
    }

    let Some(token) = req
        .headers()
        .get(NEXT_SESSION_CSRF_HEADER.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
    else {
        tracing::debug!("CSRF token missing from {} request", req.method());
        return (StatusCode::FORBIDDEN, "CSRF token missing").into_response();
    };

    let mut session_headers = HeaderMap::new();
    let verified = manager
        .validate_csrf_token(req.headers(), &mut session_headers, &token)
        .await
        .into_response_error();

    let mut response = match verified {
        Ok(true) => next.run(req).await,
        Ok(false) => (StatusCode::FORBIDDEN, "CSRF token mismatch").into_response(),
        Err(err) => return err.into_response(),
    };
    forward_set_cookies(&session_headers, response.headers_mut());
    response
}

fn requires_csrf(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    )
}

fn forward_set_cookies(from: &HeaderMap, to: &mut HeaderMap) {
    for value in from.get_all(SET_COOKIE) {
        to.append(SET_COOKIE, value.clone());
    }
}
