use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Deserialize;
use serde_json::json;

use next_session::{CSRF_TOKEN_KEY, SessionManager};

use super::config::NEXT_SESSION_CSRF_HEADER;
use super::error::IntoResponseError;

#[derive(Debug, Deserialize)]
pub(super) struct LogoutParams {
    redirect: Option<String>,
}

/// Issue a fresh CSRF token, returned both in the JSON body and in the CSRF header.
pub(super) async fn issue_csrf(
    State(manager): State<Arc<SessionManager>>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let mut response_headers = HeaderMap::new();
    let token = manager
        .issue_csrf_token(&headers, &mut response_headers)
        .await
        .into_response_error()?;

    let header_name = HeaderName::from_bytes(NEXT_SESSION_CSRF_HEADER.as_bytes())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let header_value = HeaderValue::from_str(&token)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    response_headers.insert(header_name, header_value);

    Ok((response_headers, Json(json!({ CSRF_TOKEN_KEY: token }))).into_response())
}

pub(super) async fn logout(
    State(manager): State<Arc<SessionManager>>,
    Query(params): Query<LogoutParams>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let mut response_headers = HeaderMap::new();
    manager
        .destroy_session(&headers, &mut response_headers)
        .await
        .into_response_error()?;

    match params.redirect {
        Some(target) => {
            let target = if is_local_path(&target) {
                target
            } else {
                tracing::warn!("Ignoring off-site logout redirect: {}", target);
                "/".to_string()
            };
            Ok((response_headers, Redirect::to(&target)).into_response())
        }
        None => Ok((response_headers, StatusCode::OK).into_response()),
    }
}

/// Only same-origin absolute paths are followed after logout
fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
