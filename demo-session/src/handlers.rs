use std::sync::Arc;

use askama::Template;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use http::HeaderMap;
use serde::Deserialize;
use serde_json::json;

use next_session::SessionManager;
use next_session_axum::{IntoResponseError, NEXT_SESSION_ROUTE_PREFIX};

type AppState = State<Arc<SessionManager>>;

#[derive(Template)]
#[template(path = "index.j2", escape = "html")]
struct IndexTemplate<'a> {
    visits: u64,
    session_route_prefix: &'a str,
}

#[derive(Template)]
#[template(path = "form.j2", escape = "html")]
struct FormTemplate<'a> {
    csrf_token: &'a str,
}

#[derive(Template)]
#[template(path = "result.j2", escape = "html")]
struct ResultTemplate<'a> {
    message: Option<&'a str>,
}

fn render(template: &impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template
        .render()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub(crate) async fn index(
    State(manager): AppState,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let mut response_headers = HeaderMap::new();

    let visits: u64 = manager
        .get_session_value::<u64>(&headers, &mut response_headers, "visits")
        .await
        .into_response_error()?
        .unwrap_or(0)
        + 1;
    manager
        .set_session_data(&headers, &mut response_headers, &json!({ "visits": visits }))
        .await
        .into_response_error()?;

    let html = render(&IndexTemplate {
        visits,
        session_route_prefix: NEXT_SESSION_ROUTE_PREFIX.as_str(),
    })?;
    Ok((response_headers, html).into_response())
}

pub(crate) async fn show_form(
    State(manager): AppState,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    let mut response_headers = HeaderMap::new();
    let token = manager
        .issue_csrf_token(&headers, &mut response_headers)
        .await
        .into_response_error()?;

    let html = render(&FormTemplate { csrf_token: &token })?;
    Ok((response_headers, html).into_response())
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageForm {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
    message: String,
}

pub(crate) async fn submit_form(
    State(manager): AppState,
    headers: HeaderMap,
    Form(form): Form<MessageForm>,
) -> Result<Response, (StatusCode, String)> {
    let mut response_headers = HeaderMap::new();
    let valid = manager
        .validate_csrf_token(&headers, &mut response_headers, &form.csrf_token)
        .await
        .into_response_error()?;

    if !valid {
        let html = render(&ResultTemplate { message: None })?;
        return Ok((StatusCode::FORBIDDEN, response_headers, html).into_response());
    }

    tracing::info!("Accepted message of {} bytes", form.message.len());
    let html = render(&ResultTemplate {
        message: Some(&form.message),
    })?;
    Ok((response_headers, html).into_response())
}
