use std::sync::Arc;

use axum::{Router, routing::get};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use next_session::SessionManager;
use next_session_axum::{NEXT_SESSION_ROUTE_PREFIX, session_router};

mod handlers;
mod server;

use crate::{
    handlers::{index, show_form, submit_form},
    server::{shutdown_signal, spawn_http_server},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,next_session=debug", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let manager = Arc::new(SessionManager::from_env().await?);

    let app = Router::new()
        .route("/", get(index))
        .route("/form", get(show_form).post(submit_form))
        .with_state(manager.clone())
        .nest(NEXT_SESSION_ROUTE_PREFIX.as_str(), session_router(manager.clone()));

    let handle = axum_server::Handle::new();
    let http_server = spawn_http_server(3001, app, handle.clone());

    shutdown_signal(handle).await;
    http_server.await?;
    manager.shutdown().await;
    tracing::info!("Session store shut down");
    Ok(())
}
