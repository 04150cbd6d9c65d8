use axum::Router;
use axum_server::Handle;
use std::{net::SocketAddr, time::Duration};
use tokio::task::JoinHandle;

pub(crate) fn spawn_http_server(port: u16, app: Router, handle: Handle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!("HTTP server listening on {}", addr);
        if let Err(e) = axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
        {
            tracing::error!("HTTP server failed: {}", e);
        }
    })
}

/// Wait for Ctrl-C, then let in-flight requests finish.
pub(crate) async fn shutdown_signal(handle: Handle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
    }
    tracing::info!("Shutting down");
    handle.graceful_shutdown(Some(Duration::from_secs(5)));
}
