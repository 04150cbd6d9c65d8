//! Central configuration for the next_session_axum crate

use std::sync::LazyLock;

/// Mount point suggested for [`crate::session_router`]
/// Default: "/session"
pub static NEXT_SESSION_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    std::env::var("NEXT_SESSION_ROUTE_PREFIX").unwrap_or_else(|_| "/session".to_string())
});

/// Request/response header carrying the CSRF token
/// Default: "X-CSRF-Token"
pub static NEXT_SESSION_CSRF_HEADER: LazyLock<String> = LazyLock::new(|| {
    std::env::var("NEXT_SESSION_CSRF_HEADER")
        .ok()
        .filter(|name| http::HeaderName::from_bytes(name.as_bytes()).is_ok())
        .unwrap_or_else(|| "X-CSRF-Token".to_string())
});
