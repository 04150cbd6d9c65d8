//! next-session-axum - Axum integration for next-session
//!
//! Provides the session endpoints router and a CSRF-checking middleware on top
//! of a shared [`SessionManager`].

mod config;
mod error;
mod middleware;
mod router;
mod session;

pub use config::{NEXT_SESSION_CSRF_HEADER, NEXT_SESSION_ROUTE_PREFIX};
pub use error::IntoResponseError;
pub use middleware::csrf_protect;
pub use router::{session_router, session_router_no_trace};

// Re-export the core types handlers need
pub use next_session::{
    CSRF_TOKEN_KEY, SessionConfig, SessionData, SessionError, SessionManager,
};
