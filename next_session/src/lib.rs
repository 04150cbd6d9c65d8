//! next-session - Lazy cookie-backed server-side sessions
//!
//! Session data lives in a pluggable store (in-memory with a background
//! sweeper, or Redis) under an opaque id carried in an HTTP-only cookie.
//! Sessions only materialize client-side once something is written, and
//! single-use CSRF tokens are kept alongside the session data.

mod config;
mod session;
mod storage;
mod utils;

pub use config::{DEFAULT_MAX_SESSION_AGE, DEFAULT_SWEEP_INTERVAL, SessionConfig, StoreConfig};

pub use session::{
    CSRF_TOKEN_KEY, CookieConfig, CookieHandler, SameSite, SessionError, SessionId,
    SessionManager,
};

pub use storage::{
    InMemorySessionStore, RedisSessionStore, SessionData, SessionStore, StorageError,
    create_session_store,
};

pub use utils::{UtilError, gen_random_string};
