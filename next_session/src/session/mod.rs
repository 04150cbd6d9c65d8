mod config;
mod errors;
mod main;
mod types;

pub use config::{CookieConfig, SameSite};
pub use errors::SessionError;
pub use main::{CSRF_TOKEN_KEY, CookieHandler, SessionManager};
pub use types::SessionId;
