mod config;
mod memory;
mod redis;
mod types;

pub use config::create_session_store;
pub use types::{InMemorySessionStore, RedisSessionStore, SessionStore};
