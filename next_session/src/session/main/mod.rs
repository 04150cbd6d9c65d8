mod cookie;
mod csrf;
mod manager;
mod resolver;
mod session;

#[cfg(test)]
mod test_utils;

pub use cookie::CookieHandler;
pub use csrf::CSRF_TOKEN_KEY;
pub use manager::SessionManager;
