use chrono::{DateTime, Utc};
use http::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};

use crate::session::config::CookieConfig;
use crate::session::errors::SessionError;

/// Reads, writes and clears the session id cookie.
///
/// A pure codec over the cookie name and attributes; it never consults the store.
#[derive(Debug, Clone, Default)]
pub struct CookieHandler {
    config: CookieConfig,
}

impl CookieHandler {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Extract the session id from the request's `Cookie` header(s).
    ///
    /// Returns `None` when there is no cookie header or no cookie with the configured name.
    pub fn read<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        let cookie_name = self.config.name.as_str();

        for cookie_header in headers.get_all(COOKIE) {
            let Ok(cookie_str) = cookie_header.to_str() else {
                tracing::warn!("Ignoring cookie header that is not visible ASCII");
                continue;
            };

            let value = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
                let mut parts = s.splitn(2, '=');
                match (parts.next(), parts.next()) {
                    (Some(k), Some(v)) if k.trim() == cookie_name => {
                        let v = unquote(v.trim());
                        (!v.is_empty()).then_some(v)
                    }
                    _ => None,
                }
            });

            if value.is_some() {
                return value;
            }
        }

        tracing::trace!("No session cookie '{}' found in cookies", cookie_name);
        None
    }

    /// Append a `Set-Cookie` header carrying `session_id`.
    pub fn write(&self, headers: &mut HeaderMap, session_id: &str) -> Result<(), SessionError> {
        let cookie = self.format_cookie(session_id, None);
        append_set_cookie(headers, &cookie)
    }

    /// Append a `Set-Cookie` header that makes the client discard the session cookie.
    pub fn destroy(&self, headers: &mut HeaderMap) -> Result<(), SessionError> {
        let cookie = self.format_cookie("", Some(DateTime::<Utc>::UNIX_EPOCH));
        append_set_cookie(headers, &cookie)
    }

    fn format_cookie(&self, value: &str, expires: Option<DateTime<Utc>>) -> String {
        let mut cookie = format!("{}={}; Path={}", self.config.name, value, self.config.path);
        if let Some(expires) = expires {
            cookie.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if self.config.http_only {
            cookie.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.config.same_site.attribute() {
            cookie.push_str("; SameSite=");
            cookie.push_str(same_site);
        }
        if self.config.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) -> Result<(), SessionError> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|_| SessionError::Cookie("Failed to parse cookie".to_string()))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}
