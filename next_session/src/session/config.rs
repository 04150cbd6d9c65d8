use std::env;

use crate::config::parse_bool;

pub(crate) const DEFAULT_COOKIE_NAME: &str = "nextSession";

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
    /// Omit the attribute altogether.
    Disabled,
}

impl SameSite {
    /// Parse the boolean-or-string form: `true`/`strict`, `lax`, `none`, `false`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "none" => Some(Self::None),
            "false" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub(crate) fn attribute(&self) -> Option<&'static str> {
        match self {
            Self::Strict => Some("Strict"),
            Self::Lax => Some("Lax"),
            Self::None => Some("None"),
            Self::Disabled => None,
        }
    }
}

impl From<bool> for SameSite {
    fn from(value: bool) -> Self {
        if value { Self::Strict } else { Self::Disabled }
    }
}

/// Name and attributes of the session cookie.
///
/// No `Expires`/`Max-Age` is set on the live cookie: it lasts for the browser
/// session while the server-side record carries the real expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            path: "/".to_string(),
            http_only: true,
            same_site: SameSite::Strict,
            secure: false,
        }
    }
}

impl CookieConfig {
    /// Defaults overridden by the `NEXT_SESSION_COOKIE_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let same_site = match env::var("NEXT_SESSION_COOKIE_SAME_SITE") {
            Ok(raw) => SameSite::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid value for NEXT_SESSION_COOKIE_SAME_SITE: {raw:?}, using default"
                );
                defaults.same_site
            }),
            Err(_) => defaults.same_site,
        };

        Self {
            name: env::var("NEXT_SESSION_COOKIE_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.name),
            path: env::var("NEXT_SESSION_COOKIE_PATH").unwrap_or(defaults.path),
            http_only: parse_bool(
                "NEXT_SESSION_COOKIE_HTTP_ONLY",
                env::var("NEXT_SESSION_COOKIE_HTTP_ONLY").ok().as_deref(),
                defaults.http_only,
            ),
            same_site,
            secure: parse_bool(
                "NEXT_SESSION_COOKIE_SECURE",
                env::var("NEXT_SESSION_COOKIE_SECURE").ok().as_deref(),
                defaults.secure,
            ),
        }
    }
}
