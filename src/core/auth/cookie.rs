//! Token cookie handling
//!
//! The token pair travels as two cookies, `AccessToken` and `RefreshToken`,
//! both `HttpOnly; Secure; SameSite=Strict` so scripts cannot read them and
//! cross-site requests do not carry them. Header values are assembled by
//! hand; the attribute set is small enough that a cookie crate would add
//! more surface than it removes.

use axum::http::{HeaderMap, HeaderValue, header};

/// Access-token cookie name
pub const ACCESS_TOKEN_COOKIE: &str = "AccessToken";

/// Refresh-token cookie name
pub const REFRESH_TOKEN_COOKIE: &str = "RefreshToken";

/// Attributes for one auth cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: &'static str,
    pub max_age_secs: i64,
}

impl CookieConfig {
    pub fn access_token(max_age_secs: i64) -> Self {
        Self {
            name: ACCESS_TOKEN_COOKIE,
            max_age_secs,
        }
    }

    pub fn refresh_token(max_age_secs: i64) -> Self {
        Self {
            name: REFRESH_TOKEN_COOKIE,
            max_age_secs,
        }
    }

    /// Build the Set-Cookie header value carrying `value`
    pub fn build_set_cookie(&self, value: &str) -> String {
        format!(
            "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
            self.name, value, self.max_age_secs
        )
    }

    /// Build the Set-Cookie header value that deletes the cookie
    pub fn build_delete_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
            self.name
        )
    }
}

/// Set-Cookie header value carrying `value`, safe against invalid bytes
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> HeaderValue {
    HeaderValue::from_str(&config.build_set_cookie(value))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Set-Cookie header value that deletes the cookie
pub fn delete_cookie_header(config: &CookieConfig) -> HeaderValue {
    HeaderValue::from_str(&config.build_delete_cookie())
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Extract a cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}
