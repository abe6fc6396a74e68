//! Flash messages
//!
//! One-shot messages carried across a redirect in a cookie. The redirect
//! response sets the cookie, the next rendered page reads it, shows the
//! message, and clears it.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

const COOKIE_NAME: &str = "flash";

/// Message severity, rendered as a CSS class in templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Level> {
        match s {
            "success" => Some(Level::Success),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

/// A flash message popped from the request cookie.
#[derive(Debug, Clone, Serialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

/// 303 redirect to `to` carrying a success message.
pub fn success(to: &str, message: &str) -> Response {
    redirect_with(to, Level::Success, message)
}

/// 303 redirect to `to` carrying an error message.
pub fn error(to: &str, message: &str) -> Response {
    redirect_with(to, Level::Error, message)
}

fn redirect_with(to: &str, level: Level, message: &str) -> Response {
    let cookie = format!(
        "{}={}:{}; Path=/; HttpOnly; SameSite=Lax",
        COOKIE_NAME,
        level.as_str(),
        urlencoding::encode(message)
    );
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, to.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}

/// Read the flash cookie from the request headers, if present and well
/// formed. Malformed cookies are dropped silently.
pub fn pop(headers: &HeaderMap) -> Option<Flash> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        if let Some(value) = pair.trim().strip_prefix("flash=") {
            let (level, rest) = value.split_once(':')?;
            let level = Level::parse(level)?;
            let message = urlencoding::decode(rest).ok()?.into_owned();
            return Some(Flash { level, message });
        }
    }
    None
}

/// Set-Cookie value that expires the flash cookie.
pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", COOKIE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_redirect_sets_location_and_cookie() {
        let response = error("/accounts", "No permission.");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts"
        );
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("flash=error:"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn test_pop_roundtrip_with_encoded_message() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!(
                "other=1; flash=success:{}",
                urlencoding::encode("Post created: ¡hola!")
            ))
            .unwrap(),
        );

        let flash = pop(&headers).unwrap();
        assert_eq!(flash.level, Level::Success);
        assert_eq!(flash.message, "Post created: ¡hola!");
    }

    #[test]
    fn test_pop_ignores_malformed_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("flash=garbage"));
        assert!(pop(&headers).is_none());

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("flash=shout:loud"),
        );
        assert!(pop(&headers).is_none());
    }
}
