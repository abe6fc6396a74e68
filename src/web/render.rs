//! Template rendering helpers

use crate::models::User;
use crate::web::flash;
use crate::web::middleware::AppState;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tera::Context;

/// Render a template into a full page response.
///
/// The current user, the media placeholders, and any pending flash message
/// are injected into the context; a shown flash message is cleared in the
/// same response. Render failures are logged and turn into a plain 500,
/// they carry no user-facing detail.
pub fn page(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<&User>,
    template: &str,
    mut context: Context,
) -> Response {
    if let Some(user) = user {
        context.insert("current_user", user);
    }
    context.insert("post_placeholder", &state.media.post_placeholder);
    context.insert("avatar_placeholder", &state.media.avatar_placeholder);

    let flash = flash::pop(headers);
    if let Some(flash) = &flash {
        context.insert("flash", flash);
    }

    match state.templates.render(template, &context) {
        Ok(html) => {
            let mut response = Html(html).into_response();
            if flash.is_some() {
                if let Ok(value) = HeaderValue::from_str(&flash::clear_cookie()) {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
            }
            response
        }
        Err(e) => {
            tracing::error!("failed to render {}: {:#}", template, e);
            internal_error()
        }
    }
}

/// Plain 500 response for unexpected failures.
pub fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Plain 404 response.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Pagination query string. The page number arrives as raw text so that
/// garbage values degrade to page 1 instead of a 400.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// The requested page, at least 1. Non-numeric input means page 1.
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_lenient_parsing() {
        let q = |s: Option<&str>| PageQuery {
            page: s.map(String::from),
        };
        assert_eq!(q(None).page(), 1);
        assert_eq!(q(Some("3")).page(), 3);
        assert_eq!(q(Some(" 2 ")).page(), 2);
        assert_eq!(q(Some("abc")).page(), 1);
        assert_eq!(q(Some("0")).page(), 1);
        assert_eq!(q(Some("-4")).page(), 1);
    }
}
