//! Application state and session middleware

use crate::config::MediaConfig;
use crate::services::{CategoryService, CommentService, PostService, UserService};
use crate::web::flash;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tera::Tera;

pub const SESSION_COOKIE: &str = "session";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub comments: Arc<CommentService>,
    pub templates: Arc<Tera>,
    pub media: Arc<MediaConfig>,
    pub session_days: i64,
}

/// The logged-in user, inserted as a request extension by the session
/// middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub crate::models::User);

/// Set-Cookie value for a fresh session.
pub fn session_cookie(token: &str, max_age_days: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age_days * 86_400
    )
}

/// Set-Cookie value that expires the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

/// The session token from the request cookies, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        if let Some(value) = pair.trim().strip_prefix("session=") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = session_token(headers)?;
    match state.users.validate_session(&token).await {
        Ok(user) => user.map(CurrentUser),
        Err(e) => {
            tracing::error!("session lookup failed: {:#}", e);
            None
        }
    }
}

/// Reject anonymous requests with a redirect to the login page; otherwise
/// attach the user to the request.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_user(&state, request.headers()).await {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => flash::error("/accounts/login", "Please log in to continue."),
    }
}

/// Attach the user when a valid session is present; anonymous requests
/// pass through untouched.
pub async fn load_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_user(&state, request.headers()).await {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_parses_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("flash=x; session=abc-123"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_session_token_absent_or_empty() {
        let headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert!(session_token(&headers).is_none());
    }
}
