//! Login, logout, and registration

use crate::models::RegisterInput;
use crate::services::{LoginInput, UserServiceError};
use crate::web::middleware::{self, AppState, CurrentUser};
use crate::web::{flash, render};
use axum::extract::{Extension, Form, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tera::Context;

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
}

/// GET /accounts/login
pub async fn login_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user = user.map(|Extension(CurrentUser(u))| u);
    render::page(
        &state,
        &headers,
        user.as_ref(),
        "auth/login.html",
        Context::new(),
    )
}

/// POST /accounts/login
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let input = LoginInput {
        username: form.username.trim().to_string(),
        password: form.password.clone(),
    };

    match state.users.login(input).await {
        Ok(session) => {
            let mut response = flash::success("/", "Welcome back!");
            if let Ok(value) =
                HeaderValue::from_str(&middleware::session_cookie(&session.id, state.session_days))
            {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            response
        }
        Err(UserServiceError::AuthenticationError(message)) => {
            let mut context = Context::new();
            context.insert("error", &message);
            context.insert("form", &form);
            render::page(&state, &HeaderMap::new(), None, "auth/login.html", context)
        }
        Err(e) => {
            tracing::error!("login failed: {:#}", e);
            render::internal_error()
        }
    }
}

/// GET /accounts/register
pub async fn register_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let user = user.map(|Extension(CurrentUser(u))| u);
    render::page(
        &state,
        &headers,
        user.as_ref(),
        "auth/register.html",
        Context::new(),
    )
}

/// POST /accounts/register
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let mut errors: Vec<String> = Vec::new();

    if form.password != form.password_confirm {
        errors.push("Passwords do not match".to_string());
    }
    let birth_date = match NaiveDate::parse_from_str(form.birth_date.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("Enter a valid birth date (YYYY-MM-DD)".to_string());
            None
        }
    };

    if let Some(birth_date) = birth_date {
        if errors.is_empty() {
            let input = RegisterInput {
                username: form.username.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
                first_name: form.first_name.trim().to_string(),
                last_name: form.last_name.trim().to_string(),
                birth_date,
            };

            match state.users.register(input).await {
                Ok(_) => {
                    return flash::success(
                        "/accounts/login",
                        "Account created. You can now log in.",
                    );
                }
                Err(UserServiceError::ValidationError(message))
                | Err(UserServiceError::UserExists(message)) => errors.push(message),
                Err(e) => {
                    tracing::error!("registration failed: {:#}", e);
                    return render::internal_error();
                }
            }
        }
    }

    // Re-render the form with the submitted values and the errors.
    let mut context = Context::new();
    context.insert("errors", &errors);
    context.insert("form", &form);
    render::page(
        &state,
        &HeaderMap::new(),
        None,
        "auth/register.html",
        context,
    )
}

/// GET /accounts/logout - confirmation page.
pub async fn logout_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Response {
    render::page(
        &state,
        &headers,
        Some(&user),
        "auth/logout.html",
        Context::new(),
    )
}

/// POST /accounts/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = middleware::session_token(&headers) {
        if let Err(e) = state.users.logout(&token).await {
            tracing::error!("logout failed: {:#}", e);
        }
    }

    let mut response = flash::success("/", "You have been logged out.");
    if let Ok(value) = HeaderValue::from_str(&middleware::clear_session_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}
