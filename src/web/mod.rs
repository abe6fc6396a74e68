//! Web layer - HTTP handlers and routing
//!
//! Server-rendered pages over tera templates. Authorization failures never
//! surface as error pages: the gate in each handler produces a redirect to
//! a safe fallback view plus a flash message.

pub mod accounts;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod flash;
pub mod home;
pub mod middleware;
pub mod posts;
pub mod render;

use axum::{
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use middleware::{AppState, CurrentUser};

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // Routes that require a logged-in user; anonymous requests are
    // redirected to the login page with a flash message.
    let protected = Router::new()
        .route("/posts", get(posts::list_own))
        .route("/posts/new", get(posts::new_form).post(posts::create))
        .route("/posts/{id}/edit", get(posts::edit_form).post(posts::update))
        .route(
            "/posts/{id}/delete",
            get(posts::delete_confirm).post(posts::delete),
        )
        .route("/posts/{id}/comments", axum::routing::post(comments::create))
        .route(
            "/comments/{id}/edit",
            get(comments::edit_form).post(comments::update),
        )
        .route(
            "/comments/{id}/delete",
            get(comments::delete_confirm).post(comments::delete),
        )
        .route("/categories", get(categories::list))
        .route(
            "/categories/new",
            get(categories::new_form).post(categories::create),
        )
        .route(
            "/categories/{id}/edit",
            get(categories::edit_form).post(categories::update),
        )
        .route(
            "/categories/{id}/delete",
            get(categories::delete_confirm).post(categories::delete),
        )
        .route("/accounts", get(accounts::list))
        .route(
            "/accounts/{id}/delete",
            get(accounts::delete_confirm).post(accounts::delete),
        )
        .route("/accounts/{id}/role", axum::routing::post(accounts::set_role))
        .route(
            "/accounts/logout",
            get(auth::logout_confirm).post(auth::logout),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_login,
        ));

    // Public routes; the user is loaded when a valid session cookie is
    // present so templates can adapt.
    let public = Router::new()
        .route("/", get(home::index))
        .route("/posts/{id}", get(posts::detail))
        .route(
            "/categories/{id}/posts",
            get(categories::posts_by_category),
        )
        .route("/accounts/login", get(auth::login_form).post(auth::login))
        .route(
            "/accounts/register",
            get(auth::register_form).post(auth::register),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::load_user,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/media", ServeDir::new(state.media.root.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
