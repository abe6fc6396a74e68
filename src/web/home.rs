//! Public front page

use crate::web::middleware::{AppState, CurrentUser};
use crate::web::render::{self, PageQuery};
use axum::extract::{Extension, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use tera::Context;

const PAGE_SIZE: i64 = 10;

/// GET / - active posts, newest publication first.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let user = user.map(|Extension(CurrentUser(u))| u);

    let posts = match state.posts.list_active(query.page(), PAGE_SIZE).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("failed to list posts: {:#}", e);
            return render::internal_error();
        }
    };
    let categories = match state.categories.list().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("failed to list categories: {:#}", e);
            return render::internal_error();
        }
    };

    let mut context = Context::new();
    context.insert("posts", &posts);
    context.insert("categories", &categories);
    render::page(&state, &headers, user.as_ref(), "index.html", context)
}
