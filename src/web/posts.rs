//! Post screens
//!
//! The public detail page plus the collaborator-only management screens.
//! Management handlers gate on the Collaborator role first and on
//! ownership second, so a role failure redirects home while an ownership
//! failure redirects back to the management list.

use crate::authz::{Action, Gate};
use crate::models::{CreatePostInput, Post, UpdatePostInput};
use crate::services::PostServiceError;
use crate::web::middleware::{AppState, CurrentUser};
use crate::web::render::{self, PageQuery};
use crate::web::flash;
use axum::extract::{Extension, Form, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tera::Context;

const MANAGE_PAGE_SIZE: i64 = 10;

const NO_MANAGE_ROLE: &str = "You do not have permission to manage posts.";
const NOT_YOUR_POST: &str = "You may only manage your own posts.";

#[derive(Debug, Deserialize, Serialize)]
pub struct PostForm {
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub active: Option<String>,
    pub published_at: Option<String>,
}

impl PostForm {
    fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            body: post.body.clone(),
            image: post.image.clone(),
            category_id: post.category_id.map(|id| id.to_string()),
            active: post.active.then(|| "on".to_string()),
            published_at: Some(post.published_at.format("%Y-%m-%dT%H:%M").to_string()),
        }
    }

    fn empty() -> Self {
        Self {
            title: String::new(),
            subtitle: None,
            body: String::new(),
            image: None,
            category_id: None,
            active: Some("on".to_string()),
            published_at: None,
        }
    }

    fn trimmed(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    /// Category selection; garbage values degrade to "no category".
    fn category_id(&self) -> Option<i64> {
        Self::trimmed(&self.category_id).and_then(|v| v.parse().ok())
    }

    /// Publication time from the datetime-local input; unparsable values
    /// leave the stored time untouched.
    fn published_at(&self) -> Option<DateTime<Utc>> {
        Self::trimmed(&self.published_at)
            .and_then(|v| NaiveDateTime::parse_from_str(&v, "%Y-%m-%dT%H:%M").ok())
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
    }

    fn create_input(&self) -> CreatePostInput {
        CreatePostInput {
            title: self.title.trim().to_string(),
            subtitle: Self::trimmed(&self.subtitle),
            body: self.body.trim().to_string(),
            image: Self::trimmed(&self.image),
            category_id: self.category_id(),
            active: self.active.is_some(),
            published_at: self.published_at(),
        }
    }

    fn update_input(&self) -> UpdatePostInput {
        UpdatePostInput {
            title: self.title.trim().to_string(),
            subtitle: Self::trimmed(&self.subtitle),
            body: self.body.trim().to_string(),
            image: Self::trimmed(&self.image),
            category_id: self.category_id(),
            active: self.active.is_some(),
            published_at: self.published_at(),
        }
    }
}

async fn form_context(state: &AppState, form: &PostForm) -> Result<Context, Response> {
    let categories = state.categories.list().await.map_err(|e| {
        tracing::error!("failed to list categories: {:#}", e);
        render::internal_error()
    })?;
    let mut context = Context::new();
    context.insert("categories", &categories);
    context.insert("form", form);
    Ok(context)
}

/// GET /posts - the requester's own posts, paginated.
pub async fn list_own(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let posts = match state
        .posts
        .list_by_author(user.id, query.page(), MANAGE_PAGE_SIZE)
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("failed to list posts: {:#}", e);
            return render::internal_error();
        }
    };

    let mut context = Context::new();
    context.insert("posts", &posts);
    render::page(&state, &headers, Some(&user), "posts/list.html", context)
}

/// GET /posts/new
pub async fn new_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let context = match form_context(&state, &PostForm::empty()).await {
        Ok(context) => context,
        Err(response) => return response,
    };
    render::page(&state, &headers, Some(&user), "posts/form.html", context)
}

/// POST /posts/new
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<PostForm>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.posts.create(user.id, form.create_input()).await {
        Ok(_) => flash::success("/posts", "Post created."),
        Err(PostServiceError::ValidationError(message)) => {
            let mut context = match form_context(&state, &form).await {
                Ok(context) => context,
                Err(response) => return response,
            };
            context.insert("errors", &[message]);
            render::page(&state, &headers, Some(&user), "posts/form.html", context)
        }
        Err(e) => {
            tracing::error!("failed to create post: {:#}", e);
            render::internal_error()
        }
    }
}

/// Load a post for a management handler, or redirect with a flash message.
async fn load_post(state: &AppState, id: i64) -> Result<Post, Response> {
    match state.posts.get(id).await {
        Ok(Some(post)) => Ok(post),
        Ok(None) => Err(flash::error("/posts", "Post not found.")),
        Err(e) => {
            tracing::error!("failed to load post {}: {:#}", id, e);
            Err(render::internal_error())
        }
    }
}

/// GET /posts/{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let post = match load_post(&state, id).await {
        Ok(post) => post,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .require(Action::EditPost(&post), "/posts", NOT_YOUR_POST)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let mut context = match form_context(&state, &PostForm::from_post(&post)).await {
        Ok(context) => context,
        Err(response) => return response,
    };
    context.insert("post", &post);
    render::page(&state, &headers, Some(&user), "posts/form.html", context)
}

/// POST /posts/{id}/edit
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Response {
    let post = match load_post(&state, id).await {
        Ok(post) => post,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .require(Action::EditPost(&post), "/posts", NOT_YOUR_POST)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.posts.update(&post, form.update_input()).await {
        Ok(_) => flash::success("/posts", "Post updated."),
        Err(PostServiceError::ValidationError(message)) => {
            let mut context = match form_context(&state, &form).await {
                Ok(context) => context,
                Err(response) => return response,
            };
            context.insert("post", &post);
            context.insert("errors", &[message]);
            render::page(&state, &headers, Some(&user), "posts/form.html", context)
        }
        Err(e) => {
            tracing::error!("failed to update post {}: {:#}", id, e);
            render::internal_error()
        }
    }
}

/// GET /posts/{id}/delete - confirmation page.
pub async fn delete_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let post = match load_post(&state, id).await {
        Ok(post) => post,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .require(Action::DeletePost(&post), "/posts", NOT_YOUR_POST)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let mut context = Context::new();
    context.insert("post", &post);
    render::page(
        &state,
        &headers,
        Some(&user),
        "posts/confirm_delete.html",
        context,
    )
}

/// POST /posts/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let post = match load_post(&state, id).await {
        Ok(post) => post,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManagePosts, "/", NO_MANAGE_ROLE)
        .require(Action::DeletePost(&post), "/posts", NOT_YOUR_POST)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.posts.delete(&post).await {
        Ok(()) => flash::success("/posts", "Post deleted."),
        Err(e) => {
            tracing::error!("failed to delete post {}: {:#}", id, e);
            render::internal_error()
        }
    }
}

/// GET /posts/{id} - public detail page with comments.
pub async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
) -> Response {
    let user = user.map(|Extension(CurrentUser(u))| u);

    let post = match state.posts.get_with_meta(id).await {
        Ok(Some(post)) => post,
        Ok(None) => return render::not_found(),
        Err(e) => {
            tracing::error!("failed to load post {}: {:#}", id, e);
            return render::internal_error();
        }
    };

    let comments = match state.comments.list_for_post(post.post.id).await {
        Ok(comments) => comments,
        Err(e) => {
            tracing::error!("failed to list comments: {:#}", e);
            return render::internal_error();
        }
    };

    let mut context = Context::new();
    context.insert("post", &post);
    context.insert("comments", &comments);
    render::page(&state, &headers, user.as_ref(), "posts/detail.html", context)
}
