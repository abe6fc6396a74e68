//! Comment screens
//!
//! Creating a comment happens from the post detail page; editing and
//! deleting have their own small screens. Moderation follows the
//! owner-or-collaborator rule, and every redirect lands back on the parent
//! post's detail page when it still exists.

use crate::authz::{Action, Gate};
use crate::models::Comment;
use crate::services::CommentServiceError;
use crate::web::flash;
use crate::web::middleware::{AppState, CurrentUser};
use crate::web::render;
use axum::extract::{Extension, Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tera::Context;

const NOT_YOUR_COMMENT: &str = "You do not have permission to modify this comment.";

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentForm {
    pub body: String,
}

/// Where a comment operation should land: the parent post's detail page,
/// or home when the post is gone.
async fn post_url(state: &AppState, post_id: i64) -> String {
    match state.posts.get(post_id).await {
        Ok(Some(post)) => format!("/posts/{}", post.id),
        Ok(None) => "/".to_string(),
        Err(e) => {
            tracing::error!("failed to load post {}: {:#}", post_id, e);
            "/".to_string()
        }
    }
}

/// Load a comment, or redirect home with a flash message.
async fn load_comment(state: &AppState, id: i64) -> Result<Comment, Response> {
    match state.comments.get(id).await {
        Ok(Some(comment)) => Ok(comment),
        Ok(None) => Err(flash::error("/", "Comment not found.")),
        Err(e) => {
            tracing::error!("failed to load comment {}: {:#}", id, e);
            Err(render::internal_error())
        }
    }
}

/// POST /posts/{id}/comments - any logged-in user may comment.
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    let post = match state.posts.get(post_id).await {
        Ok(Some(post)) => post,
        Ok(None) => return flash::error("/", "Post not found."),
        Err(e) => {
            tracing::error!("failed to load post {}: {:#}", post_id, e);
            return render::internal_error();
        }
    };

    match state.comments.create(post.id, user.id, &form.body).await {
        Ok(_) => flash::success(&format!("/posts/{}", post.id), "Comment added."),
        Err(CommentServiceError::ValidationError(message)) => {
            flash::error(&format!("/posts/{}", post.id), &message)
        }
        Err(e) => {
            tracing::error!("failed to create comment: {:#}", e);
            render::internal_error()
        }
    }
}

/// GET /comments/{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let comment = match load_comment(&state, id).await {
        Ok(comment) => comment,
        Err(response) => return response,
    };
    let back = post_url(&state, comment.post_id).await;

    if let Err(denial) = Gate::new(&user)
        .require(Action::EditComment(&comment), &back, NOT_YOUR_COMMENT)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let mut context = Context::new();
    context.insert("comment", &comment);
    context.insert("form", &CommentForm {
        body: comment.body.clone(),
    });
    context.insert("back", &back);
    render::page(&state, &headers, Some(&user), "comments/edit.html", context)
}

/// POST /comments/{id}/edit
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    let comment = match load_comment(&state, id).await {
        Ok(comment) => comment,
        Err(response) => return response,
    };
    let back = post_url(&state, comment.post_id).await;

    if let Err(denial) = Gate::new(&user)
        .require(Action::EditComment(&comment), &back, NOT_YOUR_COMMENT)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.comments.update(&comment, &form.body).await {
        Ok(_) => flash::success(&back, "Comment updated."),
        Err(CommentServiceError::ValidationError(message)) => {
            let mut context = Context::new();
            context.insert("comment", &comment);
            context.insert("form", &form);
            context.insert("back", &back);
            context.insert("errors", &[message]);
            render::page(&state, &headers, Some(&user), "comments/edit.html", context)
        }
        Err(e) => {
            tracing::error!("failed to update comment {}: {:#}", id, e);
            render::internal_error()
        }
    }
}

/// GET /comments/{id}/delete - confirmation page.
pub async fn delete_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let comment = match load_comment(&state, id).await {
        Ok(comment) => comment,
        Err(response) => return response,
    };
    let back = post_url(&state, comment.post_id).await;

    if let Err(denial) = Gate::new(&user)
        .require(Action::DeleteComment(&comment), &back, NOT_YOUR_COMMENT)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let mut context = Context::new();
    context.insert("comment", &comment);
    context.insert("back", &back);
    render::page(
        &state,
        &headers,
        Some(&user),
        "comments/confirm_delete.html",
        context,
    )
}

/// POST /comments/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let comment = match load_comment(&state, id).await {
        Ok(comment) => comment,
        Err(response) => return response,
    };
    let back = post_url(&state, comment.post_id).await;

    if let Err(denial) = Gate::new(&user)
        .require(Action::DeleteComment(&comment), &back, NOT_YOUR_COMMENT)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.comments.delete(comment.id).await {
        Ok(()) => flash::success(&back, "Comment deleted."),
        Err(CommentServiceError::NotFound) => flash::error(&back, "Comment not found."),
        Err(e) => {
            tracing::error!("failed to delete comment {}: {:#}", id, e);
            render::internal_error()
        }
    }
}
