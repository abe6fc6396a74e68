//! Category screens
//!
//! The public per-category listing plus the collaborator-only management
//! screens. A role failure on the list redirects home; failures on the
//! mutating screens redirect back to the category list.

use crate::authz::{Action, Gate};
use crate::models::Category;
use crate::services::CategoryServiceError;
use crate::web::flash;
use crate::web::middleware::{AppState, CurrentUser};
use crate::web::render::{self, PageQuery};
use axum::extract::{Extension, Form, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tera::Context;

const CATEGORY_PAGE_SIZE: i64 = 3;

const NO_MANAGE_ROLE: &str = "You do not have permission to manage categories.";

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryForm {
    pub name: String,
}

/// GET /categories - management list.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let categories = match state.categories.list().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!("failed to list categories: {:#}", e);
            return render::internal_error();
        }
    };

    let mut context = Context::new();
    context.insert("categories", &categories);
    render::page(
        &state,
        &headers,
        Some(&user),
        "categories/list.html",
        context,
    )
}

/// GET /categories/new
pub async fn new_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/categories", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let mut context = Context::new();
    context.insert("form", &CategoryForm {
        name: String::new(),
    });
    render::page(
        &state,
        &headers,
        Some(&user),
        "categories/form.html",
        context,
    )
}

/// POST /categories/new
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(form): Form<CategoryForm>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/categories", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.categories.create(&form.name).await {
        Ok(category) => flash::success(
            "/categories",
            &format!("Category '{}' created.", category.name),
        ),
        Err(CategoryServiceError::ValidationError(message))
        | Err(CategoryServiceError::NameExists(message)) => {
            let mut context = Context::new();
            context.insert("form", &form);
            context.insert("errors", &[message]);
            render::page(
                &state,
                &headers,
                Some(&user),
                "categories/form.html",
                context,
            )
        }
        Err(e) => {
            tracing::error!("failed to create category: {:#}", e);
            render::internal_error()
        }
    }
}

/// Load a category for a management handler, or redirect with a flash
/// message.
async fn load_category(state: &AppState, id: i64) -> Result<Category, Response> {
    match state.categories.get(id).await {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(flash::error("/categories", "Category not found.")),
        Err(e) => {
            tracing::error!("failed to load category {}: {:#}", id, e);
            Err(render::internal_error())
        }
    }
}

/// GET /categories/{id}/edit
pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/categories", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let category = match load_category(&state, id).await {
        Ok(category) => category,
        Err(response) => return response,
    };

    let mut context = Context::new();
    context.insert("category", &category);
    context.insert("form", &CategoryForm {
        name: category.name.clone(),
    });
    render::page(
        &state,
        &headers,
        Some(&user),
        "categories/form.html",
        context,
    )
}

/// POST /categories/{id}/edit
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<CategoryForm>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/categories", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.categories.rename(id, &form.name).await {
        Ok(category) => flash::success(
            "/categories",
            &format!("Category renamed to '{}'.", category.name),
        ),
        Err(CategoryServiceError::NotFound) => {
            flash::error("/categories", "Category not found.")
        }
        Err(CategoryServiceError::ValidationError(message))
        | Err(CategoryServiceError::NameExists(message)) => {
            let mut context = Context::new();
            context.insert("form", &form);
            context.insert("errors", &[message]);
            render::page(
                &state,
                &headers,
                Some(&user),
                "categories/form.html",
                context,
            )
        }
        Err(e) => {
            tracing::error!("failed to rename category {}: {:#}", id, e);
            render::internal_error()
        }
    }
}

/// GET /categories/{id}/delete - confirmation page.
pub async fn delete_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/categories", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let category = match load_category(&state, id).await {
        Ok(category) => category,
        Err(response) => return response,
    };

    let mut context = Context::new();
    context.insert("category", &category);
    render::page(
        &state,
        &headers,
        Some(&user),
        "categories/confirm_delete.html",
        context,
    )
}

/// POST /categories/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageCategories, "/categories", NO_MANAGE_ROLE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state.categories.delete(id).await {
        Ok(()) => flash::success("/categories", "Category deleted."),
        Err(CategoryServiceError::NotFound) => {
            flash::error("/categories", "Category not found.")
        }
        Err(e) => {
            tracing::error!("failed to delete category {}: {:#}", id, e);
            render::internal_error()
        }
    }
}

/// GET /categories/{id}/posts - public listing of one category's active
/// posts.
pub async fn posts_by_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Response {
    let user = user.map(|Extension(CurrentUser(u))| u);

    let category = match state.categories.get(id).await {
        Ok(Some(category)) => category,
        Ok(None) => return flash::error("/", "Category not found."),
        Err(e) => {
            tracing::error!("failed to load category {}: {:#}", id, e);
            return render::internal_error();
        }
    };

    let posts = match state
        .posts
        .list_by_category(category.id, query.page(), CATEGORY_PAGE_SIZE)
        .await
    {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("failed to list posts: {:#}", e);
            return render::internal_error();
        }
    };

    let mut context = Context::new();
    context.insert("category", &category);
    context.insert("posts", &posts);
    render::page(
        &state,
        &headers,
        user.as_ref(),
        "categories/posts.html",
        context,
    )
}
