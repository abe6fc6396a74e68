//! Account management panel
//!
//! The list is open to superusers and collaborators; each row carries a
//! deletable flag resolved through the same rule the delete gate uses.
//! Role changes are a superuser-only toggle.

use crate::authz::{Action, Gate};
use crate::models::User;
use crate::services::UserServiceError;
use crate::web::flash;
use crate::web::middleware::{self, AppState, CurrentUser};
use crate::web::render;
use axum::extract::{Extension, Form, Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use serde::Deserialize;
use tera::Context;

const NO_MANAGE: &str = "You do not have permission to manage accounts.";
const NO_DELETE: &str = "You do not have permission to delete this account.";

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub collaborator: Option<String>,
}

/// GET /accounts
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Response {
    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageAccounts, "/", NO_MANAGE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let accounts = match state.users.account_list(&user).await {
        Ok(accounts) => accounts,
        Err(e) => {
            tracing::error!("failed to list accounts: {:#}", e);
            return render::internal_error();
        }
    };

    let mut context = Context::new();
    context.insert("accounts", &accounts);
    render::page(&state, &headers, Some(&user), "accounts/list.html", context)
}

/// Load the targeted account, or redirect back to the list.
async fn load_target(state: &AppState, id: i64) -> Result<User, Response> {
    match state.users.get(id).await {
        Ok(Some(target)) => Ok(target),
        Ok(None) => Err(flash::error("/accounts", "Account not found.")),
        Err(e) => {
            tracing::error!("failed to load account {}: {:#}", id, e);
            Err(render::internal_error())
        }
    }
}

/// GET /accounts/{id}/delete - confirmation page.
pub async fn delete_confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let target = match load_target(&state, id).await {
        Ok(target) => target,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageAccounts, "/", NO_MANAGE)
        .require(Action::DeleteAccount(&target), "/accounts", NO_DELETE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    let mut context = Context::new();
    context.insert("target", &target);
    render::page(
        &state,
        &headers,
        Some(&user),
        "accounts/confirm_delete.html",
        context,
    )
}

/// POST /accounts/{id}/delete
///
/// The target's post images are purged before the rows cascade away. A
/// superuser deleting their own account ends their session too.
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> Response {
    let target = match load_target(&state, id).await {
        Ok(target) => target,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageAccounts, "/", NO_MANAGE)
        .require(Action::DeleteAccount(&target), "/accounts", NO_DELETE)
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    if let Err(e) = state.posts.purge_author_media(target.id).await {
        tracing::warn!("failed to purge media for account {}: {:#}", target.id, e);
    }

    match state.users.delete_account(target.id).await {
        Ok(()) => {
            if target.id == user.id {
                // Self-deletion: the session row is already gone, expire
                // the cookie as well.
                let mut response = flash::success("/", "Your account has been deleted.");
                if let Ok(value) = HeaderValue::from_str(&middleware::clear_session_cookie()) {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                response
            } else {
                flash::success(
                    "/accounts",
                    &format!("Account '{}' deleted.", target.username),
                )
            }
        }
        Err(UserServiceError::NotFound) => flash::error("/accounts", "Account not found."),
        Err(e) => {
            tracing::error!("failed to delete account {}: {:#}", id, e);
            render::internal_error()
        }
    }
}

/// POST /accounts/{id}/role - toggle the Collaborator role.
pub async fn set_role(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<RoleForm>,
) -> Response {
    let target = match load_target(&state, id).await {
        Ok(target) => target,
        Err(response) => return response,
    };

    if let Err(denial) = Gate::new(&user)
        .require(Action::ManageAccounts, "/", NO_MANAGE)
        .require(
            Action::SetRole(&target),
            "/accounts",
            "Only a superuser may change roles.",
        )
        .evaluate()
    {
        return flash::error(&denial.redirect, &denial.message);
    }

    match state
        .users
        .set_collaborator(target.id, form.collaborator.is_some())
        .await
    {
        Ok(()) => flash::success(
            "/accounts",
            &format!("Role updated for '{}'.", target.username),
        ),
        Err(UserServiceError::NotFound) => flash::error("/accounts", "Account not found."),
        Err(e) => {
            tracing::error!("failed to update role for account {}: {:#}", id, e);
            render::internal_error()
        }
    }
}
