use std::str::FromStr;

use authz::{authorize, can_mutate_role, Action, ResourceKind, ResourceRef, Role};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;
use user::{Account, AuthState};

use crate::{
    error::{ApiError, ApiResult},
    handlers::require_account,
    models::{
        page_window, DeleteResponse, ListParams, UserCreateRequest, UserListResponse,
        UserPatchRequest, UserResponse,
    },
    AppState,
};

fn account_ref() -> ResourceRef {
    ResourceRef::new(ResourceKind::Account)
}

fn parse_role(value: &str) -> ApiResult<Role> {
    Role::from_str(value)
        .map_err(|_| ApiError::validation("role", "role must be one of: user, moderator, admin"))
}

/// Copy the unguarded profile fields from a patch onto an account.
/// The role field is handled separately by the caller.
fn apply_profile_patch(account: &mut Account, patch: &UserPatchRequest) {
    if let Some(username) = &patch.username {
        account.username = username.clone();
    }
    if let Some(email) = &patch.email {
        account.email = email.clone();
    }
    if let Some(first_name) = &patch.first_name {
        account.first_name = first_name.clone();
    }
    if let Some(last_name) = &patch.last_name {
        account.last_name = last_name.clone();
    }
    if let Some(bio) = &patch.bio {
        account.bio = bio.clone();
    }
}

/// List accounts (admin only)
///
/// GET /api/v1/users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("search" = Option<String>, Query, description = "Filter by username substring"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Accounts listed", body = UserListResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::List, ResourceKind::Account, None)?;

    let (page, page_size, limit, offset) = page_window(params.page, params.page_size);
    let accounts = state
        .accounts
        .list(params.search.as_deref(), limit, offset)
        .await?;

    Ok(Json(UserListResponse {
        results: accounts.into_iter().map(UserResponse::from).collect(),
        page,
        page_size,
    }))
}

/// Create an account (admin only)
///
/// POST /api/v1/users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email, username, or role", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 409, description = "Email or username already taken", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<UserCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::Create, ResourceKind::Account, None)?;

    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation("email", "enter a valid email address"));
    }
    let role = payload.role.as_deref().map(parse_role).transpose()?;

    let (mut account, created) = state.accounts.get_or_create(email).await?;
    if !created {
        return Err(ApiError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    if let Some(username) = payload.username {
        if state.accounts.find_by_username(&username).await?.is_some() {
            return Err(ApiError::Conflict(
                "A user with this username already exists".to_string(),
            ));
        }
        account.username = username;
    }
    if let Some(first_name) = payload.first_name {
        account.first_name = first_name;
    }
    if let Some(last_name) = payload.last_name {
        account.last_name = last_name;
    }
    if let Some(bio) = payload.bio {
        account.bio = bio;
    }
    if let Some(role) = role {
        account.role = role;
    }
    state.accounts.update(&account).await?;

    info!("Account created by admin: {}", account.username);
    Ok((StatusCode::CREATED, Json(UserResponse::from(account))))
}

/// Retrieve an account by username (admin only)
///
/// GET /api/v1/users/{username}
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Account retrieved", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Retrieve,
        ResourceKind::Account,
        Some(&account_ref()),
    )?;

    let account = state
        .accounts
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", username)))?;

    Ok(Json(UserResponse::from(account)))
}

/// Update an account by username (admin only)
///
/// PATCH /api/v1/users/{username}
#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    request_body = UserPatchRequest,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 400, description = "Invalid role value", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(username): Path<String>,
    Json(payload): Json<UserPatchRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Update,
        ResourceKind::Account,
        Some(&account_ref()),
    )?;

    let mut account = state
        .accounts
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", username)))?;

    let role = payload.role.as_deref().map(parse_role).transpose()?;
    if let Some(role) = role {
        // The binding already restricts this surface to admins, but the
        // role guard is consulted on every role mutation regardless.
        if !can_mutate_role(&auth.principal()) {
            return Err(ApiError::validation("role", "you cannot change roles"));
        }
        account.role = role;
    }
    apply_profile_patch(&mut account, &payload);
    state.accounts.update(&account).await?;

    info!("Account updated by admin: {}", account.username);
    Ok(Json(UserResponse::from(account)))
}

/// Delete an account by username (admin only)
///
/// DELETE /api/v1/users/{username}
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Account deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "No such account", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Delete,
        ResourceKind::Account,
        Some(&account_ref()),
    )?;

    if !state.accounts.delete_by_username(&username).await? {
        return Err(ApiError::NotFound(format!("User {}", username)));
    }
    info!("Account deleted by admin: {}", username);
    Ok(Json(DeleteResponse { deleted: true }))
}

/// Retrieve the caller's own account
///
/// GET /api/v1/users/me
///
/// Bypasses the admin-only binding; the response is always the
/// caller's own record.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Own account retrieved", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn me(Extension(auth): Extension<AuthState>) -> ApiResult<impl IntoResponse> {
    let account = require_account(&auth)?;
    Ok(Json(UserResponse::from(account.clone())))
}

/// Update the caller's own account
///
/// PATCH /api/v1/users/me
///
/// Profile fields always apply. A role value in the payload is guarded:
/// a plain user's role change is rejected as a field error on `role`,
/// after the rest of the payload has been applied.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UserPatchRequest,
    responses(
        (status = 200, description = "Own account updated", body = UserResponse),
        (status = 400, description = "Role change rejected or invalid", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<UserPatchRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut account = require_account(&auth)?.clone();
    let principal = auth.principal();

    let role = payload.role.as_deref().map(parse_role).transpose()?;

    apply_profile_patch(&mut account, &payload);
    if let Some(role) = role {
        if can_mutate_role(&principal) {
            account.role = role;
        }
    }
    state.accounts.update(&account).await?;

    if payload.role.is_some() && !can_mutate_role(&principal) {
        info!("Role self-escalation rejected for {}", account.username);
        return Err(ApiError::validation("role", "you cannot change your own role"));
    }

    info!("Account self-updated: {}", account.username);
    Ok(Json(UserResponse::from(account)))
}
