use authz::{authorize, Action, ResourceKind, ResourceRef};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;
use user::AuthState;

use crate::{
    error::{ApiError, ApiResult},
    models::{page_window, DeleteResponse, ListParams, TermListResponse, TermRequest, TermResponse},
    AppState,
};

/// List categories
///
/// GET /api/v1/categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(
        ("search" = Option<String>, Query, description = "Filter by name substring"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Categories listed", body = TermListResponse)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::List, ResourceKind::Category, None)?;

    let (page, page_size, limit, offset) = page_window(params.page, params.page_size);
    let categories = state
        .catalog
        .list_categories(params.search.as_deref(), limit, offset)
        .await?;

    Ok(Json(TermListResponse {
        results: categories.into_iter().map(TermResponse::from).collect(),
        page,
        page_size,
    }))
}

/// Create a category
///
/// POST /api/v1/categories
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = TermRequest,
    responses(
        (status = 201, description = "Category created", body = TermResponse),
        (status = 400, description = "Invalid name or slug", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse)
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<TermRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::Create, ResourceKind::Category, None)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "name must not be blank"));
    }

    let category = state
        .catalog
        .create_category(payload.name.trim(), payload.slug.as_deref())
        .await?;

    info!("Category created: {}", category.slug);
    Ok((StatusCode::CREATED, Json(TermResponse::from(category))))
}

/// Single-item fetch is not part of the category surface.
///
/// GET /api/v1/categories/{slug} answers 405 for everyone.
pub async fn retrieve_category(
    Extension(auth): Extension<AuthState>,
    Path(_slug): Path<String>,
) -> ApiResult<()> {
    authorize(
        &auth.principal(),
        Action::Retrieve,
        ResourceKind::Category,
        Some(&ResourceRef::new(ResourceKind::Category)),
    )?;
    Ok(())
}

/// Delete a category by slug
///
/// DELETE /api/v1/categories/{slug}
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 200, description = "Category deleted", body = DeleteResponse),
        (status = 404, description = "No such category", body = ApiErrorResponse)
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Delete,
        ResourceKind::Category,
        Some(&ResourceRef::new(ResourceKind::Category)),
    )?;

    if !state.catalog.delete_category(&slug).await? {
        return Err(ApiError::NotFound(format!("Category {}", slug)));
    }
    info!("Category deleted: {}", slug);
    Ok(Json(DeleteResponse { deleted: true }))
}
