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

/// List genres
///
/// GET /api/v1/genres
#[utoipa::path(
    get,
    path = "/api/v1/genres",
    params(
        ("search" = Option<String>, Query, description = "Filter by name substring"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Genres listed", body = TermListResponse)
    ),
    tag = "genres"
)]
pub async fn list_genres(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::List, ResourceKind::Genre, None)?;

    let (page, page_size, limit, offset) = page_window(params.page, params.page_size);
    let genres = state
        .catalog
        .list_genres(params.search.as_deref(), limit, offset)
        .await?;

    Ok(Json(TermListResponse {
        results: genres.into_iter().map(TermResponse::from).collect(),
        page,
        page_size,
    }))
}

/// Create a genre
///
/// POST /api/v1/genres
#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = TermRequest,
    responses(
        (status = 201, description = "Genre created", body = TermResponse),
        (status = 400, description = "Invalid name or slug", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse)
    ),
    tag = "genres"
)]
pub async fn create_genre(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<TermRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::Create, ResourceKind::Genre, None)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "name must not be blank"));
    }

    let genre = state
        .catalog
        .create_genre(payload.name.trim(), payload.slug.as_deref())
        .await?;

    info!("Genre created: {}", genre.slug);
    Ok((StatusCode::CREATED, Json(TermResponse::from(genre))))
}

/// Single-item fetch is not part of the genre surface.
///
/// GET /api/v1/genres/{slug} answers 405 for everyone.
pub async fn retrieve_genre(
    Extension(auth): Extension<AuthState>,
    Path(_slug): Path<String>,
) -> ApiResult<()> {
    authorize(
        &auth.principal(),
        Action::Retrieve,
        ResourceKind::Genre,
        Some(&ResourceRef::new(ResourceKind::Genre)),
    )?;
    Ok(())
}

/// Delete a genre by slug
///
/// DELETE /api/v1/genres/{slug}
#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 200, description = "Genre deleted", body = DeleteResponse),
        (status = 404, description = "No such genre", body = ApiErrorResponse)
    ),
    tag = "genres"
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Delete,
        ResourceKind::Genre,
        Some(&ResourceRef::new(ResourceKind::Genre)),
    )?;

    if !state.catalog.delete_genre(&slug).await? {
        return Err(ApiError::NotFound(format!("Genre {}", slug)));
    }
    info!("Genre deleted: {}", slug);
    Ok(Json(DeleteResponse { deleted: true }))
}
