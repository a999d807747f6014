use authz::{authorize, Action, ResourceKind, ResourceRef};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use catalog::{NewTitle, TitleFilter, TitlePatch};
use tracing::info;
use user::AuthState;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        page_window, DeleteResponse, TitleListParams, TitleListResponse, TitlePatchRequest,
        TitleRequest, TitleResponse,
    },
    AppState,
};

fn title_ref() -> ResourceRef {
    ResourceRef::new(ResourceKind::Title)
}

/// List titles with optional filters
///
/// GET /api/v1/titles
#[utoipa::path(
    get,
    path = "/api/v1/titles",
    params(
        ("category" = Option<String>, Query, description = "Category slug, exact"),
        ("genre" = Option<String>, Query, description = "Genre slug, exact"),
        ("name" = Option<String>, Query, description = "Name substring"),
        ("year" = Option<i64>, Query, description = "Publication year, exact"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Titles listed", body = TitleListResponse)
    ),
    tag = "titles"
)]
pub async fn list_titles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Query(params): Query<TitleListParams>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::List, ResourceKind::Title, None)?;

    let filter = TitleFilter {
        category: params.category,
        genre: params.genre,
        name: params.name,
        year: params.year,
    };
    let (page, page_size, limit, offset) = page_window(params.page, params.page_size);
    let titles = state.catalog.list_titles(&filter, limit, offset).await?;

    Ok(Json(TitleListResponse {
        results: titles.into_iter().map(TitleResponse::from).collect(),
        page,
        page_size,
    }))
}

/// Create a title
///
/// POST /api/v1/titles
#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = TitleRequest,
    responses(
        (status = 201, description = "Title created", body = TitleResponse),
        (status = 400, description = "Invalid year, category, or genre", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse)
    ),
    tag = "titles"
)]
pub async fn create_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Json(payload): Json<TitleRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&auth.principal(), Action::Create, ResourceKind::Title, None)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name", "name must not be blank"));
    }

    let title = state
        .catalog
        .create_title(NewTitle {
            name: payload.name.trim().to_string(),
            year: payload.year,
            description: payload.description,
            category: payload.category,
            genres: payload.genres,
        })
        .await?;

    info!("Title created: {} ({})", title.id, title.name);
    Ok((StatusCode::CREATED, Json(TitleResponse::from(title))))
}

/// Retrieve a single title
///
/// GET /api/v1/titles/{id}
#[utoipa::path(
    get,
    path = "/api/v1/titles/{id}",
    params(("id" = i64, Path, description = "Title id")),
    responses(
        (status = 200, description = "Title retrieved", body = TitleResponse),
        (status = 404, description = "No such title", body = ApiErrorResponse)
    ),
    tag = "titles"
)]
pub async fn get_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Retrieve,
        ResourceKind::Title,
        Some(&title_ref()),
    )?;

    let title = state
        .catalog
        .get_title(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Title {}", id)))?;

    Ok(Json(TitleResponse::from(title)))
}

/// Update a title
///
/// PATCH /api/v1/titles/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{id}",
    params(("id" = i64, Path, description = "Title id")),
    request_body = TitlePatchRequest,
    responses(
        (status = 200, description = "Title updated", body = TitleResponse),
        (status = 400, description = "Invalid year, category, or genre", body = ApiErrorResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "No such title", body = ApiErrorResponse)
    ),
    tag = "titles"
)]
pub async fn update_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<i64>,
    Json(payload): Json<TitlePatchRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Update,
        ResourceKind::Title,
        Some(&title_ref()),
    )?;

    let patch = TitlePatch {
        name: payload.name,
        year: payload.year,
        description: payload.description,
        category: payload.category,
        genres: payload.genres,
    };
    let title = state
        .catalog
        .update_title(id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Title {}", id)))?;

    info!("Title updated: {}", id);
    Ok(Json(TitleResponse::from(title)))
}

/// Delete a title
///
/// DELETE /api/v1/titles/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{id}",
    params(("id" = i64, Path, description = "Title id")),
    responses(
        (status = 200, description = "Title deleted", body = DeleteResponse),
        (status = 403, description = "Admin role required", body = ApiErrorResponse),
        (status = 404, description = "No such title", body = ApiErrorResponse)
    ),
    tag = "titles"
)]
pub async fn delete_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    authorize(
        &auth.principal(),
        Action::Delete,
        ResourceKind::Title,
        Some(&title_ref()),
    )?;

    if !state.catalog.delete_title(id).await? {
        return Err(ApiError::NotFound(format!("Title {}", id)));
    }
    info!("Title deleted: {}", id);
    Ok(Json(DeleteResponse { deleted: true }))
}
