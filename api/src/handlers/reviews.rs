use authz::{authorize, Action, ResourceKind, ResourceRef};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use catalog::Review;
use tracing::info;
use user::AuthState;

use crate::{
    error::{ApiError, ApiResult},
    handlers::require_account,
    models::{
        page_window, DeleteResponse, ListParams, ReviewListResponse, ReviewPatchRequest,
        ReviewRequest, ReviewResponse,
    },
    AppState,
};

fn review_ref(review: &Review) -> ResourceRef {
    ResourceRef::owned_by(ResourceKind::Review, &review.author_id)
}

/// The parent title must exist before any review operation proceeds.
async fn require_title(state: &AppState, title_id: i64) -> ApiResult<()> {
    if !state.catalog.title_exists(title_id).await? {
        return Err(ApiError::NotFound(format!("Title {}", title_id)));
    }
    Ok(())
}

/// List reviews for a title
///
/// GET /api/v1/titles/{title_id}/reviews
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Reviews listed", body = ReviewListResponse),
        (status = 404, description = "No such title", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(title_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    require_title(&state, title_id).await?;
    authorize(&auth.principal(), Action::List, ResourceKind::Review, None)?;

    let (page, page_size, limit, offset) = page_window(params.page, params.page_size);
    let reviews = state.catalog.list_reviews(title_id, limit, offset).await?;

    Ok(Json(ReviewListResponse {
        results: reviews.into_iter().map(ReviewResponse::from).collect(),
        page,
        page_size,
    }))
}

/// Post a review for a title
///
/// POST /api/v1/titles/{title_id}/reviews
///
/// At most one review per author per title; a second attempt conflicts.
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = i64, Path, description = "Title id")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Score outside 1..=10", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 404, description = "No such title", body = ApiErrorResponse),
        (status = 409, description = "Author already reviewed this title", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path(title_id): Path<i64>,
    Json(payload): Json<ReviewRequest>,
) -> ApiResult<impl IntoResponse> {
    require_title(&state, title_id).await?;
    authorize(&auth.principal(), Action::Create, ResourceKind::Review, None)?;
    let account = require_account(&auth)?;

    let review = state
        .catalog
        .create_review(
            title_id,
            &account.id,
            &account.username,
            &payload.text,
            payload.score,
        )
        .await?;

    info!("Review {} posted by {} on title {}", review.id, account.username, title_id);
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

/// Retrieve a single review
///
/// GET /api/v1/titles/{title_id}/reviews/{review_id}
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review retrieved", body = ReviewResponse),
        (status = 404, description = "No such title or review", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    require_title(&state, title_id).await?;
    let review = state
        .catalog
        .get_review(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", review_id)))?;

    authorize(
        &auth.principal(),
        Action::Retrieve,
        ResourceKind::Review,
        Some(&review_ref(&review)),
    )?;

    Ok(Json(ReviewResponse::from(review)))
}

/// Update a review
///
/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Allowed for the author, moderators, and admins.
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    request_body = ReviewPatchRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Score outside 1..=10", body = ApiErrorResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Not the author nor elevated", body = ApiErrorResponse),
        (status = 404, description = "No such title or review", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(payload): Json<ReviewPatchRequest>,
) -> ApiResult<impl IntoResponse> {
    require_title(&state, title_id).await?;
    let review = state
        .catalog
        .get_review(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", review_id)))?;

    authorize(
        &auth.principal(),
        Action::Update,
        ResourceKind::Review,
        Some(&review_ref(&review)),
    )?;

    let updated = state
        .catalog
        .update_review(
            title_id,
            review_id,
            payload.text.as_deref(),
            payload.score,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", review_id)))?;

    info!("Review {} updated", review_id);
    Ok(Json(ReviewResponse::from(updated)))
}

/// Delete a review
///
/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    responses(
        (status = 200, description = "Review deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Not the author nor elevated", body = ApiErrorResponse),
        (status = 404, description = "No such title or review", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    require_title(&state, title_id).await?;
    let review = state
        .catalog
        .get_review(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Review {}", review_id)))?;

    authorize(
        &auth.principal(),
        Action::Delete,
        ResourceKind::Review,
        Some(&review_ref(&review)),
    )?;

    state.catalog.delete_review(title_id, review_id).await?;
    info!("Review {} deleted", review_id);
    Ok(Json(DeleteResponse { deleted: true }))
}
