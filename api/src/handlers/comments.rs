use authz::{authorize, Action, ResourceKind, ResourceRef};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use catalog::Comment;
use tracing::info;
use user::AuthState;

use crate::{
    error::{ApiError, ApiResult},
    handlers::require_account,
    models::{
        page_window, CommentListResponse, CommentRequest, CommentResponse, DeleteResponse,
        ListParams,
    },
    AppState,
};

fn comment_ref(comment: &Comment) -> ResourceRef {
    ResourceRef::owned_by(ResourceKind::Comment, &comment.author_id)
}

/// Comments hang off a review which hangs off a title; both parents
/// must exist.
async fn require_review(state: &AppState, title_id: i64, review_id: i64) -> ApiResult<()> {
    if !state.catalog.title_exists(title_id).await? {
        return Err(ApiError::NotFound(format!("Title {}", title_id)));
    }
    if state.catalog.get_review(title_id, review_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Review {}", review_id)));
    }
    Ok(())
}

/// List comments on a review
///
/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("page" = Option<usize>, Query, description = "Page number (default: 1)"),
        ("page_size" = Option<usize>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Comments listed", body = CommentListResponse),
        (status = 404, description = "No such title or review", body = ApiErrorResponse)
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    require_review(&state, title_id, review_id).await?;
    authorize(&auth.principal(), Action::List, ResourceKind::Comment, None)?;

    let (page, page_size, limit, offset) = page_window(params.page, params.page_size);
    let comments = state.catalog.list_comments(review_id, limit, offset).await?;

    Ok(Json(CommentListResponse {
        results: comments.into_iter().map(CommentResponse::from).collect(),
        page,
        page_size,
    }))
}

/// Comment on a review
///
/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 404, description = "No such title or review", body = ApiErrorResponse)
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    require_review(&state, title_id, review_id).await?;
    authorize(&auth.principal(), Action::Create, ResourceKind::Comment, None)?;
    let account = require_account(&auth)?;

    let comment = state
        .catalog
        .create_comment(review_id, &account.id, &account.username, &payload.text)
        .await?;

    info!("Comment {} posted by {} on review {}", comment.id, account.username, review_id);
    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Retrieve a single comment
///
/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment retrieved", body = CommentResponse),
        (status = 404, description = "No such title, review, or comment", body = ApiErrorResponse)
    ),
    tag = "comments"
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    require_review(&state, title_id, review_id).await?;
    let comment = state
        .catalog
        .get_comment(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment {}", comment_id)))?;

    authorize(
        &auth.principal(),
        Action::Retrieve,
        ResourceKind::Comment,
        Some(&comment_ref(&comment)),
    )?;

    Ok(Json(CommentResponse::from(comment)))
}

/// Update a comment
///
/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Not the author nor elevated", body = ApiErrorResponse),
        (status = 404, description = "No such title, review, or comment", body = ApiErrorResponse)
    ),
    tag = "comments"
)]
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    require_review(&state, title_id, review_id).await?;
    let comment = state
        .catalog
        .get_comment(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment {}", comment_id)))?;

    authorize(
        &auth.principal(),
        Action::Update,
        ResourceKind::Comment,
        Some(&comment_ref(&comment)),
    )?;

    let updated = state
        .catalog
        .update_comment(review_id, comment_id, &payload.text)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment {}", comment_id)))?;

    info!("Comment {} updated", comment_id);
    Ok(Json(CommentResponse::from(updated)))
}

/// Delete a comment
///
/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title id"),
        ("review_id" = i64, Path, description = "Review id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = DeleteResponse),
        (status = 401, description = "Not authenticated", body = ApiErrorResponse),
        (status = 403, description = "Not the author nor elevated", body = ApiErrorResponse),
        (status = 404, description = "No such title, review, or comment", body = ApiErrorResponse)
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> ApiResult<impl IntoResponse> {
    require_review(&state, title_id, review_id).await?;
    let comment = state
        .catalog
        .get_comment(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Comment {}", comment_id)))?;

    authorize(
        &auth.principal(),
        Action::Delete,
        ResourceKind::Comment,
        Some(&comment_ref(&comment)),
    )?;

    state.catalog.delete_comment(review_id, comment_id).await?;
    info!("Comment {} deleted", comment_id);
    Ok(Json(DeleteResponse { deleted: true }))
}
