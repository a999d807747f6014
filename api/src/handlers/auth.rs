use axum::{extract::State, response::IntoResponse, Json};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{AuthEmailRequest, AuthEmailResponse, AuthTokenRequest, TokenResponse},
    AppState,
};

/// Request a confirmation code by email
///
/// POST /api/v1/auth/email
///
/// Always answers 200 for a well-formed email, whether or not an
/// account already existed; the code travels out of band.
#[utoipa::path(
    post,
    path = "/api/v1/auth/email",
    request_body = AuthEmailRequest,
    responses(
        (status = 200, description = "Confirmation code dispatched", body = AuthEmailResponse),
        (status = 400, description = "Missing or malformed email", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn request_code(
    State(state): State<AppState>,
    Json(payload): Json<AuthEmailRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("email", "email must not be blank"));
    }
    if !email.contains('@') {
        return Err(ApiError::validation("email", "enter a valid email address"));
    }

    info!("Confirmation code requested for {}", email);
    state.code_auth.request_code(email).await?;

    Ok(Json(AuthEmailResponse {
        email: email.to_string(),
    }))
}

/// Exchange a confirmation code for an access token
///
/// POST /api/v1/auth/token
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = AuthTokenRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Email and code do not match", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<AuthTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("email", "email must not be blank"));
    }
    if payload.confirmation_code.trim().is_empty() {
        return Err(ApiError::validation(
            "confirmation_code",
            "confirmation_code must not be blank",
        ));
    }

    let token = state
        .code_auth
        .redeem_code(payload.email.trim(), payload.confirmation_code.trim())
        .await?;

    Ok(Json(TokenResponse { token }))
}
