use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use user::AuthState;

use crate::AppState;

/// Authentication middleware.
///
/// Reads `Authorization: Bearer <jwt>`, verifies the signature and
/// expiry, loads the account, and injects an [`AuthState`] extension.
/// An absent or invalid token does not abort the request here: read
/// access is open to anonymous callers, so the denial decision belongs
/// to the per-handler authorization check.
pub async fn authentication_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_state = resolve_auth_state(&state, request.headers()).await;
    match &auth_state {
        AuthState::Authenticated(account) => {
            debug!("Authenticated request from {}", account.username);
        }
        AuthState::Unauthenticated => {
            debug!("Anonymous request to {}", request.uri().path());
        }
    }
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}

async fn resolve_auth_state(state: &AppState, headers: &HeaderMap) -> AuthState {
    let Some(token) = bearer_token(headers) else {
        return AuthState::Unauthenticated;
    };

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Rejected bearer token: {}", e);
            return AuthState::Unauthenticated;
        }
    };

    match state.accounts.find_by_id(&claims.sub).await {
        Ok(Some(account)) => AuthState::Authenticated(account),
        Ok(None) => {
            warn!("Valid token for missing account {}", claims.sub);
            AuthState::Unauthenticated
        }
        Err(e) => {
            warn!("Account lookup failed during authentication: {}", e);
            AuthState::Unauthenticated
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
