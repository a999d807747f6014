//! HTTP surface: router, handlers, DTOs, and error mapping.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use catalog::CatalogStore;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use user::{AccountStore, CodeAuth, TokenKeys};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
pub mod middleware_hooks;
pub mod models;
pub mod server;

// Re-export server functions for convenience
pub use server::{
    spawn_server, spawn_server_with_config, start_server, start_server_with_config, ApiConfig,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub catalog: CatalogStore,
    pub code_auth: CodeAuth,
    pub tokens: TokenKeys,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::request_code,
        handlers::auth::obtain_token,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::delete_category,
        handlers::genres::list_genres,
        handlers::genres::create_genre,
        handlers::genres::delete_genre,
        handlers::titles::list_titles,
        handlers::titles::create_title,
        handlers::titles::get_title,
        handlers::titles::update_title,
        handlers::titles::delete_title,
        handlers::reviews::list_reviews,
        handlers::reviews::create_review,
        handlers::reviews::get_review,
        handlers::reviews::update_review,
        handlers::reviews::delete_review,
        handlers::comments::list_comments,
        handlers::comments::create_comment,
        handlers::comments::get_comment,
        handlers::comments::update_comment,
        handlers::comments::delete_comment,
        handlers::accounts::list_users,
        handlers::accounts::create_user,
        handlers::accounts::get_user,
        handlers::accounts::update_user,
        handlers::accounts::delete_user,
        handlers::accounts::me,
        handlers::accounts::update_me,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::AuthEmailRequest,
            models::AuthEmailResponse,
            models::AuthTokenRequest,
            models::TokenResponse,
            models::TermRequest,
            models::TermResponse,
            models::TermListResponse,
            models::TitleRequest,
            models::TitlePatchRequest,
            models::TitleResponse,
            models::TitleListResponse,
            models::ReviewRequest,
            models::ReviewPatchRequest,
            models::ReviewResponse,
            models::ReviewListResponse,
            models::CommentRequest,
            models::CommentResponse,
            models::CommentListResponse,
            models::UserCreateRequest,
            models::UserPatchRequest,
            models::UserResponse,
            models::UserListResponse,
            models::DeleteResponse,
            models::HealthResponse,
            models::DatabaseHealth,
            error::ApiErrorResponse,
            error::ErrorDetail,
        )
    ),
    tags(
        (name = "auth", description = "Email confirmation codes and access tokens"),
        (name = "categories", description = "Category management"),
        (name = "genres", description = "Genre management"),
        (name = "titles", description = "Catalogue titles"),
        (name = "reviews", description = "Reviews on titles"),
        (name = "comments", description = "Comments on reviews"),
        (name = "users", description = "Account administration and self-service"),
        (name = "health", description = "Health check endpoints"),
    ),
    info(
        title = "Marquee API",
        version = "1.0.0",
        description = "Content catalogue and review service",
    ),
)]
pub struct ApiDoc;

/// Create the main API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new()
        // Authentication
        .route("/auth/email", post(handlers::auth::request_code))
        .route("/auth/token", post(handlers::auth::obtain_token))
        // Categories and genres; single-item GET answers 405 by policy
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/:slug",
            get(handlers::categories::retrieve_category)
                .delete(handlers::categories::delete_category),
        )
        .route(
            "/genres",
            get(handlers::genres::list_genres).post(handlers::genres::create_genre),
        )
        .route(
            "/genres/:slug",
            get(handlers::genres::retrieve_genre).delete(handlers::genres::delete_genre),
        )
        // Titles
        .route(
            "/titles",
            get(handlers::titles::list_titles).post(handlers::titles::create_title),
        )
        .route(
            "/titles/:id",
            get(handlers::titles::get_title)
                .patch(handlers::titles::update_title)
                .delete(handlers::titles::delete_title),
        )
        // Reviews, nested under their title
        .route(
            "/titles/:title_id/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route(
            "/titles/:title_id/reviews/:review_id",
            get(handlers::reviews::get_review)
                .patch(handlers::reviews::update_review)
                .delete(handlers::reviews::delete_review),
        )
        // Comments, nested under their review
        .route(
            "/titles/:title_id/reviews/:review_id/comments",
            get(handlers::comments::list_comments).post(handlers::comments::create_comment),
        )
        .route(
            "/titles/:title_id/reviews/:review_id/comments/:comment_id",
            get(handlers::comments::get_comment)
                .patch(handlers::comments::update_comment)
                .delete(handlers::comments::delete_comment),
        )
        // Account administration and self-service
        .route(
            "/users",
            get(handlers::accounts::list_users).post(handlers::accounts::create_user),
        )
        .route(
            "/users/me",
            get(handlers::accounts::me).patch(handlers::accounts::update_me),
        )
        .route(
            "/users/:username",
            get(handlers::accounts::get_user)
                .patch(handlers::accounts::update_user)
                .delete(handlers::accounts::delete_user),
        )
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Resolve the caller's identity before any handler runs
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middleware_hooks::authentication_middleware,
        ));

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(SwaggerUi::new("/api/v1/swagger").url("/api/v1/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
