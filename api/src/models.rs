//! Request and response DTOs for the HTTP surface.

use catalog::{Category, Comment, Genre, Review, Title};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use user::Account;
use utoipa::ToSchema;

// ---------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthEmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthEmailResponse {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthTokenRequest {
    pub email: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// ---------------------------------------------------------------------
// Categories and genres
// ---------------------------------------------------------------------

/// Create payload for a category or genre. When `slug` is absent it is
/// derived from the name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TermRequest {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TermResponse {
    pub name: String,
    pub slug: String,
}

impl From<Category> for TermResponse {
    fn from(c: Category) -> Self {
        Self {
            name: c.name,
            slug: c.slug,
        }
    }
}

impl From<Genre> for TermResponse {
    fn from(g: Genre) -> Self {
        Self {
            name: g.name,
            slug: g.slug,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TermListResponse {
    pub results: Vec<TermResponse>,
    pub page: usize,
    pub page_size: usize,
}

// ---------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct TitleRequest {
    pub name: String,
    pub year: Option<i64>,
    pub description: Option<String>,
    /// Category slug.
    pub category: String,
    /// Genre slugs.
    #[serde(default, rename = "genre")]
    pub genres: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TitlePatchRequest {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "genre")]
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TitleResponse {
    pub id: i64,
    pub name: String,
    pub year: i64,
    /// Average review score; null until the first review lands.
    pub rating: Option<f64>,
    pub description: String,
    #[serde(rename = "genre")]
    pub genres: Vec<TermResponse>,
    pub category: TermResponse,
}

impl From<Title> for TitleResponse {
    fn from(t: Title) -> Self {
        Self {
            id: t.id,
            name: t.name,
            year: t.year,
            rating: t.rating,
            description: t.description,
            genres: t.genres.into_iter().map(TermResponse::from).collect(),
            category: t.category.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TitleListResponse {
    pub results: Vec<TitleResponse>,
    pub page: usize,
    pub page_size: usize,
}

/// Query parameters for title listings.
#[derive(Debug, Default, Deserialize)]
pub struct TitleListParams {
    pub category: Option<String>,
    pub genre: Option<String>,
    pub name: Option<String>,
    pub year: Option<i64>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

// ---------------------------------------------------------------------
// Reviews and comments
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub text: String,
    pub score: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewPatchRequest {
    pub text: Option<String>,
    pub score: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    /// Author username.
    pub author: String,
    pub text: String,
    pub score: i64,
    pub pub_date: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            author: r.author_username,
            text: r.text,
            score: r.score,
            pub_date: r.pub_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub results: Vec<ReviewResponse>,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            author: c.author_username,
            text: c.text,
            pub_date: c.pub_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentListResponse {
    pub results: Vec<CommentResponse>,
    pub page: usize,
    pub page_size: usize,
}

// ---------------------------------------------------------------------
// User accounts
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCreateRequest {
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// Partial account update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserPatchRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
}

impl From<Account> for UserResponse {
    fn from(a: Account) -> Self {
        Self {
            username: a.username,
            email: a.email,
            first_name: a.first_name,
            last_name: a.last_name,
            bio: a.bio,
            role: a.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub results: Vec<UserResponse>,
    pub page: usize,
    pub page_size: usize,
}

// ---------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------

/// Pagination query parameters, with an optional search term for the
/// endpoints that support one.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Resolve `page`/`page_size` into (page, page_size, limit, offset).
///
/// The arithmetic saturates and the offset is capped before the cast, so
/// an absurd but well-formed `page` in the query string cannot overflow
/// or produce a negative SQL bind.
pub fn page_window(page: Option<usize>, page_size: Option<usize>) -> (usize, usize, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(20).clamp(1, 100);
    let offset = page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(i64::MAX as usize);
    (page, page_size, page_size as i64, offset as i64)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults() {
        assert_eq!(page_window(None, None), (1, 20, 20, 0));
    }

    #[test]
    fn page_window_clamps_inputs() {
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 1, 0));
        assert_eq!(page_window(Some(3), Some(500)), (3, 100, 100, 200));
    }

    #[test]
    fn page_window_survives_hostile_page_values() {
        let (_, _, limit, offset) = page_window(Some(usize::MAX), Some(100));
        assert_eq!(limit, 100);
        assert_eq!(offset, i64::MAX);

        let (_, _, _, offset) = page_window(Some(usize::MAX), Some(1));
        assert!(offset >= 0);
    }
}
