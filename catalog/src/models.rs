//! Catalogue entities: categories, genres, titles, reviews, comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Earliest accepted publication year. The first precisely dated
/// printed book, the Diamond Sutra, appeared in 868.
pub const MIN_TITLE_YEAR: i64 = 868;

/// Review scores are a closed 1..=10 scale.
pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Genre {
    pub name: String,
    pub slug: String,
}

/// A catalogued work with its category, genres, and aggregate rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i64,
    pub description: String,
    /// Average review score, None when the title has no reviews.
    pub rating: Option<f64>,
    pub category: Category,
    pub genres: Vec<Genre>,
}

/// Payload for creating a title. Genre/category are referenced by slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTitle {
    pub name: String,
    pub year: Option<i64>,
    pub description: Option<String>,
    pub category: String,
    pub genres: Vec<String>,
}

/// Partial update for a title; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub year: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Filter for title listings. All clauses are ANDed.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Category slug, exact.
    pub category: Option<String>,
    /// Genre slug, exact (matches titles carrying the genre).
    pub genre: Option<String>,
    /// Name substring.
    pub name: Option<String>,
    /// Publication year, exact.
    pub year: Option<i64>,
}

/// A scored review. At most one per (author, title).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub title_id: i64,
    /// Account id of the author; used by ownership rules.
    pub author_id: String,
    /// Author username at creation time, for display.
    pub author_username: String,
    pub text: String,
    pub score: i64,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    pub author_id: String,
    pub author_username: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}
