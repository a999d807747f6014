//! Catalogue domain: categories, genres, titles, reviews, and comments.
//!
//! The store is a thin SQLite layer; validation that belongs to the
//! domain (year bounds, score scale, slug uniqueness, one review per
//! author per title) lives here so every caller gets the same answers.

pub mod error;
pub mod models;
pub mod slug;
pub mod store;

pub use error::{CatalogError, Result as CatalogResult};
pub use models::{
    Category, Comment, Genre, NewTitle, Review, Title, TitleFilter, TitlePatch, MAX_SCORE,
    MIN_SCORE, MIN_TITLE_YEAR,
};
pub use slug::{is_valid_slug, slugify, MAX_SLUG_LEN};
pub use store::CatalogStore;
