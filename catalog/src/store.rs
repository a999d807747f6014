//! SQLite-backed catalogue storage.
//!
//! One store owns all five catalogue tables. Referential cleanup is done
//! explicitly (reviews and comments go with their title) rather than
//! relying on SQLite foreign-key enforcement being switched on.

use chrono::{Datelike, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::models::{
    Category, Comment, Genre, NewTitle, Review, Title, TitleFilter, TitlePatch, MAX_SCORE,
    MIN_SCORE, MIN_TITLE_YEAR,
};
use crate::slug::{is_valid_slug, slugify, MAX_SLUG_LEN};

#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the catalogue tables if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running catalogue store migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                slug TEXT PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS genres (
                slug TEXT PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS titles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                year INTEGER NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category_slug TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS title_genres (
                title_id INTEGER NOT NULL,
                genre_slug TEXT NOT NULL,
                PRIMARY KEY (title_id, genre_slug)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title_id INTEGER NOT NULL,
                author_id TEXT NOT NULL,
                author_username TEXT NOT NULL,
                text TEXT NOT NULL,
                score INTEGER NOT NULL,
                pub_date TIMESTAMP NOT NULL,
                UNIQUE (title_id, author_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                review_id INTEGER NOT NULL,
                author_id TEXT NOT NULL,
                author_username TEXT NOT NULL,
                text TEXT NOT NULL,
                pub_date TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Categories and genres
    // ------------------------------------------------------------------

    pub async fn list_categories(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Category>> {
        self.list_terms("categories", search, limit, offset).await
    }

    pub async fn create_category(&self, name: &str, slug: Option<&str>) -> Result<Category> {
        self.create_term("categories", name, slug).await
    }

    pub async fn delete_category(&self, slug: &str) -> Result<bool> {
        self.delete_term("categories", slug).await
    }

    pub async fn list_genres(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Genre>> {
        let rows = self.list_terms("genres", search, limit, offset).await?;
        Ok(rows
            .into_iter()
            .map(|c| Genre {
                name: c.name,
                slug: c.slug,
            })
            .collect())
    }

    pub async fn create_genre(&self, name: &str, slug: Option<&str>) -> Result<Genre> {
        let c = self.create_term("genres", name, slug).await?;
        Ok(Genre {
            name: c.name,
            slug: c.slug,
        })
    }

    pub async fn delete_genre(&self, slug: &str) -> Result<bool> {
        self.delete_term("genres", slug).await
    }

    /// Categories and genres share the same (name, slug) shape; the
    /// table name is fixed by the caller, never caller input.
    async fn list_terms(
        &self,
        table: &str,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Category>> {
        let sql = match search {
            Some(_) => format!(
                "SELECT name, slug FROM {} WHERE name LIKE '%' || ? || '%' ORDER BY name LIMIT ? OFFSET ?",
                table
            ),
            None => format!(
                "SELECT name, slug FROM {} ORDER BY name LIMIT ? OFFSET ?",
                table
            ),
        };
        let mut query = sqlx::query_as::<_, Category>(&sql);
        if let Some(needle) = search {
            query = query.bind(needle.to_string());
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create_term(&self, table: &str, name: &str, slug: Option<&str>) -> Result<Category> {
        let slug = match slug {
            Some(s) => {
                if !is_valid_slug(s) {
                    return Err(CatalogError::validation(
                        "slug",
                        format!(
                            "slug must be 1..={} letters, digits, dashes or underscores",
                            MAX_SLUG_LEN
                        ),
                    ));
                }
                s.to_string()
            }
            None => slugify(name),
        };
        if slug.is_empty() {
            return Err(CatalogError::validation("slug", "slug must not be empty"));
        }

        let exists_sql = format!("SELECT slug FROM {} WHERE slug = ?", table);
        let taken = sqlx::query(&exists_sql)
            .bind(&slug)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if taken {
            return Err(CatalogError::SlugTaken(slug));
        }

        let insert_sql = format!("INSERT INTO {} (name, slug) VALUES (?, ?)", table);
        sqlx::query(&insert_sql)
            .bind(name)
            .bind(&slug)
            .execute(&self.pool)
            .await?;

        info!("Created {} entry: {}", table, slug);
        Ok(Category {
            name: name.to_string(),
            slug,
        })
    }

    async fn delete_term(&self, table: &str, slug: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE slug = ?", table);
        let result = sqlx::query(&sql).bind(slug).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Titles
    // ------------------------------------------------------------------

    pub async fn create_title(&self, new: NewTitle) -> Result<Title> {
        let year = new.year.unwrap_or_else(|| Utc::now().year() as i64);
        validate_year(year)?;

        let category = self.require_category(&new.category).await?;
        let genres = self.require_genres(&new.genres).await?;
        let description = new.description.unwrap_or_default();

        let result = sqlx::query(
            "INSERT INTO titles (name, year, description, category_slug) VALUES (?, ?, ?, ?)",
        )
        .bind(&new.name)
        .bind(year)
        .bind(&description)
        .bind(&category.slug)
        .execute(&self.pool)
        .await?;
        let id = result.last_insert_rowid();

        self.replace_title_genres(id, &new.genres).await?;

        info!("Created title {} ({})", id, new.name);
        Ok(Title {
            id,
            name: new.name,
            year,
            description,
            rating: None,
            category,
            genres,
        })
    }

    pub async fn get_title(&self, id: i64) -> Result<Option<Title>> {
        let row = sqlx::query(
            r#"
            SELECT t.id, t.name, t.year, t.description,
                   c.name AS category_name, c.slug AS category_slug,
                   (SELECT AVG(score) FROM reviews r WHERE r.title_id = t.id) AS rating
            FROM titles t
            JOIN categories c ON c.slug = t.category_slug
            WHERE t.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let title = self.title_from_row(&row).await?;
        Ok(Some(title))
    }

    pub async fn list_titles(
        &self,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Title>> {
        let mut sql = String::from(
            r#"
            SELECT t.id, t.name, t.year, t.description,
                   c.name AS category_name, c.slug AS category_slug,
                   (SELECT AVG(score) FROM reviews r WHERE r.title_id = t.id) AS rating
            FROM titles t
            JOIN categories c ON c.slug = t.category_slug
            WHERE 1 = 1
            "#,
        );
        if filter.category.is_some() {
            sql.push_str(" AND t.category_slug = ?");
        }
        if filter.genre.is_some() {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM title_genres tg WHERE tg.title_id = t.id AND tg.genre_slug = ?)",
            );
        }
        if filter.name.is_some() {
            sql.push_str(" AND t.name LIKE '%' || ? || '%'");
        }
        if filter.year.is_some() {
            sql.push_str(" AND t.year = ?");
        }
        sql.push_str(" ORDER BY t.name LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category.clone());
        }
        if let Some(genre) = &filter.genre {
            query = query.bind(genre.clone());
        }
        if let Some(name) = &filter.name {
            query = query.bind(name.clone());
        }
        if let Some(year) = filter.year {
            query = query.bind(year);
        }
        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        let mut titles = Vec::with_capacity(rows.len());
        for row in &rows {
            titles.push(self.title_from_row(row).await?);
        }
        Ok(titles)
    }

    pub async fn update_title(&self, id: i64, patch: TitlePatch) -> Result<Option<Title>> {
        let Some(current) = self.get_title(id).await? else {
            return Ok(None);
        };

        let name = patch.name.unwrap_or(current.name);
        let year = patch.year.unwrap_or(current.year);
        validate_year(year)?;
        let description = patch.description.unwrap_or(current.description);
        let category = match patch.category {
            Some(slug) => self.require_category(&slug).await?,
            None => current.category,
        };

        sqlx::query(
            "UPDATE titles SET name = ?, year = ?, description = ?, category_slug = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(year)
        .bind(&description)
        .bind(&category.slug)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if let Some(genre_slugs) = patch.genres {
            self.require_genres(&genre_slugs).await?;
            self.replace_title_genres(id, &genre_slugs).await?;
        }

        self.get_title(id).await
    }

    /// Delete a title with its reviews and their comments.
    pub async fn delete_title(&self, id: i64) -> Result<bool> {
        sqlx::query(
            "DELETE FROM comments WHERE review_id IN (SELECT id FROM reviews WHERE title_id = ?)",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        sqlx::query("DELETE FROM reviews WHERE title_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM title_genres WHERE title_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM titles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn title_from_row(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Title> {
        let id: i64 = row.try_get("id")?;
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.name, g.slug
            FROM genres g
            JOIN title_genres tg ON tg.genre_slug = g.slug
            WHERE tg.title_id = ?
            ORDER BY g.slug
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Title {
            id,
            name: row.try_get("name")?,
            year: row.try_get("year")?,
            description: row.try_get("description")?,
            rating: row.try_get("rating")?,
            category: Category {
                name: row.try_get("category_name")?,
                slug: row.try_get("category_slug")?,
            },
            genres,
        })
    }

    async fn require_category(&self, slug: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>("SELECT name, slug FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                CatalogError::validation("category", format!("unknown category: {}", slug))
            })
    }

    async fn require_genres(&self, slugs: &[String]) -> Result<Vec<Genre>> {
        let mut genres = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let genre = sqlx::query_as::<_, Genre>("SELECT name, slug FROM genres WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    CatalogError::validation("genre", format!("unknown genre: {}", slug))
                })?;
            genres.push(genre);
        }
        Ok(genres)
    }

    async fn replace_title_genres(&self, title_id: i64, slugs: &[String]) -> Result<()> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = ?")
            .bind(title_id)
            .execute(&self.pool)
            .await?;
        for slug in slugs {
            sqlx::query("INSERT OR IGNORE INTO title_genres (title_id, genre_slug) VALUES (?, ?)")
                .bind(title_id)
                .bind(slug)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    pub async fn title_exists(&self, id: i64) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM titles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn review_exists(&self, title_id: i64, author_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM reviews WHERE title_id = ? AND author_id = ?")
            .bind(title_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    pub async fn list_reviews(&self, title_id: i64, limit: i64, offset: i64) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE title_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(title_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn get_review(&self, title_id: i64, review_id: i64) -> Result<Option<Review>> {
        let review =
            sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE title_id = ? AND id = ?")
                .bind(title_id)
                .bind(review_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(review)
    }

    /// Create a review. The duplicate check runs here, before the
    /// insert, so callers get a domain conflict instead of a raw
    /// constraint violation.
    pub async fn create_review(
        &self,
        title_id: i64,
        author_id: &str,
        author_username: &str,
        text: &str,
        score: i64,
    ) -> Result<Review> {
        validate_score(score)?;
        if self.review_exists(title_id, author_id).await? {
            return Err(CatalogError::DuplicateReview);
        }

        let pub_date = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO reviews (title_id, author_id, author_username, text, score, pub_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(title_id)
        .bind(author_id)
        .bind(author_username)
        .bind(text)
        .bind(score)
        .bind(pub_date)
        .execute(&self.pool)
        .await?;

        Ok(Review {
            id: result.last_insert_rowid(),
            title_id,
            author_id: author_id.to_string(),
            author_username: author_username.to_string(),
            text: text.to_string(),
            score,
            pub_date,
        })
    }

    pub async fn update_review(
        &self,
        title_id: i64,
        review_id: i64,
        text: Option<&str>,
        score: Option<i64>,
    ) -> Result<Option<Review>> {
        let Some(current) = self.get_review(title_id, review_id).await? else {
            return Ok(None);
        };
        let text = text.unwrap_or(&current.text);
        let score = score.unwrap_or(current.score);
        validate_score(score)?;

        sqlx::query("UPDATE reviews SET text = ?, score = ? WHERE id = ?")
            .bind(text)
            .bind(score)
            .bind(review_id)
            .execute(&self.pool)
            .await?;

        self.get_review(title_id, review_id).await
    }

    pub async fn delete_review(&self, title_id: i64, review_id: i64) -> Result<bool> {
        sqlx::query("DELETE FROM comments WHERE review_id = ?")
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM reviews WHERE title_id = ? AND id = ?")
            .bind(title_id)
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn list_comments(
        &self,
        review_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE review_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(review_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(comments)
    }

    pub async fn get_comment(&self, review_id: i64, comment_id: i64) -> Result<Option<Comment>> {
        let comment =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE review_id = ? AND id = ?")
                .bind(review_id)
                .bind(comment_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(comment)
    }

    pub async fn create_comment(
        &self,
        review_id: i64,
        author_id: &str,
        author_username: &str,
        text: &str,
    ) -> Result<Comment> {
        let pub_date = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO comments (review_id, author_id, author_username, text, pub_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(review_id)
        .bind(author_id)
        .bind(author_username)
        .bind(text)
        .bind(pub_date)
        .execute(&self.pool)
        .await?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            review_id,
            author_id: author_id.to_string(),
            author_username: author_username.to_string(),
            text: text.to_string(),
            pub_date,
        })
    }

    pub async fn update_comment(
        &self,
        review_id: i64,
        comment_id: i64,
        text: &str,
    ) -> Result<Option<Comment>> {
        if self.get_comment(review_id, comment_id).await?.is_none() {
            return Ok(None);
        }
        sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        self.get_comment(review_id, comment_id).await
    }

    pub async fn delete_comment(&self, review_id: i64, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE review_id = ? AND id = ?")
            .bind(review_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn validate_year(year: i64) -> Result<()> {
    let max = Utc::now().year() as i64;
    if year < MIN_TITLE_YEAR || year > max {
        return Err(CatalogError::validation(
            "year",
            format!("year must be between {} and {}", MIN_TITLE_YEAR, max),
        ));
    }
    Ok(())
}

fn validate_score(score: i64) -> Result<()> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(CatalogError::validation(
            "score",
            format!("score must be between {} and {}", MIN_SCORE, MAX_SCORE),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> CatalogStore {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = CatalogStore::new(pool);
        store.migrate().await.unwrap();
        store
    }

    async fn seeded_title(store: &CatalogStore) -> Title {
        store.create_category("Film", None).await.unwrap();
        store.create_genre("Drama", None).await.unwrap();
        store
            .create_title(NewTitle {
                name: "Stalker".to_string(),
                year: Some(1979),
                description: None,
                category: "film".to_string(),
                genres: vec!["drama".to_string()],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn category_slug_is_derived_from_name() {
        let store = store().await;
        let category = store.create_category("Film", None).await.unwrap();
        assert_eq!(category.slug, "film");
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let store = store().await;
        store.create_category("Film", None).await.unwrap();
        let err = store.create_category("Films", Some("film")).await.unwrap_err();
        assert!(matches!(err, CatalogError::SlugTaken(s) if s == "film"));
    }

    #[tokio::test]
    async fn explicit_slug_shape_is_validated() {
        let store = store().await;

        let long = "a".repeat(MAX_SLUG_LEN + 1);
        let err = store.create_category("Long", Some(&long)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field, .. } if field == "slug"));

        let err = store
            .create_category("Spaced", Some("not a slug"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field, .. } if field == "slug"));

        let genre = store.create_genre("Top 10", Some("top_10")).await.unwrap();
        assert_eq!(genre.slug, "top_10");
    }

    #[tokio::test]
    async fn title_year_is_validated() {
        let store = store().await;
        store.create_category("Film", None).await.unwrap();
        let err = store
            .create_title(NewTitle {
                name: "Too old".to_string(),
                year: Some(800),
                description: None,
                category: "film".to_string(),
                genres: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field, .. } if field == "year"));
    }

    #[tokio::test]
    async fn unknown_category_fails_validation() {
        let store = store().await;
        let err = store
            .create_title(NewTitle {
                name: "Orphan".to_string(),
                year: Some(2000),
                description: None,
                category: "nope".to_string(),
                genres: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field, .. } if field == "category"));
    }

    #[tokio::test]
    async fn second_review_by_same_author_conflicts() {
        let store = store().await;
        let title = seeded_title(&store).await;

        store
            .create_review(title.id, "u1", "alice", "great", 9)
            .await
            .unwrap();
        let err = store
            .create_review(title.id, "u1", "alice", "again", 7)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateReview));

        // A different author is fine.
        store
            .create_review(title.id, "u2", "bob", "ok", 5)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rating_is_the_average_score() {
        let store = store().await;
        let title = seeded_title(&store).await;
        assert_eq!(store.get_title(title.id).await.unwrap().unwrap().rating, None);

        store.create_review(title.id, "u1", "a", "x", 10).await.unwrap();
        store.create_review(title.id, "u2", "b", "y", 5).await.unwrap();

        let rating = store.get_title(title.id).await.unwrap().unwrap().rating;
        assert_eq!(rating, Some(7.5));
    }

    #[tokio::test]
    async fn score_outside_scale_is_rejected() {
        let store = store().await;
        let title = seeded_title(&store).await;
        for bad in [0, 11, -3] {
            let err = store
                .create_review(title.id, "u1", "alice", "x", bad)
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::Validation { field, .. } if field == "score"));
        }
    }

    #[tokio::test]
    async fn titles_filter_by_genre_and_year() {
        let store = store().await;
        store.create_category("Film", None).await.unwrap();
        store.create_genre("Drama", None).await.unwrap();
        store.create_genre("Comedy", None).await.unwrap();
        for (name, year, genre) in [
            ("Stalker", 1979, "drama"),
            ("Mirror", 1975, "drama"),
            ("Playtime", 1967, "comedy"),
        ] {
            store
                .create_title(NewTitle {
                    name: name.to_string(),
                    year: Some(year),
                    description: None,
                    category: "film".to_string(),
                    genres: vec![genre.to_string()],
                })
                .await
                .unwrap();
        }

        let dramas = store
            .list_titles(
                &TitleFilter {
                    genre: Some("drama".to_string()),
                    ..Default::default()
                },
                20,
                0,
            )
            .await
            .unwrap();
        assert_eq!(dramas.len(), 2);

        let from_1979 = store
            .list_titles(
                &TitleFilter {
                    year: Some(1979),
                    ..Default::default()
                },
                20,
                0,
            )
            .await
            .unwrap();
        assert_eq!(from_1979.len(), 1);
        assert_eq!(from_1979[0].name, "Stalker");

        let by_name = store
            .list_titles(
                &TitleFilter {
                    name: Some("time".to_string()),
                    ..Default::default()
                },
                20,
                0,
            )
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Playtime");
    }

    #[tokio::test]
    async fn deleting_a_title_takes_reviews_and_comments_with_it() {
        let store = store().await;
        let title = seeded_title(&store).await;
        let review = store
            .create_review(title.id, "u1", "alice", "great", 9)
            .await
            .unwrap();
        store
            .create_comment(review.id, "u2", "bob", "agreed")
            .await
            .unwrap();

        assert!(store.delete_title(title.id).await.unwrap());
        assert!(store.list_reviews(title.id, 20, 0).await.unwrap().is_empty());
        assert!(store.list_comments(review.id, 20, 0).await.unwrap().is_empty());
    }
}
