//! Movie repository for database operations
//!
//! Every read joins the movie to its owner's display name; `created_by`
//! stays NULL for unowned rows.

use anyhow::Result;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::models::{Movie, MovieInput, MovieQuery};

fn movie_from_row(row: PgRow) -> Movie {
    Movie {
        id: row.get("id"),
        title: row.get("title"),
        year: row.get("year"),
        genre: row.get("genre"),
        poster: row.get("poster"),
        user_id: row.get("user_id"),
        created_by: row.get("created_by"),
    }
}

/// Movie repository
#[derive(Clone)]
pub struct MovieRepository {
    pool: PgPool,
}

impl MovieRepository {
    /// Create a new movie repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get movies with optional search filter and pagination
    ///
    /// The search term matches title or genre, case-insensitively. Returns
    /// the requested page and the total number of matches.
    pub async fn list(&self, query: &MovieQuery) -> Result<(Vec<Movie>, i64)> {
        let page = query.page();
        let limit = query.limit();
        let offset = (page - 1) as i64 * limit as i64;

        let rows = sqlx::query(
            r#"
            SELECT m.id, m.title, m.year, m.genre, m.poster, m.user_id,
                   u.name AS created_by
            FROM movies m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE $1::text IS NULL
               OR m.title ILIKE '%' || $1 || '%'
               OR m.genre ILIKE '%' || $1 || '%'
            ORDER BY m.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&query.search)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM movies m
            WHERE $1::text IS NULL
               OR m.title ILIKE '%' || $1 || '%'
               OR m.genre ILIKE '%' || $1 || '%'
            "#,
        )
        .bind(&query.search)
        .fetch_one(&self.pool)
        .await?;

        let movies = rows.into_iter().map(movie_from_row).collect();

        Ok((movies, total))
    }

    /// Get a movie by ID, joined to its owner
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Movie>> {
        let row = sqlx::query(
            r#"
            SELECT m.id, m.title, m.year, m.genre, m.poster, m.user_id,
                   u.name AS created_by
            FROM movies m
            LEFT JOIN users u ON u.id = m.user_id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(movie_from_row))
    }

    /// Insert a movie owned by the given user and return the joined record
    pub async fn create(&self, user_id: i32, payload: &MovieInput) -> Result<Movie> {
        info!("Creating movie '{}' for user {}", payload.title, user_id);

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO movies (title, year, genre, poster, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&payload.title)
        .bind(payload.year)
        .bind(&payload.genre)
        .bind(&payload.poster)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let movie = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Movie {} vanished after insert", id))?;

        Ok(movie)
    }

    /// Replace a movie's fields and return the joined record
    pub async fn update(&self, id: i32, payload: &MovieInput) -> Result<Option<Movie>> {
        info!("Updating movie {}", id);

        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $2, year = $3, genre = $4, poster = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(payload.year)
        .bind(&payload.genre)
        .bind(&payload.poster)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Delete a movie by ID
    pub async fn delete(&self, id: i32) -> Result<bool> {
        info!("Deleting movie {}", id);

        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
