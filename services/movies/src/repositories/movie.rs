//! Movie repository for database operations

use common::{
    database::apply_schema,
    error::{DatabaseError, DatabaseResult},
};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::movie::{Movie, NewMovie};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    overview TEXT NOT NULL,
    year INTEGER NOT NULL,
    rating REAL NOT NULL,
    category TEXT NOT NULL
)
"#;

/// Movie repository for database operations
#[derive(Clone)]
pub struct MovieRepository {
    pool: SqlitePool,
}

impl MovieRepository {
    /// Create a new movie repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the `movies` table if it does not exist yet
    pub async fn init_schema(&self) -> DatabaseResult<()> {
        apply_schema(&self.pool, SCHEMA).await
    }

    /// Get every movie in storage order
    pub async fn list_all(&self) -> DatabaseResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, overview, year, rating, category
            FROM movies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Get a movie by ID
    pub async fn get_by_id(&self, id: i64) -> DatabaseResult<Option<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, overview, year, rating, category
            FROM movies
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Get the movies matching both the category and the year exactly
    pub async fn find_by_category_and_year(
        &self,
        category: &str,
        year: i32,
    ) -> DatabaseResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, overview, year, rating, category
            FROM movies
            WHERE category = ? AND year = ?
            ORDER BY id
            "#,
        )
        .bind(category)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Insert a movie; the store assigns the id unless one is supplied
    pub async fn create(&self, movie: &NewMovie) -> DatabaseResult<Movie> {
        info!("Creating movie: {}", movie.title);

        sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (id, title, overview, year, rating, category)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, title, overview, year, rating, category
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.overview)
        .bind(movie.year)
        .bind(movie.rating)
        .bind(&movie.category)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Replace every field but the id; `None` when no such movie exists
    pub async fn update(&self, id: i64, movie: &NewMovie) -> DatabaseResult<Option<Movie>> {
        info!("Updating movie {}", id);

        sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies
            SET title = ?, overview = ?, year = ?, rating = ?, category = ?
            WHERE id = ?
            RETURNING id, title, overview, year, rating, category
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.overview)
        .bind(movie.year)
        .bind(movie.rating)
        .bind(&movie.category)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Delete a movie by ID; false when no such movie exists
    pub async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        info!("Deleting movie {}", id);

        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of stored movies
    pub async fn count(&self) -> DatabaseResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Insert `movies` only when the table is empty; returns how many were inserted
    pub async fn seed_if_empty(&self, movies: &[NewMovie]) -> DatabaseResult<usize> {
        if self.count().await? > 0 {
            return Ok(0);
        }

        for movie in movies {
            self.create(movie).await?;
        }

        info!("Seeded {} movies", movies.len());
        Ok(movies.len())
    }
}
