//! Reviews repository for database operations

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::review::Review,
};

/// Unique constraint enforcing one review per (user, book) pair
const ONE_REVIEW_PER_PAIR: &str = "reviews_user_id_book_id_key";

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get review by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Review> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", id)))
    }

    /// Whether the user has already reviewed the book
    pub async fn exists_for_user_and_book(&self, user_id: i64, book_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE user_id = $1 AND book_id = $2)",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new review. The (user, book) unique constraint backstops the
    /// existence check under concurrency.
    pub async fn create(
        &self,
        user_id: i64,
        book_id: i64,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (user_id, book_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some(ONE_REVIEW_PER_PAIR) => {
                AppError::Duplicate("User has already reviewed this book".to_string())
            }
            _ => AppError::Database(e),
        })
    }

    /// Partial update. NULL binds leave the column unchanged.
    pub async fn update(
        &self,
        id: i64,
        rating: Option<i32>,
        comment: Option<&str>,
    ) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET rating = COALESCE($2, rating),
                comment = COALESCE($3, comment)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", id)))
    }

    /// Delete a review
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Paged reviews for a book, newest first
    pub async fn list_by_book(
        &self,
        book_id: i64,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Review>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT * FROM reviews
            WHERE book_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(book_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((reviews, total))
    }

    /// All reviews written by a user
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// Mean rating and review count for a book. (0.0, 0) when unreviewed,
    /// never NULL or NaN.
    pub async fn average_rating(&self, book_id: i64) -> AppResult<(f64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(AVG(rating), 0)::float8 AS average, COUNT(*) AS total
            FROM reviews
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("average"), row.get("total")))
    }

    /// Count of reviews per rating value (1..=5) for a book
    pub async fn rating_distribution(&self, book_id: i64) -> AppResult<Vec<(i32, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT rating, COUNT(*) AS count
            FROM reviews
            WHERE book_id = $1
            GROUP BY rating
            ORDER BY rating
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("rating"), row.get("count")))
            .collect())
    }
}
