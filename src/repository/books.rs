//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::Author,
        book::{AdvancedSearchQuery, Book, BookSearchQuery, BookSummary, CreateBook},
        category::Category,
    },
};

const SUMMARY_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.publication_year, p.name AS publisher_name
    FROM books b
    LEFT JOIN publishers p ON p.id = b.publisher_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already taken by another book
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Insert a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, isbn, publication_year, description,
                               cover_image_url, file_path, publisher_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(&book.description)
        .bind(&book.cover_image_url)
        .bind(&book.file_path)
        .bind(book.publisher_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some("books_isbn_key") => {
                AppError::Duplicate(format!("Book with ISBN '{}' already exists", book.isbn))
            }
            _ => AppError::Database(e),
        })
    }

    /// Update scalar fields. NULL binds leave the column unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        isbn: Option<&str>,
        publication_year: Option<i32>,
        description: Option<&str>,
        cover_image_url: Option<&str>,
        file_path: Option<&str>,
        publisher_id: Option<i64>,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                isbn = COALESCE($3, isbn),
                publication_year = COALESCE($4, publication_year),
                description = COALESCE($5, description),
                cover_image_url = COALESCE($6, cover_image_url),
                file_path = COALESCE($7, file_path),
                publisher_id = COALESCE($8, publisher_id)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(isbn)
        .bind(publication_year)
        .bind(description)
        .bind(cover_image_url)
        .bind(file_path)
        .bind(publisher_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book and its junction rows
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM reviews WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM loans WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Load all authors for a book via the book_authors junction table
    pub async fn get_book_authors(&self, book_id: i64) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.*
            FROM book_authors ba
            JOIN authors a ON a.id = ba.author_id
            WHERE ba.book_id = $1
            ORDER BY a.full_name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }

    /// Load all categories for a book via the book_categories junction table
    pub async fn get_book_categories(&self, book_id: i64) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.*
            FROM book_categories bc
            JOIN categories c ON c.id = bc.category_id
            WHERE bc.book_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Replace the author set of a book
    pub async fn set_authors(&self, book_id: i64, author_ids: &[i64]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        for author_id in author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(author_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Replace the category set of a book
    pub async fn set_categories(&self, book_id: i64, category_ids: &[i64]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM book_categories WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        for category_id in category_ids {
            sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES ($1, $2)")
                .bind(book_id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Plain paged listing
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookSummary>, i64)> {
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} ORDER BY b.id LIMIT $1 OFFSET $2",
            SUMMARY_SELECT
        ))
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Multi-criteria paged search: partial case-insensitive matching on
    /// title/author/category/publisher, exact ISBN, publication-year range.
    pub async fn search(&self, query: &BookSearchQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let filter = r#"
            WHERE ($1::text IS NULL OR b.title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM book_authors ba JOIN authors a ON a.id = ba.author_id
                    WHERE ba.book_id = b.id AND a.full_name ILIKE '%' || $2 || '%'))
              AND ($3::text IS NULL OR EXISTS (
                    SELECT 1 FROM book_categories bc JOIN categories c ON c.id = bc.category_id
                    WHERE bc.book_id = b.id AND c.name ILIKE '%' || $3 || '%'))
              AND ($4::text IS NULL OR p.name ILIKE '%' || $4 || '%')
              AND ($5::text IS NULL OR b.isbn = $5)
              AND ($6::int IS NULL OR b.publication_year >= $6)
              AND ($7::int IS NULL OR b.publication_year <= $7)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            r#"
            SELECT COUNT(*)
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            {}
            "#,
            filter
        ))
        .bind(&query.title)
        .bind(&query.author)
        .bind(&query.category)
        .bind(&query.publisher)
        .bind(&query.isbn)
        .bind(query.min_year)
        .bind(query.max_year)
        .fetch_one(&self.pool)
        .await?;

        let books = sqlx::query_as::<_, BookSummary>(&format!(
            "{} {} ORDER BY b.title LIMIT $8 OFFSET $9",
            SUMMARY_SELECT, filter
        ))
        .bind(&query.title)
        .bind(&query.author)
        .bind(&query.category)
        .bind(&query.publisher)
        .bind(&query.isbn)
        .bind(query.min_year)
        .bind(query.max_year)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Advanced join-style search: category name, author name, a user's
    /// currently-borrowed books, title. Unpaged.
    pub async fn advanced_search(&self, query: &AdvancedSearchQuery) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(&format!(
            r#"
            {}
            WHERE ($1::text IS NULL OR EXISTS (
                    SELECT 1 FROM book_categories bc JOIN categories c ON c.id = bc.category_id
                    WHERE bc.book_id = b.id AND c.name ILIKE '%' || $1 || '%'))
              AND ($2::text IS NULL OR EXISTS (
                    SELECT 1 FROM book_authors ba JOIN authors a ON a.id = ba.author_id
                    WHERE ba.book_id = b.id AND a.full_name ILIKE '%' || $2 || '%'))
              AND ($3::bigint IS NULL OR EXISTS (
                    SELECT 1 FROM loans l
                    WHERE l.book_id = b.id AND l.user_id = $3 AND l.status = 'BORROWED'))
              AND ($4::text IS NULL OR b.title ILIKE '%' || $4 || '%')
            ORDER BY b.title
            "#,
            SUMMARY_SELECT
        ))
        .bind(&query.category_name)
        .bind(&query.author_name)
        .bind(query.user_id)
        .bind(&query.title)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Top-N books by total loan count, descending
    pub async fn most_borrowed(&self, limit: i64) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.isbn, b.publication_year, p.name AS publisher_name
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            LEFT JOIN loans l ON l.book_id = b.id
            GROUP BY b.id, p.name
            ORDER BY COUNT(l.id) DESC, b.id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Top-N books whose average rating is at least min_rating, best first
    pub async fn top_rated(&self, min_rating: f64, limit: i64) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.isbn, b.publication_year, p.name AS publisher_name
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            JOIN reviews r ON r.book_id = b.id
            GROUP BY b.id, p.name
            HAVING AVG(r.rating) >= $1
            ORDER BY AVG(r.rating) DESC, b.id
            LIMIT $2
            "#,
        )
        .bind(min_rating)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Total book count (dashboard)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// How many books reference a publisher (delete guard)
    pub async fn count_by_publisher(&self, publisher_id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE publisher_id = $1")
                .bind(publisher_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// How many books reference an author (delete guard)
    pub async fn count_by_author(&self, author_id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_authors WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// How many books reference a category (delete guard)
    pub async fn count_by_category(&self, category_id: i64) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_categories WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
