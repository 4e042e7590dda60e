//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDetails, BookSummary, CreateBook, ReviewSummary, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate that every id in a referenced batch resolves, by comparing
    /// the returned set size against the requested set size.
    async fn check_authors_exist(&self, ids: &[i64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.repository.authors.get_by_ids(ids).await?;
        if found.len() != ids.len() {
            return Err(AppError::NotFound("One or more authors not found".to_string()));
        }
        Ok(())
    }

    async fn check_categories_exist(&self, ids: &[i64]) -> AppResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found = self.repository.categories.get_by_ids(ids).await?;
        if found.len() != ids.len() {
            return Err(AppError::NotFound("One or more categories not found".to_string()));
        }
        Ok(())
    }

    /// Create a book with its author/category associations
    pub async fn create(&self, request: CreateBook) -> AppResult<BookDetails> {
        if self.repository.books.isbn_exists(&request.isbn, None).await? {
            return Err(AppError::Duplicate(format!(
                "Book with ISBN '{}' already exists",
                request.isbn
            )));
        }

        if let Some(publisher_id) = request.publisher_id {
            self.repository.publishers.get_by_id(publisher_id).await?;
        }

        if let Some(ref author_ids) = request.author_ids {
            self.check_authors_exist(author_ids).await?;
        }
        if let Some(ref category_ids) = request.category_ids {
            self.check_categories_exist(category_ids).await?;
        }

        let book = self.repository.books.create(&request).await?;

        if let Some(ref author_ids) = request.author_ids {
            self.repository.books.set_authors(book.id, author_ids).await?;
        }
        if let Some(ref category_ids) = request.category_ids {
            self.repository.books.set_categories(book.id, category_ids).await?;
        }

        self.get_details(book.id).await
    }

    /// Book with resolved associations and review summary
    pub async fn get_details(&self, book_id: i64) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(book_id).await?;

        let publisher = match book.publisher_id {
            Some(id) => Some(self.repository.publishers.get_by_id(id).await?),
            None => None,
        };
        let authors = self.repository.books.get_book_authors(book_id).await?;
        let categories = self.repository.books.get_book_categories(book_id).await?;

        let (average_rating, total_reviews) =
            self.repository.reviews.average_rating(book_id).await?;
        let review_summary = (total_reviews > 0).then_some(ReviewSummary {
            average_rating,
            total_reviews,
        });

        Ok(BookDetails {
            book,
            publisher,
            authors,
            categories,
            review_summary,
        })
    }

    /// Paged listing
    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository
            .books
            .list(page.max(1), per_page.clamp(1, 100))
            .await
    }

    /// Update a book. Absent fields are left unchanged; a present
    /// author_ids/category_ids list replaces the whole association set.
    pub async fn update(&self, book_id: i64, request: UpdateBook) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(book_id).await?;

        if let Some(ref isbn) = request.isbn {
            if *isbn != book.isbn
                && self.repository.books.isbn_exists(isbn, Some(book_id)).await?
            {
                return Err(AppError::Duplicate(format!(
                    "Book with ISBN '{}' already exists",
                    isbn
                )));
            }
        }

        if let Some(publisher_id) = request.publisher_id {
            self.repository.publishers.get_by_id(publisher_id).await?;
        }

        if let Some(ref author_ids) = request.author_ids {
            self.check_authors_exist(author_ids).await?;
        }
        if let Some(ref category_ids) = request.category_ids {
            self.check_categories_exist(category_ids).await?;
        }

        self.repository
            .books
            .update(
                book_id,
                request.title.as_deref(),
                request.isbn.as_deref(),
                request.publication_year,
                request.description.as_deref(),
                request.cover_image_url.as_deref(),
                request.file_path.as_deref(),
                request.publisher_id,
            )
            .await?;

        if let Some(ref author_ids) = request.author_ids {
            self.repository.books.set_authors(book_id, author_ids).await?;
        }
        if let Some(ref category_ids) = request.category_ids {
            self.repository.books.set_categories(book_id, category_ids).await?;
        }

        self.get_details(book_id).await
    }

    /// Delete a book. Active (BORROWED) loans block deletion; historical
    /// loans and reviews do not.
    pub async fn delete(&self, book_id: i64) -> AppResult<()> {
        self.repository.books.get_by_id(book_id).await?;

        if self.repository.loans.has_active_loan(book_id).await? {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete book with id {} because it has active loans",
                book_id
            )));
        }

        self.repository.books.delete(book_id).await
    }
}
