//! Review management service

use crate::{
    error::{AppError, AppResult},
    models::review::{AverageRating, CreateReview, Review, UpdateReview},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a review. A user may review a given book at most once.
    pub async fn create(&self, request: CreateReview) -> AppResult<Review> {
        self.repository.users.get_by_id(request.user_id).await?;
        self.repository.books.get_by_id(request.book_id).await?;

        if self
            .repository
            .reviews
            .exists_for_user_and_book(request.user_id, request.book_id)
            .await?
        {
            return Err(AppError::Duplicate(
                "User has already reviewed this book".to_string(),
            ));
        }

        self.repository
            .reviews
            .create(
                request.user_id,
                request.book_id,
                request.rating,
                request.comment.as_deref(),
            )
            .await
    }

    /// Update a review. Only the owner or an admin may do so; absent patch
    /// fields are left unchanged.
    pub async fn update(
        &self,
        review_id: i64,
        patch: UpdateReview,
        caller_id: i64,
        caller_is_admin: bool,
    ) -> AppResult<Review> {
        let review = self.repository.reviews.get_by_id(review_id).await?;

        if review.user_id != caller_id && !caller_is_admin {
            return Err(AppError::Forbidden(
                "Only the review owner or an admin may modify it".to_string(),
            ));
        }

        self.repository
            .reviews
            .update(review_id, patch.rating, patch.comment.as_deref())
            .await
    }

    /// Delete a review. Same ownership guard as update.
    pub async fn delete(
        &self,
        review_id: i64,
        caller_id: i64,
        caller_is_admin: bool,
    ) -> AppResult<()> {
        let review = self.repository.reviews.get_by_id(review_id).await?;

        if review.user_id != caller_id && !caller_is_admin {
            return Err(AppError::Forbidden(
                "Only the review owner or an admin may delete it".to_string(),
            ));
        }

        self.repository.reviews.delete(review_id).await
    }

    /// Paged reviews for a book
    pub async fn list_by_book(
        &self,
        book_id: i64,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<Review>, i64)> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository
            .reviews
            .list_by_book(book_id, page.max(1), per_page.clamp(1, 100))
            .await
    }

    /// Reviews written by a user
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Review>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.reviews.list_by_user(user_id).await
    }

    /// Mean rating for a book; {0.0, 0} when unreviewed
    pub async fn average_rating(&self, book_id: i64) -> AppResult<AverageRating> {
        let book = self.repository.books.get_by_id(book_id).await?;
        let (average_rating, total_reviews) =
            self.repository.reviews.average_rating(book_id).await?;

        Ok(AverageRating {
            book_id,
            book_title: book.title,
            average_rating,
            total_reviews,
        })
    }
}
