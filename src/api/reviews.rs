//! Review management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::review::{AverageRating, CreateReview, Review, UpdateReview},
};

use super::{
    books::{PageQuery, PaginatedResponse},
    AuthenticatedUser,
};

/// Create a review (for yourself, or anyone as admin)
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 403, description = "Cannot review on behalf of another user"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "User has already reviewed this book")
    )
)]
pub async fn create_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    if claims.user_id != request.user_id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot create a review for another user".to_string(),
        ));
    }
    request.validate()?;

    let review = state.services.reviews.create(request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Update a review (owner or admin). Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    request_body = UpdateReview,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn update_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(review_id): Path<i64>,
    Json(request): Json<UpdateReview>,
) -> AppResult<Json<Review>> {
    request.validate()?;

    let (caller_id, caller_is_admin) = claims.principal();
    let review = state
        .services
        .reviews
        .update(review_id, request, caller_id, caller_is_admin)
        .await?;
    Ok(Json(review))
}

/// Delete a review (owner or admin)
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn delete_review(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(review_id): Path<i64>,
) -> AppResult<StatusCode> {
    let (caller_id, caller_is_admin) = claims.principal();
    state
        .services
        .reviews
        .delete(review_id, caller_id, caller_is_admin)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Paged reviews for a book
#[utoipa::path(
    get,
    path = "/reviews/books/{book_id}",
    tag = "reviews",
    params(
        ("book_id" = i64, Path, description = "Book ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Page of reviews", body = PaginatedResponse<Review>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_reviews(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Review>>> {
    let (reviews, total) = state
        .services
        .reviews
        .list_by_book(book_id, query.page(), query.per_page())
        .await?;

    Ok(Json(PaginatedResponse {
        items: reviews,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Reviews written by a user (self or admin)
#[utoipa::path(
    get,
    path = "/reviews/users/{user_id}",
    tag = "reviews",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's reviews", body = Vec<Review>),
        (status = 403, description = "Not the account owner or an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_reviews(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Review>>> {
    if claims.user_id != user_id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view another user's reviews".to_string(),
        ));
    }

    let reviews = state.services.reviews.list_by_user(user_id).await?;
    Ok(Json(reviews))
}

/// Mean rating for a book
#[utoipa::path(
    get,
    path = "/reviews/books/{book_id}/average-rating",
    tag = "reviews",
    params(
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Average rating", body = AverageRating),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_average_rating(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<AverageRating>> {
    let rating = state.services.reviews.average_rating(book_id).await?;
    Ok(Json(rating))
}
