//! Catalog search endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::book::{AdvancedSearchQuery, BookSearchQuery, BookSummary},
};

use super::books::PaginatedResponse;

/// Multi-criteria book search with pagination
#[utoipa::path(
    get,
    path = "/search/books",
    tag = "search",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Matching books", body = PaginatedResponse<BookSummary>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<PaginatedResponse<BookSummary>>> {
    let (books, total) = state.services.search.search_books(&query).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Advanced join-style search, unpaged
#[utoipa::path(
    get,
    path = "/search/books/advanced",
    tag = "search",
    params(AdvancedSearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookSummary>)
    )
)]
pub async fn advanced_search(
    State(state): State<crate::AppState>,
    Query(query): Query<AdvancedSearchQuery>,
) -> AppResult<Json<Vec<BookSummary>>> {
    let books = state.services.search.advanced_search(&query).await?;
    Ok(Json(books))
}
