//! Catalog search service

use crate::{
    error::AppResult,
    models::book::{AdvancedSearchQuery, BookSearchQuery, BookSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct SearchService {
    repository: Repository,
}

impl SearchService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Multi-criteria paged search across title/author/category/publisher/
    /// isbn/year-range
    pub async fn search_books(
        &self,
        query: &BookSearchQuery,
    ) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.search(query).await
    }

    /// Advanced join-style search, unpaged
    pub async fn advanced_search(
        &self,
        query: &AdvancedSearchQuery,
    ) -> AppResult<Vec<BookSummary>> {
        self.repository.books.advanced_search(query).await
    }
}
