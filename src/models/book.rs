//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::author::Author;
use super::category::Category;
use super::publisher::Publisher;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub file_path: Option<String>,
    pub publisher_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated review figures shown on a book detail
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// Book with resolved associations for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub publisher: Option<Publisher>,
    pub authors: Vec<Author>,
    pub categories: Vec<Category>,
    pub review_summary: Option<ReviewSummary>,
}

/// Short book representation for lists and search results
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub publication_year: Option<i32>,
    pub publisher_name: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10-17 characters"))]
    pub isbn: String,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub file_path: Option<String>,
    pub publisher_id: Option<i64>,
    pub author_ids: Option<Vec<i64>>,
    pub category_ids: Option<Vec<i64>>,
}

/// Update book request. Absent fields are left unchanged; an author_ids or
/// category_ids list that is present (even empty) replaces the whole set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 10, max = 17, message = "ISBN must be 10-17 characters"))]
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub file_path: Option<String>,
    pub publisher_id: Option<i64>,
    pub author_ids: Option<Vec<i64>>,
    pub category_ids: Option<Vec<i64>>,
}

/// Multi-criteria search parameters. All criteria are optional and
/// AND-combined; text matches are partial and case-insensitive.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookSearchQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Advanced search parameters (unpaged join-style query)
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct AdvancedSearchQuery {
    pub category_name: Option<String>,
    pub author_name: Option<String>,
    /// Restrict to books this user currently has on loan
    pub user_id: Option<i64>,
    pub title: Option<String>,
}
