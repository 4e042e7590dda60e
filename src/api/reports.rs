//! Reporting endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AppResult, models::book::BookSummary};

use super::AuthenticatedUser;

/// Overall dashboard counters plus the most-borrowed ranking
#[derive(Serialize, ToSchema)]
pub struct DashboardStatistics {
    pub total_books: i64,
    pub total_users: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub most_borrowed_books: Vec<BookSummary>,
}

/// Borrow/return activity over a date range, grouped per day
#[derive(Serialize, ToSchema)]
pub struct LoanReport {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_borrows: i64,
    pub total_returns: i64,
    /// Borrow counts keyed by YYYY-MM-DD
    pub borrows_by_date: BTreeMap<String, i64>,
    /// Return counts keyed by YYYY-MM-DD
    pub returns_by_date: BTreeMap<String, i64>,
}

/// Per-book rating report, or the top-rated ranking when no book is given
#[derive(Serialize, ToSchema)]
pub struct ReviewReport {
    pub book_id: Option<i64>,
    pub book_title: Option<String>,
    /// Review counts keyed by rating value
    pub rating_distribution: BTreeMap<String, i64>,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub top_rated_books: Vec<BookSummary>,
}

/// Date range for the loan report
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanReportQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Book filter for the review report
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ReviewReportQuery {
    pub book_id: Option<i64>,
}

/// Dashboard statistics (admin)
#[utoipa::path(
    get,
    path = "/reports/dashboard",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStatistics),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn dashboard(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStatistics>> {
    claims.require_admin()?;

    let stats = state.services.reports.dashboard().await?;
    Ok(Json(stats))
}

/// Loan activity report over a date range (admin)
#[utoipa::path(
    get,
    path = "/reports/loans",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(LoanReportQuery),
    responses(
        (status = 200, description = "Loan activity report", body = LoanReport),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn loan_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanReportQuery>,
) -> AppResult<Json<LoanReport>> {
    claims.require_admin()?;

    let report = state
        .services
        .reports
        .loan_report(query.start_date, query.end_date)
        .await?;
    Ok(Json(report))
}

/// Review report, per book or top-rated ranking (admin)
#[utoipa::path(
    get,
    path = "/reports/reviews",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(ReviewReportQuery),
    responses(
        (status = 200, description = "Review report", body = ReviewReport),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn review_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReviewReportQuery>,
) -> AppResult<Json<ReviewReport>> {
    claims.require_admin()?;

    let report = state.services.reports.review_report(query.book_id).await?;
    Ok(Json(report))
}
