//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery, LoanStatistics, RenewLoan},
};

use super::{books::PaginatedResponse, AuthenticatedUser};

/// Filter for the overdue listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct OverdueQuery {
    pub user_id: Option<i64>,
}

/// Date range for loan statistics
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StatisticsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Due date not in the future"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "User inactive or book already borrowed")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    if claims.user_id != request.user_id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot borrow a book for another user".to_string(),
        ));
    }

    if request.due_date <= Utc::now() {
        return Err(AppError::Validation(
            "Due date must be in the future".to_string(),
        ));
    }

    let loan = state.services.loans.borrow(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.return_book(loan_id).await?;
    Ok(Json(loan))
}

/// Renew a loan with a later due date
#[utoipa::path(
    put,
    path = "/loans/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    request_body = RenewLoan,
    responses(
        (status = 200, description = "Loan renewed", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Not BORROWED or date not increasing")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(loan_id): Path<i64>,
    Json(request): Json<RenewLoan>,
) -> AppResult<Json<Loan>> {
    let loan = state
        .services
        .loans
        .renew(loan_id, request.new_due_date)
        .await?;
    Ok(Json(loan))
}

/// List loans with filters (admin)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Page of loans", body = PaginatedResponse<LoanDetails>),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    claims.require_admin()?;

    let (loans, total) = state.services.loans.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items: loans,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Currently-overdue loans (computed, not yet flipped to OVERDUE)
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(OverdueQuery),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_overdue_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<OverdueQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_admin()?;

    let loans = state.services.loans.overdue(query.user_id).await?;
    Ok(Json(loans))
}

/// Borrow/return statistics over a date range (admin)
#[utoipa::path(
    get,
    path = "/loans/statistics",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Loan statistics", body = LoanStatistics),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn loan_statistics(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StatisticsQuery>,
) -> AppResult<Json<LoanStatistics>> {
    claims.require_admin()?;

    let stats = state
        .services
        .loans
        .statistics(query.start_date, query.end_date)
        .await?;
    Ok(Json(stats))
}

/// Get loan details by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 403, description = "Not the borrower or an admin"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get(loan_id).await?;

    if loan.user_id != claims.user_id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view another user's loan".to_string(),
        ));
    }

    Ok(Json(loan))
}

/// Full loan history for a user (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's loan history", body = Vec<LoanDetails>),
        (status = 403, description = "Not the account owner or an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    if claims.user_id != user_id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view another user's loans".to_string(),
        ));
    }

    let loans = state.services.loans.history_for_user(user_id).await?;
    Ok(Json(loans))
}

/// Books a user currently has on loan (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/loans/active",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's active loans", body = Vec<LoanDetails>),
        (status = 403, description = "Not the account owner or an admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_active_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    if claims.user_id != user_id && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Cannot view another user's loans".to_string(),
        ));
    }

    let loans = state.services.loans.active_for_user(user_id).await?;
    Ok(Json(loans))
}
