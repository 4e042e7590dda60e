//! Loan lifecycle service
//!
//! State machine per loan: BORROWED -> RETURNED (on-time return),
//! BORROWED -> OVERDUE (late return), BORROWED -> BORROWED (renewal).
//! RETURNED and OVERDUE are terminal.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{LoanStatus, UserStatus},
        loan::{CreateLoan, Loan, LoanDetails, LoanQuery, LoanStatistics},
    },
    repository::Repository,
};

/// Terminal status for a return happening at `now`
fn classify_return(due_date: DateTime<Utc>, now: DateTime<Utc>) -> LoanStatus {
    if due_date < now {
        LoanStatus::Overdue
    } else {
        LoanStatus::Returned
    }
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book: the user must exist and be ACTIVE, the book must exist
    /// and have no active loan. The storage layer guarantees at most one
    /// BORROWED loan per book even under concurrent borrows.
    pub async fn borrow(&self, request: CreateLoan) -> AppResult<Loan> {
        let user = self.repository.users.get_by_id(request.user_id).await?;

        if user.status != UserStatus::Active {
            return Err(AppError::BusinessRule(
                "User must be ACTIVE to borrow books".to_string(),
            ));
        }

        self.repository.books.get_by_id(request.book_id).await?;

        self.repository
            .loans
            .create(request.user_id, request.book_id, request.due_date)
            .await
    }

    /// Return a borrowed book. Late returns are recorded as OVERDUE,
    /// on-time returns as RETURNED; both are terminal, so a second return
    /// attempt on either is rejected.
    pub async fn return_book(&self, loan_id: i64) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        if loan.return_date.is_some() {
            return Err(AppError::BusinessRule(
                "Book has already been returned".to_string(),
            ));
        }

        let now = Utc::now();
        let status = classify_return(loan.due_date, now);

        self.repository.loans.mark_returned(loan_id, now, status).await
    }

    /// Renew an active loan; the new due date must strictly extend the
    /// current one.
    pub async fn renew(&self, loan_id: i64, new_due_date: DateTime<Utc>) -> AppResult<Loan> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;

        if loan.status != LoanStatus::Borrowed {
            return Err(AppError::BusinessRule(
                "Only BORROWED loans can be renewed".to_string(),
            ));
        }

        if new_due_date <= loan.due_date {
            return Err(AppError::BusinessRule(
                "New due date must be after current due date".to_string(),
            ));
        }

        self.repository.loans.update_due_date(loan_id, new_due_date).await
    }

    /// Loan detail by ID
    pub async fn get(&self, loan_id: i64) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(loan_id).await
    }

    /// List loans with optional status/user/book filters
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.loans.list(query).await
    }

    /// Full loan history for a user
    pub async fn history_for_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.list_by_user(user_id).await
    }

    /// Books a user currently has on loan
    pub async fn active_for_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.list_active_by_user(user_id).await
    }

    /// Currently-overdue loans (computed: BORROWED and past due)
    pub async fn overdue(&self, user_id: Option<i64>) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list_overdue(user_id).await
    }

    /// Borrow/return statistics over a date range
    pub async fn statistics(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> AppResult<LoanStatistics> {
        self.repository.loans.statistics(start_date, end_date).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_late_return_is_overdue() {
        let now = Utc::now();
        assert_eq!(
            classify_return(now - Duration::days(3), now),
            LoanStatus::Overdue
        );
    }

    #[test]
    fn test_on_time_return_is_returned() {
        let now = Utc::now();
        assert_eq!(
            classify_return(now + Duration::days(3), now),
            LoanStatus::Returned
        );
        // due exactly now is not yet late
        assert_eq!(classify_return(now, now), LoanStatus::Returned);
    }
}
