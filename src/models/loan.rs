//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::enums::LoanStatus;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

impl Loan {
    /// Computed overdue: still BORROWED and past due. The stored status only
    /// flips to OVERDUE at return time.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status == LoanStatus::Borrowed && self.due_date < now
    }
}

/// Loan with borrower and book names for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub book_id: i64,
    pub book_title: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    #[sqlx(default)]
    pub is_overdue: bool,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub user_id: i64,
    pub book_id: i64,
    /// Due date, strictly in the future
    pub due_date: DateTime<Utc>,
}

/// Renew loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewLoan {
    /// New due date, strictly after the current one
    pub new_due_date: DateTime<Utc>,
}

/// Loan listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
    pub user_id: Option<i64>,
    pub book_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Borrow/return statistics over a date range
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanStatistics {
    pub total_borrowed: i64,
    pub total_returned: i64,
    pub total_overdue: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn loan(status: LoanStatus, due_in: Duration) -> Loan {
        let now = Utc::now();
        Loan {
            id: 1,
            user_id: 1,
            book_id: 1,
            borrow_date: now - Duration::days(7),
            due_date: now + due_in,
            return_date: None,
            status,
        }
    }

    #[test]
    fn test_borrowed_past_due_is_overdue() {
        let l = loan(LoanStatus::Borrowed, Duration::days(-1));
        assert!(l.is_overdue_at(Utc::now()));
    }

    #[test]
    fn test_borrowed_before_due_is_not_overdue() {
        let l = loan(LoanStatus::Borrowed, Duration::days(1));
        assert!(!l.is_overdue_at(Utc::now()));
    }

    #[test]
    fn test_terminal_states_are_never_computed_overdue() {
        let l = loan(LoanStatus::Returned, Duration::days(-10));
        assert!(!l.is_overdue_at(Utc::now()));
        let l = loan(LoanStatus::Overdue, Duration::days(-10));
        assert!(!l.is_overdue_at(Utc::now()));
    }
}
