//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LoanStatus,
        loan::{Loan, LoanDetails, LoanQuery, LoanStatistics},
    },
};

/// Partial unique index enforcing at most one BORROWED loan per book
const ONE_ACTIVE_PER_BOOK: &str = "loans_one_active_per_book";

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.full_name AS user_name,
           l.book_id, b.title AS book_title,
           l.borrow_date, l.due_date, l.return_date, l.status,
           (l.status = 'BORROWED' AND l.due_date < NOW()) AS is_overdue
    FROM loans l
    JOIN users u ON u.id = l.user_id
    JOIN books b ON b.id = l.book_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan with user and book names
    pub async fn get_details(&self, id: i64) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, LoanDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Create a loan. The availability check runs inside a transaction and
    /// the partial unique index backstops the check-then-insert race: if two
    /// borrows pass the check concurrently, exactly one insert commits and
    /// the loser surfaces the same "currently borrowed" violation.
    pub async fn create(
        &self,
        user_id: i64,
        book_id: i64,
        due_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND status = 'BORROWED')",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::BusinessRule(
                "Book is currently borrowed by another user".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, borrow_date, due_date, status)
            VALUES ($1, $2, NOW(), $3, 'BORROWED')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some(ONE_ACTIVE_PER_BOOK) => {
                AppError::BusinessRule(
                    "Book is currently borrowed by another user".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Record a return: stamps return_date and flips status to RETURNED or
    /// OVERDUE depending on the due date.
    pub async fn mark_returned(
        &self,
        id: i64,
        return_date: DateTime<Utc>,
        status: LoanStatus,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "UPDATE loans SET return_date = $2, status = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(return_date)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Extend the due date of an active loan
    pub async fn update_due_date(&self, id: i64, due_date: DateTime<Utc>) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "UPDATE loans SET due_date = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List loans with optional status/user/book filters and pagination
    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let filter = r#"
            WHERE ($1::text IS NULL OR l.status = $1)
              AND ($2::bigint IS NULL OR l.user_id = $2)
              AND ($3::bigint IS NULL OR l.book_id = $3)
        "#;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM loans l {}",
            filter
        ))
        .bind(query.status)
        .bind(query.user_id)
        .bind(query.book_id)
        .fetch_one(&self.pool)
        .await?;

        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} {} ORDER BY l.borrow_date DESC LIMIT $4 OFFSET $5",
            DETAILS_SELECT, filter
        ))
        .bind(query.status)
        .bind(query.user_id)
        .bind(query.book_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((loans, total))
    }

    /// All loans for a user, newest first
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE l.user_id = $1 ORDER BY l.borrow_date DESC",
            DETAILS_SELECT
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Active (BORROWED) loans for a user
    pub async fn list_active_by_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE l.user_id = $1 AND l.status = 'BORROWED' ORDER BY l.due_date",
            DETAILS_SELECT
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Computed-overdue loans: still BORROWED and past due, the stored
    /// status has not flipped. Optionally restricted to one user.
    pub async fn list_overdue(&self, user_id: Option<i64>) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            r#"{} WHERE l.status = 'BORROWED' AND l.due_date < NOW()
               AND ($1::bigint IS NULL OR l.user_id = $1)
               ORDER BY l.due_date"#,
            DETAILS_SELECT
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Whether the book has an active loan
    pub async fn has_active_loan(&self, book_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND status = 'BORROWED')",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Count loans in a given status (dashboard)
    pub async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Borrow/return statistics over the borrow_date population of a range
    pub async fn statistics(
        &self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> AppResult<LoanStatistics> {
        let range_filter = r#"
            ($1::timestamptz IS NULL OR borrow_date >= $1)
            AND ($2::timestamptz IS NULL OR borrow_date <= $2)
        "#;

        let total_borrowed: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM loans WHERE {}",
            range_filter
        ))
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        let total_returned: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM loans WHERE {} AND status = 'RETURNED'",
            range_filter
        ))
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        let total_overdue: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM loans WHERE {} AND status = 'OVERDUE'",
            range_filter
        ))
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(LoanStatistics {
            total_borrowed,
            total_returned,
            total_overdue,
        })
    }

    /// Loans whose borrow_date falls in the range, for the loan report
    pub async fn list_in_range(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE borrow_date >= $1 AND borrow_date <= $2 ORDER BY borrow_date",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}
