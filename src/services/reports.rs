//! Reporting service: dashboard, loan activity, review reports

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    api::reports::{DashboardStatistics, LoanReport, ReviewReport},
    error::AppResult,
    models::enums::LoanStatus,
    repository::Repository,
};

const TOP_BOOKS_SIZE: i64 = 5;
const MIN_RATING_TOP_BOOKS: f64 = 4.0;

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Overall dashboard counters plus the most-borrowed ranking
    pub async fn dashboard(&self) -> AppResult<DashboardStatistics> {
        let total_books = self.repository.books.count().await?;
        let total_users = self.repository.users.count().await?;
        let active_loans = self
            .repository
            .loans
            .count_by_status(LoanStatus::Borrowed)
            .await?;
        let overdue_loans = self
            .repository
            .loans
            .count_by_status(LoanStatus::Overdue)
            .await?;
        let most_borrowed_books = self.repository.books.most_borrowed(TOP_BOOKS_SIZE).await?;

        Ok(DashboardStatistics {
            total_books,
            total_users,
            active_loans,
            overdue_loans,
            most_borrowed_books,
        })
    }

    /// Borrow/return activity over a date range, grouped per day
    pub async fn loan_report(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> AppResult<LoanReport> {
        let loans = self.repository.loans.list_in_range(start_date, end_date).await?;
        let stats = self
            .repository
            .loans
            .statistics(Some(start_date), Some(end_date))
            .await?;

        let mut borrows_by_date: BTreeMap<String, i64> = BTreeMap::new();
        let mut returns_by_date: BTreeMap<String, i64> = BTreeMap::new();

        for loan in &loans {
            *borrows_by_date
                .entry(format_day(loan.borrow_date.date_naive()))
                .or_insert(0) += 1;
            if let Some(returned) = loan.return_date {
                *returns_by_date
                    .entry(format_day(returned.date_naive()))
                    .or_insert(0) += 1;
            }
        }

        Ok(LoanReport {
            start_date,
            end_date,
            total_borrows: stats.total_borrowed,
            total_returns: stats.total_returned,
            borrows_by_date,
            returns_by_date,
        })
    }

    /// Per-book rating report, or the top-rated ranking when no book is
    /// given
    pub async fn review_report(&self, book_id: Option<i64>) -> AppResult<ReviewReport> {
        if let Some(book_id) = book_id {
            let book = self.repository.books.get_by_id(book_id).await?;
            let (average_rating, total_reviews) =
                self.repository.reviews.average_rating(book_id).await?;

            let rating_distribution: BTreeMap<String, i64> = self
                .repository
                .reviews
                .rating_distribution(book_id)
                .await?
                .into_iter()
                .map(|(rating, count)| (rating.to_string(), count))
                .collect();

            return Ok(ReviewReport {
                book_id: Some(book_id),
                book_title: Some(book.title),
                rating_distribution,
                average_rating,
                total_reviews,
                top_rated_books: Vec::new(),
            });
        }

        let top_rated_books = self
            .repository
            .books
            .top_rated(MIN_RATING_TOP_BOOKS, TOP_BOOKS_SIZE)
            .await?;

        Ok(ReviewReport {
            book_id: None,
            book_title: None,
            rating_distribution: BTreeMap::new(),
            average_rating: 0.0,
            total_reviews: 0,
            top_rated_books,
        })
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
