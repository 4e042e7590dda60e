//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, categories, health, loans, publishers, reports, reviews, search, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Alexandria API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Alexandria Team", email = "contact@alexandria.local")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Categories
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        // Publishers
        publishers::list_publishers,
        publishers::get_publisher,
        publishers::create_publisher,
        publishers::update_publisher,
        publishers::delete_publisher,
        // Users
        users::list_users,
        users::get_user,
        users::update_user,
        users::change_password,
        users::update_user_status,
        users::update_user_role,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::renew_loan,
        loans::list_loans,
        loans::list_overdue_loans,
        loans::loan_statistics,
        loans::get_loan,
        loans::get_user_loans,
        loans::get_user_active_loans,
        // Reviews
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        reviews::get_book_reviews,
        reviews::get_user_reviews,
        reviews::get_average_rating,
        // Search
        search::search_books,
        search::advanced_search,
        // Reports
        reports::dashboard,
        reports::loan_report,
        reports::review_report,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserQuery,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateUser,
            crate::models::user::ChangePassword,
            crate::models::user::UpdateUserStatus,
            crate::models::user::UpdateUserRole,
            crate::models::enums::UserRole,
            crate::models::enums::UserStatus,
            crate::models::enums::LoanStatus,
            // Books
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::ReviewSummary,
            crate::models::book::BookSearchQuery,
            crate::models::book::AdvancedSearchQuery,
            // Authors
            crate::models::author::Author,
            crate::models::author::CreateAuthor,
            crate::models::author::UpdateAuthor,
            // Categories
            crate::models::category::Category,
            crate::models::category::CreateCategory,
            crate::models::category::UpdateCategory,
            // Publishers
            crate::models::publisher::Publisher,
            crate::models::publisher::CreatePublisher,
            crate::models::publisher::UpdatePublisher,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::RenewLoan,
            crate::models::loan::LoanQuery,
            crate::models::loan::LoanStatistics,
            loans::OverdueQuery,
            loans::StatisticsQuery,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            crate::models::review::UpdateReview,
            crate::models::review::AverageRating,
            // Pagination
            books::PageQuery,
            books::PaginatedBooks,
            books::PaginatedUsers,
            books::PaginatedAuthors,
            books::PaginatedCategories,
            books::PaginatedPublishers,
            books::PaginatedLoans,
            books::PaginatedReviews,
            // Reports
            reports::DashboardStatistics,
            reports::LoanReport,
            reports::ReviewReport,
            reports::LoanReportQuery,
            reports::ReviewReportQuery,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "authors", description = "Author catalog management"),
        (name = "categories", description = "Category catalog management"),
        (name = "publishers", description = "Publisher catalog management"),
        (name = "users", description = "User management"),
        (name = "loans", description = "Loan management"),
        (name = "reviews", description = "Book reviews and ratings"),
        (name = "search", description = "Catalog search"),
        (name = "reports", description = "Reporting")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
