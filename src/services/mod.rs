//! Business logic services

pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod loans;
pub mod publishers;
pub mod reports;
pub mod reviews;
pub mod search;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub authors: authors::AuthorsService,
    pub categories: categories::CategoriesService,
    pub publishers: publishers::PublishersService,
    pub loans: loans::LoansService,
    pub reviews: reviews::ReviewsService,
    pub search: search::SearchService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            books: books::BooksService::new(repository.clone()),
            authors: authors::AuthorsService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            publishers: publishers::PublishersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            reviews: reviews::ReviewsService::new(repository.clone()),
            search: search::SearchService::new(repository.clone()),
            reports: reports::ReportsService::new(repository),
        }
    }
}
