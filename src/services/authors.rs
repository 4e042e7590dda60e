//! Author catalog service

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, request: CreateAuthor) -> AppResult<Author> {
        self.repository.authors.create(&request).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await
    }

    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<Author>, i64)> {
        self.repository
            .authors
            .list(page.max(1), per_page.clamp(1, 100))
            .await
    }

    pub async fn update(&self, id: i64, request: UpdateAuthor) -> AppResult<Author> {
        self.repository.authors.get_by_id(id).await?;
        self.repository
            .authors
            .update(id, request.full_name.as_deref(), request.bio.as_deref())
            .await
    }

    /// Delete an author; blocked while any book references them
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.authors.get_by_id(id).await?;

        if self.repository.books.count_by_author(id).await? > 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete author with id {} because it has associated books",
                id
            )));
        }

        self.repository.authors.delete(id).await
    }
}
