//! Publisher catalog service

use crate::{
    error::{AppError, AppResult},
    models::publisher::{CreatePublisher, Publisher, UpdatePublisher},
    repository::Repository,
};

#[derive(Clone)]
pub struct PublishersService {
    repository: Repository,
}

impl PublishersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, request: CreatePublisher) -> AppResult<Publisher> {
        if self.repository.publishers.name_exists(&request.name, None).await? {
            return Err(AppError::Duplicate(format!(
                "Publisher with name '{}' already exists",
                request.name
            )));
        }
        self.repository.publishers.create(&request).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await
    }

    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<Publisher>, i64)> {
        self.repository
            .publishers
            .list(page.max(1), per_page.clamp(1, 100))
            .await
    }

    pub async fn update(&self, id: i64, request: UpdatePublisher) -> AppResult<Publisher> {
        self.repository.publishers.get_by_id(id).await?;

        if let Some(ref name) = request.name {
            if self.repository.publishers.name_exists(name, Some(id)).await? {
                return Err(AppError::Duplicate(format!(
                    "Publisher with name '{}' already exists",
                    name
                )));
            }
        }

        self.repository
            .publishers
            .update(
                id,
                request.name.as_deref(),
                request.website.as_deref(),
                request.address.as_deref(),
            )
            .await
    }

    /// Delete a publisher; blocked while any book references it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.publishers.get_by_id(id).await?;

        if self.repository.books.count_by_publisher(id).await? > 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete publisher with id {} because it has associated books",
                id
            )));
        }

        self.repository.publishers.delete(id).await
    }
}
