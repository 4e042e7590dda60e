//! Category catalog service

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CreateCategory, UpdateCategory},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, request: CreateCategory) -> AppResult<Category> {
        if self.repository.categories.name_exists(&request.name, None).await? {
            return Err(AppError::Duplicate(format!(
                "Category with name '{}' already exists",
                request.name
            )));
        }
        self.repository.categories.create(&request).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    pub async fn list(&self, page: i64, per_page: i64) -> AppResult<(Vec<Category>, i64)> {
        self.repository
            .categories
            .list(page.max(1), per_page.clamp(1, 100))
            .await
    }

    pub async fn update(&self, id: i64, request: UpdateCategory) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await?;

        if let Some(ref name) = request.name {
            if self.repository.categories.name_exists(name, Some(id)).await? {
                return Err(AppError::Duplicate(format!(
                    "Category with name '{}' already exists",
                    name
                )));
            }
        }

        self.repository
            .categories
            .update(id, request.name.as_deref(), request.description.as_deref())
            .await
    }

    /// Delete a category; blocked while any book is linked to it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.categories.get_by_id(id).await?;

        if self.repository.books.count_by_category(id).await? > 0 {
            return Err(AppError::BusinessRule(format!(
                "Cannot delete category with id {} because it has associated books",
                id
            )));
        }

        self.repository.categories.delete(id).await
    }
}
