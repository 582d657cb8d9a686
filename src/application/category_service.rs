use crate::domain::error::DomainError;
use crate::domain::models::Category;
use crate::domain::repository::CategoryRepository;
use crate::domain::requests::{CategoryQuery, CreateCategory, UpdateCategory};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req))]
    pub async fn create_category(&self, user_id: i64, req: CreateCategory) -> Result<Category> {
        req.validate()?;
        let category = self.repository.create_category(req.into_new(user_id)).await?;
        info!(category_id = category.id, kind = %category.kind, "Category created");
        Ok(category)
    }

    /// Fetches a category owned by `user_id`. Someone else's category is
    /// reported exactly like a missing one.
    #[instrument(skip(self))]
    pub async fn get_category(&self, user_id: i64, id: i64) -> Result<Category> {
        match self.repository.find_category(id).await? {
            Some(category) if category.user_id == user_id => Ok(category),
            Some(_) => {
                debug!(category_id = id, "Category belongs to another user");
                Err(not_found(id))
            }
            None => Err(not_found(id)),
        }
    }

    #[instrument(skip(self, req))]
    pub async fn update_category(
        &self,
        user_id: i64,
        id: i64,
        req: UpdateCategory,
    ) -> Result<Category> {
        req.validate()?;
        self.get_category(user_id, id).await?;
        let category = self
            .repository
            .update_category(id, req.into())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(category_id = id, "Category updated");
        Ok(category)
    }

    /// Deletes the category together with the accounts filed under it.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        self.get_category(user_id, id).await?;
        if !self.repository.delete_category(id).await? {
            return Err(not_found(id));
        }
        info!(category_id = id, "Category deleted");
        Ok(())
    }

    #[instrument(skip(self, query))]
    pub async fn list_categories(&self, user_id: i64, query: CategoryQuery) -> Result<Vec<Category>> {
        let categories = self
            .repository
            .list_categories(&query.into_filter(user_id))
            .await?;
        debug!(count = categories.len(), "Categories listed");
        Ok(categories)
    }
}

fn not_found(id: i64) -> anyhow::Error {
    DomainError::NotFound(format!("Category {id} not found")).into()
}
