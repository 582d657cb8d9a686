use crate::domain::models::{
    Account, AccountChanges, AccountFilter, AccountListItem, AccountReport, Category,
    CategoryChanges, CategoryFilter, GraphBucket, NewAccount, NewCategory, TransactionType,
};
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> Result<Category>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>>;
    /// Returns `None` when no category has this id.
    async fn update_category(&self, id: i64, changes: CategoryChanges) -> Result<Option<Category>>;
    /// Removes the category and every account filed under it.
    async fn delete_category(&self, id: i64) -> Result<bool>;
    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create_account(&self, account: NewAccount) -> Result<Account>;
    async fn find_account(&self, id: i64) -> Result<Option<Account>>;
    async fn update_account(&self, id: i64, changes: AccountChanges) -> Result<Option<Account>>;
    async fn delete_account(&self, id: i64) -> Result<bool>;
    async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<AccountListItem>>;
    async fn account_graph(&self, user_id: i64, kind: TransactionType)
    -> Result<Vec<GraphBucket>>;
    async fn account_report(&self, user_id: i64, kind: TransactionType) -> Result<AccountReport>;
}
