use crate::domain::error::DomainError;
use crate::domain::models::{Account, AccountListItem, AccountReport, GraphBucket, NewAccount};
use crate::domain::repository::{AccountRepository, CategoryRepository};
use crate::domain::requests::{AccountQuery, CreateAccount, TypeQuery, UpdateAccount};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            accounts,
            categories,
        }
    }

    /// Records a transaction under one of the caller's categories.
    ///
    /// The account type must equal the category type; a mismatch is rejected
    /// before anything is written.
    #[instrument(skip(self, req), fields(category_id = req.category_id))]
    pub async fn create_account(&self, user_id: i64, req: CreateAccount) -> Result<Account> {
        req.validate()?;

        let category = self
            .categories
            .find_category(req.category_id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| {
                DomainError::NotFound(format!("Category {} not found", req.category_id))
            })?;

        if category.kind != req.kind {
            warn!(
                account_type = %req.kind,
                category_type = %category.kind,
                "Account type differs from category type"
            );
            return Err(DomainError::TypeMismatch {
                account: req.kind.to_string(),
                category: category.kind.to_string(),
            }
            .into());
        }

        let account = self
            .accounts
            .create_account(NewAccount {
                user_id: category.user_id,
                category_id: category.id,
                title: req.title,
                kind: req.kind,
                description: req.description,
                value: req.value,
                date: req.date,
            })
            .await?;

        info!(account_id = account.id, value = account.value, "Account created");
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn get_account(&self, user_id: i64, id: i64) -> Result<Account> {
        self.accounts
            .find_account(id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self, req))]
    pub async fn update_account(
        &self,
        user_id: i64,
        id: i64,
        req: UpdateAccount,
    ) -> Result<Account> {
        req.validate()?;
        self.get_account(user_id, id).await?;
        let account = self
            .accounts
            .update_account(id, req.into())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(account_id = id, "Account updated");
        Ok(account)
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: i64, id: i64) -> Result<()> {
        self.get_account(user_id, id).await?;
        if !self.accounts.delete_account(id).await? {
            return Err(not_found(id));
        }
        info!(account_id = id, "Account deleted");
        Ok(())
    }

    #[instrument(skip(self, query))]
    pub async fn list_accounts(
        &self,
        user_id: i64,
        query: AccountQuery,
    ) -> Result<Vec<AccountListItem>> {
        let items = self
            .accounts
            .list_accounts(&query.into_filter(user_id))
            .await?;
        debug!(count = items.len(), "Accounts listed");
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn account_graph(&self, user_id: i64, query: TypeQuery) -> Result<Vec<GraphBucket>> {
        self.accounts.account_graph(user_id, query.kind).await
    }

    #[instrument(skip(self))]
    pub async fn account_report(&self, user_id: i64, query: TypeQuery) -> Result<AccountReport> {
        self.accounts.account_report(user_id, query.kind).await
    }
}

fn not_found(id: i64) -> anyhow::Error {
    DomainError::NotFound(format!("Account {id} not found")).into()
}
