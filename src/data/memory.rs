use crate::domain::models::{
    Account, AccountChanges, AccountFilter, AccountListItem, AccountReport, Category,
    CategoryChanges, CategoryFilter, GraphBucket, NewAccount, NewCategory, TransactionType,
};
use crate::domain::repository::{AccountRepository, CategoryRepository};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Default)]
struct Ledger {
    categories: HashMap<i64, Category>,
    accounts: HashMap<i64, Account>,
    last_category_id: i64,
    last_account_id: i64,
}

/// Categories and accounts share one lock so a category delete can take its
/// accounts with it atomically.
#[derive(Clone)]
pub struct InMemoryLedgerRepository {
    storage: Arc<RwLock<Ledger>>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(Ledger::default())),
        }
    }
}

impl Default for InMemoryLedgerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryLedgerRepository {
    #[instrument(skip(self, category), fields(user_id = category.user_id))]
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let mut storage = self.storage.write().await;
        storage.last_category_id += 1;
        let category = Category {
            id: storage.last_category_id,
            user_id: category.user_id,
            title: category.title,
            kind: category.kind,
            description: category.description,
            created_at: Utc::now(),
        };
        storage.categories.insert(category.id, category.clone());
        debug!(category_id = category.id, "Category saved to memory storage");
        Ok(category)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>> {
        let storage = self.storage.read().await;
        Ok(storage.categories.get(&id).cloned())
    }

    async fn update_category(&self, id: i64, changes: CategoryChanges) -> Result<Option<Category>> {
        let mut storage = self.storage.write().await;
        Ok(storage.categories.get_mut(&id).map(|category| {
            category.title = changes.title;
            category.description = changes.description;
            category.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: i64) -> Result<bool> {
        let mut storage = self.storage.write().await;
        if storage.categories.remove(&id).is_none() {
            return Ok(false);
        }
        let before = storage.accounts.len();
        storage.accounts.retain(|_, account| account.category_id != id);
        debug!(
            category_id = id,
            removed_accounts = before - storage.accounts.len(),
            "Category deleted from memory storage"
        );
        Ok(true)
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let storage = self.storage.read().await;
        let mut categories: Vec<Category> = storage
            .categories
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.id);
        trace!(count = categories.len(), "Listed categories");
        Ok(categories)
    }
}

#[async_trait]
impl AccountRepository for InMemoryLedgerRepository {
    #[instrument(skip(self, account), fields(user_id = account.user_id, category_id = account.category_id))]
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut storage = self.storage.write().await;
        storage.last_account_id += 1;
        let account = Account {
            id: storage.last_account_id,
            user_id: account.user_id,
            category_id: account.category_id,
            title: account.title,
            kind: account.kind,
            description: account.description,
            value: account.value,
            date: account.date,
            created_at: Utc::now(),
        };
        storage.accounts.insert(account.id, account.clone());
        debug!(account_id = account.id, "Account saved to memory storage");
        Ok(account)
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>> {
        let storage = self.storage.read().await;
        Ok(storage.accounts.get(&id).cloned())
    }

    async fn update_account(&self, id: i64, changes: AccountChanges) -> Result<Option<Account>> {
        let mut storage = self.storage.write().await;
        Ok(storage.accounts.get_mut(&id).map(|account| {
            changes.apply(account);
            account.clone()
        }))
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        let mut storage = self.storage.write().await;
        Ok(storage.accounts.remove(&id).is_some())
    }

    async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<AccountListItem>> {
        let storage = self.storage.read().await;
        let mut items: Vec<AccountListItem> = storage
            .accounts
            .values()
            .filter(|a| filter.matches(a))
            .filter_map(|a| {
                storage
                    .categories
                    .get(&a.category_id)
                    .map(|c| AccountListItem {
                        account: a.clone(),
                        category_title: c.title.clone(),
                    })
            })
            .collect();
        items.sort_by_key(|item| item.account.id);
        Ok(items)
    }

    async fn account_graph(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> Result<Vec<GraphBucket>> {
        let storage = self.storage.read().await;
        let mut buckets: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for account in storage
            .accounts
            .values()
            .filter(|a| a.user_id == user_id && a.kind == kind)
        {
            let bucket = buckets
                .entry(account.date.format("%Y-%m").to_string())
                .or_default();
            bucket.0 += i64::from(account.value);
            bucket.1 += 1;
        }
        Ok(buckets
            .into_iter()
            .map(|(period, (total, count))| GraphBucket {
                period,
                total,
                count,
            })
            .collect())
    }

    async fn account_report(&self, user_id: i64, kind: TransactionType) -> Result<AccountReport> {
        let storage = self.storage.read().await;
        let (total, count) = storage
            .accounts
            .values()
            .filter(|a| a.user_id == user_id && a.kind == kind)
            .fold((0i64, 0i64), |(total, count), a| {
                (total + i64::from(a.value), count + 1)
            });
        Ok(AccountReport { kind, total, count })
    }
}
