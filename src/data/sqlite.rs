use crate::domain::error::DomainError;
use crate::domain::models::{
    Account, AccountChanges, AccountFilter, AccountListItem, AccountReport, Category,
    CategoryChanges, CategoryFilter, GraphBucket, NewAccount, NewCategory, TransactionType,
};
use crate::domain::repository::{AccountRepository, CategoryRepository, UserRepository};
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, instrument};

const USER_COLUMNS: &str = "id, username, password_hash, created_at";
const CATEGORY_COLUMNS: &str = "id, user_id, title, type, description, created_at";
const ACCOUNT_COLUMNS: &str =
    "id, user_id, category_id, title, type, description, value, date, created_at";

/// SQL-backed store for users, categories and accounts.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens (creating if needed) the database and applies pending migrations.
    ///
    /// `sqlite::memory:` is pinned to a single long-lived connection, since every
    /// new connection to it would see an empty database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<std::time::Duration>)
                .max_lifetime(None::<std::time::Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(database_url = %database_url, "Database ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserRepository for SqliteRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    anyhow::Error::from(DomainError::Validation(format!(
                        "username {} is already taken",
                        user.username
                    )))
                }
                _ => anyhow::Error::from(e),
            })?;
        debug!(user_id = created.id, "User inserted");
        Ok(created)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl CategoryRepository for SqliteRepository {
    #[instrument(skip(self, category), fields(user_id = category.user_id))]
    async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let sql = format!(
            "INSERT INTO categories (user_id, title, type, description, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {CATEGORY_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Category>(&sql)
            .bind(category.user_id)
            .bind(&category.title)
            .bind(category.kind)
            .bind(&category.description)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        debug!(category_id = created.id, "Category inserted");
        Ok(created)
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_category(&self, id: i64, changes: CategoryChanges) -> Result<Option<Category>> {
        let sql = format!(
            "UPDATE categories SET title = ?, description = ? WHERE id = ? \
             RETURNING {CATEGORY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: i64) -> Result<bool> {
        // accounts.category_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE user_id = ?1 AND type = ?2 \
               AND (?3 IS NULL OR instr(title, ?3) > 0) \
               AND (?4 IS NULL OR instr(description, ?4) > 0) \
             ORDER BY id"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(filter.user_id)
            .bind(filter.kind)
            .bind(filter.title.as_deref())
            .bind(filter.description.as_deref())
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    #[instrument(skip(self, account), fields(user_id = account.user_id, category_id = account.category_id))]
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let sql = format!(
            "INSERT INTO accounts (user_id, category_id, title, type, description, value, date, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {ACCOUNT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Account>(&sql)
            .bind(account.user_id)
            .bind(account.category_id)
            .bind(&account.title)
            .bind(account.kind)
            .bind(&account.description)
            .bind(account.value)
            .bind(account.date)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        debug!(account_id = created.id, "Account inserted");
        Ok(created)
    }

    async fn find_account(&self, id: i64) -> Result<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?");
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_account(&self, id: i64, changes: AccountChanges) -> Result<Option<Account>> {
        let sql = format!(
            "UPDATE accounts SET \
               title = COALESCE(?1, title), \
               description = COALESCE(?2, description), \
               value = COALESCE(?3, value) \
             WHERE id = ?4 RETURNING {ACCOUNT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.value)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<AccountListItem>> {
        let sql = "SELECT a.id AS id, a.user_id AS user_id, a.category_id AS category_id, \
                          a.title AS title, a.type AS type, a.description AS description, \
                          a.value AS value, a.date AS date, a.created_at AS created_at, \
                          c.title AS category_title \
                   FROM accounts a \
                   JOIN categories c ON c.id = a.category_id \
                   WHERE a.user_id = ?1 AND a.type = ?2 \
                     AND (?3 IS NULL OR a.category_id = ?3) \
                     AND (?4 IS NULL OR instr(a.title, ?4) > 0) \
                     AND (?5 IS NULL OR instr(a.description, ?5) > 0) \
                     AND (?6 IS NULL OR a.date = ?6) \
                   ORDER BY a.id";
        Ok(sqlx::query_as::<_, AccountListItem>(sql)
            .bind(filter.user_id)
            .bind(filter.kind)
            .bind(filter.category_id)
            .bind(filter.title.as_deref())
            .bind(filter.description.as_deref())
            .bind(filter.date)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn account_graph(
        &self,
        user_id: i64,
        kind: TransactionType,
    ) -> Result<Vec<GraphBucket>> {
        let sql = "SELECT strftime('%Y-%m', date) AS period, \
                          SUM(value) AS total, \
                          COUNT(*) AS count \
                   FROM accounts \
                   WHERE user_id = ? AND type = ? \
                   GROUP BY period \
                   ORDER BY period";
        Ok(sqlx::query_as::<_, GraphBucket>(sql)
            .bind(user_id)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn account_report(&self, user_id: i64, kind: TransactionType) -> Result<AccountReport> {
        let (total, count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(value), 0), COUNT(*) FROM accounts WHERE user_id = ? AND type = ?",
        )
        .bind(user_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;
        Ok(AccountReport { kind, total, count })
    }
}
