use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of money movement. Categories and their accounts share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub user_id: i64,
    pub title: String,
    pub kind: TransactionType,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CategoryChanges {
    pub title: String,
    pub description: String,
}

/// Listing criteria. `None` fields do not constrain the result.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pub user_id: i64,
    pub kind: TransactionType,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CategoryFilter {
    pub fn matches(&self, category: &Category) -> bool {
        category.user_id == self.user_id
            && category.kind == self.kind
            && contains_opt(&category.title, self.title.as_deref())
            && contains_opt(&category.description, self.description.as_deref())
    }
}

/// A single transaction record filed under a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    /// Signed amount in minor currency units.
    pub value: i32,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub kind: TransactionType,
    pub description: String,
    pub value: i32,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub value: Option<i32>,
}

impl AccountChanges {
    pub fn apply(self, account: &mut Account) {
        if let Some(title) = self.title {
            account.title = title;
        }
        if let Some(description) = self.description {
            account.description = description;
        }
        if let Some(value) = self.value {
            account.value = value;
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountFilter {
    pub user_id: i64,
    pub kind: TransactionType,
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        account.user_id == self.user_id
            && account.kind == self.kind
            && self.category_id.is_none_or(|id| account.category_id == id)
            && contains_opt(&account.title, self.title.as_deref())
            && contains_opt(&account.description, self.description.as_deref())
            && self.date.is_none_or(|date| account.date == date)
    }
}

/// Listing row: the account plus the title of the category it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct AccountListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub account: Account,
    pub category_title: String,
}

/// Monthly bucket of the graph aggregate. `period` is `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct GraphBucket {
    pub period: String,
    pub total: i64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountReport {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub total: i64,
    pub count: i64,
}

fn contains_opt(haystack: &str, needle: Option<&str>) -> bool {
    needle.is_none_or(|needle| haystack.contains(needle))
}
