//! Inbound payloads as bound from HTTP bodies and query strings.
//!
//! Each payload validates its own required fields before any store call and
//! converts into the store-level parameter type once the owner is known.

use crate::domain::error::DomainError;
use crate::domain::models::{
    AccountChanges, AccountFilter, CategoryChanges, CategoryFilter, NewCategory, TransactionType,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt::Display;
use std::str::FromStr;

fn require_non_blank(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_positive_id(field: &str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation(format!("{field} must be a positive id")));
    }
    Ok(())
}

// An empty filter string means "no constraint", same as an absent one.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// Typed query filters: `category_id=` or `date=` bind as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(de::Error::custom)
        }
        _ => Ok(None),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCategory {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_blank("title", &self.title)
    }

    pub fn into_new(self, user_id: i64) -> NewCategory {
        NewCategory {
            user_id,
            title: self.title,
            kind: self.kind,
            description: self.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub title: String,
    pub description: String,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_blank("title", &self.title)
    }
}

impl From<UpdateCategory> for CategoryChanges {
    fn from(req: UpdateCategory) -> Self {
        Self {
            title: req.title,
            description: req.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CategoryQuery {
    pub fn into_filter(self, user_id: i64) -> CategoryFilter {
        CategoryFilter {
            user_id,
            kind: self.kind,
            title: non_empty(self.title),
            description: non_empty(self.description),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccount {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub category_id: i64,
    pub date: NaiveDate,
    pub value: i32,
}

impl CreateAccount {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_blank("title", &self.title)?;
        require_positive_id("category_id", self.category_id)
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateAccount {
    pub title: Option<String>,
    pub description: Option<String>,
    pub value: Option<i32>,
}

impl UpdateAccount {
    pub fn validate(&self) -> Result<(), DomainError> {
        match &self.title {
            Some(title) => require_non_blank("title", title),
            None => Ok(()),
        }
    }
}

impl From<UpdateAccount> for AccountChanges {
    fn from(req: UpdateAccount) -> Self {
        Self {
            title: req.title,
            description: req.description,
            value: req.value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountQuery {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category_id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<NaiveDate>,
}

impl AccountQuery {
    /// A `category_id` of zero or below is no constraint.
    pub fn into_filter(self, user_id: i64) -> AccountFilter {
        AccountFilter {
            user_id,
            kind: self.kind,
            category_id: self.category_id.filter(|id| *id > 0),
            title: non_empty(self.title),
            description: non_empty(self.description),
            date: self.date,
        }
    }
}

/// Input of the graph and report aggregates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TypeQuery {
    #[serde(rename = "type")]
    pub kind: TransactionType,
}
