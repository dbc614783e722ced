// ABOUTME: Backend abstraction over the hosted auth provider, REST datastore, and functions gateway
// ABOUTME: Services depend on these traits; the Supabase client is the production implementation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Backend seams
//!
//! Three traits cover everything the server asks of the hosted backend:
//!
//! - [`AuthProvider`] resolves a bearer token to a user.
//! - [`DataStore`] reads and writes rows with the caller's token, so row-level
//!   security is enforced by the datastore itself.
//! - [`FunctionInvoker`] calls remote functions through the gateway.

/// Supabase implementation of the backend traits
pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

pub use supabase::SupabaseClient;

/// User resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Auth user id (UUID)
    pub id: String,
    /// Account email
    #[serde(default)]
    pub email: Option<String>,
    /// Token the user authenticated with, forwarded to the datastore
    #[serde(skip)]
    pub access_token: String,
}

/// Resolves bearer tokens to users
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Look up the user owning `access_token`
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` when the token is rejected, or a service error when
    /// the provider cannot be reached
    async fn get_user(&self, access_token: &str) -> AppResult<AuthenticatedUser>;
}

/// Row filter rendered as a `column=operator.value` query pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq(String, String),
    /// `column >= value`
    Gte(String, String),
    /// `column <= value`
    Lte(String, String),
    /// `column IN (values)`
    In(String, Vec<String>),
}

impl Filter {
    /// Query pair for this filter
    #[must_use]
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Self::Eq(column, value) => (column.clone(), format!("eq.{value}")),
            Self::Gte(column, value) => (column.clone(), format!("gte.{value}")),
            Self::Lte(column, value) => (column.clone(), format!("lte.{value}")),
            Self::In(column, values) => {
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
                    .collect();
                (column.clone(), format!("in.({})", quoted.join(",")))
            }
        }
    }
}

/// Target rows of a select or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    /// Table name
    pub table: String,
    /// Column list, including embedded relations
    pub columns: String,
    /// Conjunctive filters
    pub filters: Vec<Filter>,
    /// Ordering, e.g. `session_date.desc`
    pub order: Option<String>,
    /// Rows skipped before the first returned row
    pub offset: Option<usize>,
    /// Maximum rows returned
    pub limit: Option<usize>,
}

impl RowQuery {
    /// All columns of `table`
    #[must_use]
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_owned(),
            columns: "*".to_owned(),
            filters: Vec::new(),
            order: None,
            offset: None,
            limit: None,
        }
    }

    /// Restrict the returned columns
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("");
        self
    }

    /// Add an equality filter
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Eq(column.to_owned(), value.to_string()));
        self
    }

    /// Add a lower-bound filter
    #[must_use]
    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Gte(column.to_owned(), value.to_string()));
        self
    }

    /// Add an upper-bound filter
    #[must_use]
    pub fn lte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Lte(column.to_owned(), value.to_string()));
        self
    }

    /// Add a membership filter
    #[must_use]
    pub fn is_in(mut self, column: &str, values: &[String]) -> Self {
        self.filters
            .push(Filter::In(column.to_owned(), values.to_vec()));
        self
    }

    /// Order the result
    #[must_use]
    pub fn order(mut self, order: &str) -> Self {
        self.order = Some(order.to_owned());
        self
    }

    /// Skip the first `offset` rows
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Cap the number of rows
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query pairs sent to the REST datastore
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_owned(), self.columns.clone())];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if let Some(order) = &self.order {
            pairs.push(("order".to_owned(), order.clone()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_owned(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }
        pairs
    }

    /// Whether a row satisfies every filter of this query
    ///
    /// Used by in-process datastores; values are compared by their string form.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        let text = |column: &str| {
            row.get(column).and_then(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
        };
        self.filters.iter().all(|filter| match filter {
            Filter::Eq(column, value) => text(column).as_deref() == Some(value.as_str()),
            Filter::Gte(column, value) => text(column).is_some_and(|v| v.as_str() >= value.as_str()),
            Filter::Lte(column, value) => text(column).is_some_and(|v| v.as_str() <= value.as_str()),
            Filter::In(column, values) => text(column).is_some_and(|v| values.contains(&v)),
        })
    }
}

/// Row-level access to the hosted datastore
///
/// Every call carries the end user's token; writes return the written rows.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows matching `query`
    ///
    /// # Errors
    ///
    /// Returns the datastore error, or a service error when it cannot be reached
    async fn select(&self, access_token: &str, query: &RowQuery) -> AppResult<Vec<Value>>;

    /// Apply `patch` to the rows matching `query`, returning the updated rows
    ///
    /// # Errors
    ///
    /// Returns the datastore error, or a service error when it cannot be reached
    async fn update(
        &self,
        access_token: &str,
        query: &RowQuery,
        patch: &Value,
    ) -> AppResult<Vec<Value>>;

    /// Insert one row or an array of rows
    ///
    /// # Errors
    ///
    /// Returns the datastore error, or a service error when it cannot be reached
    async fn insert(&self, access_token: &str, table: &str, rows: &Value) -> AppResult<Vec<Value>>;

    /// Insert or merge rows, resolving conflicts on `on_conflict` columns
    ///
    /// # Errors
    ///
    /// Returns the datastore error, or a service error when it cannot be reached
    async fn upsert(
        &self,
        access_token: &str,
        table: &str,
        rows: &Value,
        on_conflict: Option<&str>,
    ) -> AppResult<Vec<Value>>;

    /// Call a datastore function
    ///
    /// # Errors
    ///
    /// Returns the datastore error, or a service error when it cannot be reached
    async fn rpc(&self, access_token: &str, function: &str, args: &Value) -> AppResult<Value>;
}

/// Remote function gateway
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// POST `body` to function `name` with `bearer` as credential; a null `body` sends none
    ///
    /// # Errors
    ///
    /// Non-2xx responses are `ExternalServiceError` carrying the response text
    async fn invoke(&self, name: &str, bearer: &str, body: &Value) -> AppResult<Value>;
}

/// Exactly-one-row view of a result set
///
/// # Errors
///
/// Returns `ResourceNotFound` when `rows` is empty
pub fn single(rows: Vec<Value>, resource: &str) -> AppResult<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(resource))
}

/// Zero-or-one-row view of a result set
#[must_use]
pub fn maybe_single(rows: Vec<Value>) -> Option<Value> {
    rows.into_iter().next()
}
