// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides an in-memory backend standing in for the auth provider, datastore, and functions gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::significant_drop_tightening
)]
//! Shared test utilities for `bodyweight_server`
//!
//! [`InMemoryBackend`] keeps tables as vectors of JSON rows and applies
//! [`RowQuery`] filters with [`RowQuery::matches`]. Embedded relations are not
//! resolved: fixtures store them inline on the parent row.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::Router;
use bodyweight_server::{
    backend::{AuthProvider, AuthenticatedUser, DataStore, FunctionInvoker, RowQuery},
    config::{BackendConfig, Environment, HttpClientConfig, ServerConfig},
    errors::{AppError, AppResult},
    resources::ServerResources,
    server::build_router,
};
use serde_json::{Map, Value};

/// Token accepted for [`TEST_USER_ID`]
pub const TEST_TOKEN: &str = "user-token";
/// User owning [`TEST_TOKEN`]
pub const TEST_USER_ID: &str = "11111111-1111-1111-1111-111111111111";
/// Email of the test user
pub const TEST_EMAIL: &str = "athlete@example.com";
/// Service-role key configured by [`test_config`]
pub const SERVICE_ROLE_KEY: &str = "service-role-key";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

/// One call made through the functions gateway
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub bearer: String,
    pub body: Value,
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    failing_tables: HashSet<String>,
    rpc_results: HashMap<String, AppResult<Value>>,
    function_results: HashMap<String, AppResult<Value>>,
    function_calls: Vec<FunctionCall>,
}

/// In-memory implementation of every backend trait
#[derive(Default)]
pub struct InMemoryBackend {
    users: HashMap<String, AuthenticatedUser>,
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Backend knowing the default test user
    pub fn new() -> Self {
        Self::default().with_user(TEST_TOKEN, TEST_USER_ID, Some(TEST_EMAIL))
    }

    /// Accept `token` for `user_id`
    pub fn with_user(mut self, token: &str, user_id: &str, email: Option<&str>) -> Self {
        self.users.insert(
            token.to_owned(),
            AuthenticatedUser {
                id: user_id.to_owned(),
                email: email.map(str::to_owned),
                access_token: String::new(),
            },
        );
        self
    }

    /// Append rows to `table`
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.state
            .lock()
            .unwrap()
            .tables
            .entry(table.to_owned())
            .or_default()
            .extend(rows);
    }

    /// Every row currently in `table`
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every operation on `table` fail
    pub fn fail_table(&self, table: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_tables
            .insert(table.to_owned());
    }

    /// Result returned by datastore function `name`
    pub fn set_rpc_result(&self, name: &str, result: AppResult<Value>) {
        self.state
            .lock()
            .unwrap()
            .rpc_results
            .insert(name.to_owned(), result);
    }

    /// Result returned by remote function `name`
    pub fn set_function_result(&self, name: &str, result: AppResult<Value>) {
        self.state
            .lock()
            .unwrap()
            .function_results
            .insert(name.to_owned(), result);
    }

    /// Calls made through the functions gateway, oldest first
    pub fn function_calls(&self) -> Vec<FunctionCall> {
        self.state.lock().unwrap().function_calls.clone()
    }

    fn check_table(state: &State, table: &str) -> AppResult<()> {
        if state.failing_tables.contains(table) {
            return Err(AppError::database(format!("relation \"{table}\" is unavailable")));
        }
        Ok(())
    }
}

fn rows_of(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows.clone(),
        other => vec![other.clone()],
    }
}

/// Stable sort by `column.asc` or `column.desc`, comparing string forms
fn sort_rows(rows: &mut [Value], order: &str) {
    let (column, descending) = order
        .rsplit_once('.')
        .map_or((order, false), |(column, direction)| (column, direction == "desc"));
    let key = |row: &Value| match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    rows.sort_by(|a, b| {
        let ordering = key(a).cmp(&key(b));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn merge(row: &mut Value, patch: &Value) {
    if let (Some(target), Some(source)) = (row.as_object_mut(), patch.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl AuthProvider for InMemoryBackend {
    async fn get_user(&self, access_token: &str) -> AppResult<AuthenticatedUser> {
        let mut user = self
            .users
            .get(access_token)
            .cloned()
            .ok_or_else(|| AppError::auth_invalid("invalid JWT"))?;
        access_token.clone_into(&mut user.access_token);
        Ok(user)
    }
}

#[async_trait]
impl DataStore for InMemoryBackend {
    async fn select(&self, _access_token: &str, query: &RowQuery) -> AppResult<Vec<Value>> {
        let state = self.state.lock().unwrap();
        Self::check_table(&state, &query.table)?;
        let rows = state.tables.get(&query.table).cloned().unwrap_or_default();
        let mut matching: Vec<Value> = rows.into_iter().filter(|row| query.matches(row)).collect();
        if let Some(order) = &query.order {
            sort_rows(&mut matching, order);
        }
        let mut page: Vec<Value> = matching.into_iter().skip(query.offset.unwrap_or(0)).collect();
        if let Some(limit) = query.limit {
            page.truncate(limit);
        }
        Ok(page)
    }

    async fn update(
        &self,
        _access_token: &str,
        query: &RowQuery,
        patch: &Value,
    ) -> AppResult<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        Self::check_table(&state, &query.table)?;
        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(&query.table) {
            for row in rows.iter_mut().filter(|row| query.matches(row)) {
                merge(row, patch);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn insert(&self, _access_token: &str, table: &str, rows: &Value) -> AppResult<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        Self::check_table(&state, table)?;
        let inserted = rows_of(rows);
        state
            .tables
            .entry(table.to_owned())
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn upsert(
        &self,
        _access_token: &str,
        table: &str,
        rows: &Value,
        on_conflict: Option<&str>,
    ) -> AppResult<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        Self::check_table(&state, table)?;
        let keys: Vec<&str> = on_conflict
            .map(|columns| columns.split(',').map(str::trim).collect())
            .unwrap_or_else(|| vec!["id"]);
        let stored = state.tables.entry(table.to_owned()).or_default();

        let mut written = Vec::new();
        for row in rows_of(rows) {
            let same_key = |existing: &Value| keys.iter().all(|key| existing.get(*key) == row.get(*key));
            if let Some(existing) = stored.iter_mut().find(|existing| same_key(existing)) {
                merge(existing, &row);
                written.push(existing.clone());
            } else {
                stored.push(row.clone());
                written.push(row);
            }
        }
        Ok(written)
    }

    async fn rpc(&self, _access_token: &str, function: &str, _args: &Value) -> AppResult<Value> {
        let state = self.state.lock().unwrap();
        match state.rpc_results.get(function) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(AppError::new(e.code, e.message.clone())),
            None => Ok(Value::Array(Vec::new())),
        }
    }
}

#[async_trait]
impl FunctionInvoker for InMemoryBackend {
    async fn invoke(&self, name: &str, bearer: &str, body: &Value) -> AppResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.function_calls.push(FunctionCall {
            name: name.to_owned(),
            bearer: bearer.to_owned(),
            body: body.clone(),
        });
        match state.function_results.get(name) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(AppError::new(e.code, e.message.clone())),
            None => Ok(Value::Object(Map::new())),
        }
    }
}

/// Configuration pointing at an unused backend URL
pub fn test_config(service_role_key: Option<&str>) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        environment: Environment::Testing,
        backend: BackendConfig {
            url: "http://127.0.0.1:9".to_owned(),
            anon_key: "anon-key".to_owned(),
            service_role_key: service_role_key.map(str::to_owned),
        },
        http_client: HttpClientConfig::default(),
    }
}

/// Resources wired to `backend` for every seam
pub fn create_test_server_resources(
    backend: &Arc<InMemoryBackend>,
    service_role_key: Option<&str>,
) -> Arc<ServerResources> {
    init_test_logging();
    Arc::new(ServerResources::new(
        test_config(service_role_key),
        backend.clone(),
        backend.clone(),
        backend.clone(),
    ))
}

/// Full router over a fresh backend with the service-role key configured
pub fn create_test_app() -> (Router, Arc<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    let resources = create_test_server_resources(&backend, Some(SERVICE_ROLE_KEY));
    (build_router(resources), backend)
}
