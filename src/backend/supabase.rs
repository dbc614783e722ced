// ABOUTME: Supabase client implementing auth lookup, REST datastore access, and function calls
// ABOUTME: Talks to the project over reqwest with the anon key plus the caller's bearer token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, field, warn, Span};

use super::{AuthProvider, AuthenticatedUser, DataStore, FunctionInvoker, RowQuery};
use crate::config::BackendConfig;
use crate::constants::{headers, paths};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;

/// Error body returned by the REST datastore
#[derive(Debug, Default, Deserialize)]
struct RestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// `PostgREST` code for "zero rows where exactly one was required"
const NO_ROWS: &str = "PGRST116";

/// Client for a Supabase project
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a client for the project in `config`
    #[must_use]
    pub fn new(http: Client, config: &BackendConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_owned(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        self.url(&format!("{}/{table}", paths::REST))
    }

    /// Attach the project key and the caller's bearer token
    fn authorized(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
        builder
            .header(headers::API_KEY, &self.anon_key)
            .bearer_auth(bearer)
    }

    /// Decode a datastore response into rows
    async fn rows(response: Response, operation: &str, table: &str) -> AppResult<Vec<Value>> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::rest_error(status, response.text().await.unwrap_or_default(), table));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => {
                debug!(operation, table, "Datastore returned a single object");
                Ok(vec![row])
            }
        }
    }

    /// Map a non-2xx datastore response to an `AppError` carrying the datastore message
    fn rest_error(status: StatusCode, body: String, table: &str) -> AppError {
        let parsed: RestErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.details)
            .unwrap_or_else(|| if body.is_empty() { status.to_string() } else { body });

        let code = match (status, parsed.code.as_deref()) {
            (_, Some(NO_ROWS)) | (StatusCode::NOT_FOUND, _) => ErrorCode::ResourceNotFound,
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => ErrorCode::AuthInvalid,
            _ => ErrorCode::DatabaseError,
        };
        warn!(status = status.as_u16(), table, %message, "Datastore request failed");
        AppError::new(code, message).with_field(
            "datastore_code",
            parsed.code.map_or(Value::Null, Value::String),
        )
    }

    async fn send_rows(
        &self,
        request: RequestBuilder,
        operation: &str,
        table: &str,
    ) -> AppResult<Vec<Value>> {
        let started = Instant::now();
        let result = match request.send().await {
            Ok(response) => Self::rows(response, operation, table).await,
            Err(e) => Err(AppError::from(e)),
        };
        AppLogger::log_backend_operation(
            operation,
            table,
            result.is_ok(),
            elapsed_ms(started),
        );
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    #[tracing::instrument(skip(self, access_token), fields(user_id = field::Empty))]
    async fn get_user(&self, access_token: &str) -> AppResult<AuthenticatedUser> {
        let response = self
            .authorized(self.http.get(self.url(paths::AUTH_USER)), access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::auth_invalid("Invalid or expired token"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_service("auth", format!("{status}: {body}")));
        }

        let mut user: AuthenticatedUser = response.json().await?;
        if user.id.is_empty() {
            return Err(AppError::auth_invalid("Token does not identify a user"));
        }
        Span::current().record("user_id", user.id.as_str());
        access_token.clone_into(&mut user.access_token);
        Ok(user)
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    async fn select(&self, access_token: &str, query: &RowQuery) -> AppResult<Vec<Value>> {
        let request = self
            .authorized(self.http.get(self.table_url(&query.table)), access_token)
            .query(&query.query_pairs());
        self.send_rows(request, "select", &query.table).await
    }

    async fn update(
        &self,
        access_token: &str,
        query: &RowQuery,
        patch: &Value,
    ) -> AppResult<Vec<Value>> {
        let request = self
            .authorized(self.http.patch(self.table_url(&query.table)), access_token)
            .header(headers::PREFER, headers::RETURN_REPRESENTATION)
            .query(&query.query_pairs())
            .json(patch);
        self.send_rows(request, "update", &query.table).await
    }

    async fn insert(&self, access_token: &str, table: &str, rows: &Value) -> AppResult<Vec<Value>> {
        let request = self
            .authorized(self.http.post(self.table_url(table)), access_token)
            .header(headers::PREFER, headers::RETURN_REPRESENTATION)
            .json(rows);
        self.send_rows(request, "insert", table).await
    }

    async fn upsert(
        &self,
        access_token: &str,
        table: &str,
        rows: &Value,
        on_conflict: Option<&str>,
    ) -> AppResult<Vec<Value>> {
        let mut request = self
            .authorized(self.http.post(self.table_url(table)), access_token)
            .header(headers::PREFER, headers::UPSERT_REPRESENTATION)
            .json(rows);
        if let Some(columns) = on_conflict {
            request = request.query(&[("on_conflict", columns)]);
        }
        self.send_rows(request, "upsert", table).await
    }

    async fn rpc(&self, access_token: &str, function: &str, args: &Value) -> AppResult<Value> {
        let url = self.url(&format!("{}/{function}", paths::RPC));
        let request = self.authorized(self.http.post(url), access_token).json(args);
        let rows = self.send_rows(request, "rpc", function).await?;
        Ok(Value::Array(rows))
    }
}

#[async_trait]
impl FunctionInvoker for SupabaseClient {
    async fn invoke(&self, name: &str, bearer: &str, body: &Value) -> AppResult<Value> {
        let url = self.url(&format!("{}/{name}", paths::FUNCTIONS));
        let mut request = self
            .authorized(self.http.post(url), bearer)
            .header(headers::CLIENT_INFO, headers::CLIENT_INFO_VALUE)
            .header(CONTENT_TYPE, "application/json");
        if !body.is_null() {
            request = request.json(body);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AppError::external_service(name, format!("{status}: {text}")));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
