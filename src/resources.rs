// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Holds configuration and the backend trait objects shared by every request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Server Resources
//!
//! Everything a handler needs is immutable after startup and shared through an
//! `Arc<ServerResources>`. Tests build the same container around in-memory
//! backends with [`ServerResources::new`].

use std::sync::Arc;

use crate::backend::{AuthProvider, DataStore, FunctionInvoker, SupabaseClient};
use crate::config::ServerConfig;
use crate::middleware::BearerAuthenticator;
use crate::utils::http_client::create_backend_client;

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Resolves bearer tokens for every function endpoint
    pub auth_middleware: Arc<BearerAuthenticator>,
    /// Row access with the caller's token
    pub datastore: Arc<dyn DataStore>,
    /// Remote function gateway used by the relays
    pub functions: Arc<dyn FunctionInvoker>,
}

impl ServerResources {
    /// Assemble resources from explicit backend implementations
    #[must_use]
    pub fn new(
        config: ServerConfig,
        auth: Arc<dyn AuthProvider>,
        datastore: Arc<dyn DataStore>,
        functions: Arc<dyn FunctionInvoker>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            auth_middleware: Arc::new(BearerAuthenticator::new(auth)),
            datastore,
            functions,
        }
    }

    /// Resources backed by the configured Supabase project
    #[must_use]
    pub fn from_config(config: ServerConfig) -> Self {
        let http = create_backend_client(&config.http_client);
        let client = Arc::new(SupabaseClient::new(http, &config.backend));
        Self::new(config, client.clone(), client.clone(), client)
    }

    /// Service-role key used by relays that call functions with elevated rights
    #[must_use]
    pub fn service_role_key(&self) -> Option<&str> {
        self.config.backend.service_role_key.as_deref()
    }
}
