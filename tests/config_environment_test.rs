// ABOUTME: Unit tests for config environment functionality
// ABOUTME: Validates environment loading, defaults, required variables, and the logged summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::net::SocketAddr;

use bodyweight_server::config::{Environment, ServerConfig};
use bodyweight_server::constants::env_vars;
use serial_test::serial;

const ALL_VARS: [&str; 8] = [
    env_vars::HTTP_PORT,
    env_vars::HOST,
    env_vars::SUPABASE_URL,
    env_vars::SUPABASE_ANON_KEY,
    env_vars::SUPABASE_SERVICE_ROLE_KEY,
    env_vars::ENVIRONMENT,
    env_vars::HTTP_CLIENT_TIMEOUT_SECS,
    env_vars::HTTP_CLIENT_CONNECT_TIMEOUT_SECS,
];

fn reset_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

fn set_backend() {
    env::set_var(env_vars::SUPABASE_URL, "https://project.supabase.co/");
    env::set_var(env_vars::SUPABASE_ANON_KEY, "anon-key");
}

#[test]
#[serial]
fn test_defaults_apply() {
    reset_env();
    set_backend();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.bind_addr(), "0.0.0.0:8081".parse::<SocketAddr>().unwrap());
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.backend.url, "https://project.supabase.co");
    assert_eq!(config.backend.service_role_key, None);
    assert_eq!(config.http_client.timeout_secs, 30);
    assert_eq!(config.http_client.connect_timeout_secs, 10);
    reset_env();
}

#[test]
#[serial]
fn test_overrides_apply() {
    reset_env();
    set_backend();
    env::set_var(env_vars::HTTP_PORT, "9090");
    env::set_var(env_vars::HOST, "127.0.0.1");
    env::set_var(env_vars::ENVIRONMENT, "production");
    env::set_var(env_vars::SUPABASE_SERVICE_ROLE_KEY, "service-key");
    env::set_var(env_vars::HTTP_CLIENT_TIMEOUT_SECS, "5");

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.bind_addr(), "127.0.0.1:9090".parse::<SocketAddr>().unwrap());
    assert!(config.environment.is_production());
    assert_eq!(config.backend.service_role_key.as_deref(), Some("service-key"));
    assert_eq!(config.http_client.timeout_secs, 5);
    reset_env();
}

#[test]
#[serial]
fn test_backend_variables_are_required() {
    reset_env();
    env::set_var(env_vars::SUPABASE_URL, "https://project.supabase.co");
    env::set_var(env_vars::SUPABASE_ANON_KEY, "   ");

    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("SUPABASE_ANON_KEY"));

    env::remove_var(env_vars::SUPABASE_URL);
    env::set_var(env_vars::SUPABASE_ANON_KEY, "anon-key");
    let err = ServerConfig::from_env().unwrap_err();
    assert!(err.to_string().contains("SUPABASE_URL"));
    reset_env();
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    reset_env();
    set_backend();
    env::set_var(env_vars::HTTP_PORT, "not-a-port");
    assert!(ServerConfig::from_env().is_err());

    env::remove_var(env_vars::HTTP_PORT);
    env::set_var(env_vars::SUPABASE_URL, "ftp://project.supabase.co");
    assert!(ServerConfig::from_env().is_err());
    reset_env();
}

#[test]
#[serial]
fn test_summary_hides_secrets() {
    reset_env();
    set_backend();
    env::set_var(env_vars::SUPABASE_SERVICE_ROLE_KEY, "super-secret-service-key");

    let summary = ServerConfig::from_env().unwrap().summary();

    assert!(summary.contains("service_role=configured"));
    assert!(summary.contains("https://project.supabase.co"));
    assert!(!summary.contains("super-secret-service-key"));
    assert!(!summary.contains("anon-key"));
    reset_env();
}
