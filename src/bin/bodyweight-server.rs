// ABOUTME: Server binary for the bodyweight training API
// ABOUTME: Loads environment configuration, initializes logging, and serves the HTTP endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Bodyweight Server Binary
//!
//! Starts the HTTP API in front of the hosted backend configured through
//! `SUPABASE_URL`, `SUPABASE_ANON_KEY` and `SUPABASE_SERVICE_ROLE_KEY`.

use std::sync::Arc;

use anyhow::Result;
use bodyweight_server::{config::ServerConfig, logging, resources::ServerResources, server};
use clap::Parser;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "bodyweight-server")]
#[command(about = "Bodyweight training API - onboarding, biometrics and session feedback")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Bodyweight Server");
    info!("{}", config.summary());
    if config.backend.service_role_key.is_none() {
        warn!("Service-role key missing: calculate-ica and update-progressions will fail");
    }

    let resources = Arc::new(ServerResources::from_config(config));

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
