// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use gas_tank_sponsorship::{
    api::router,
    config::{AppConfig, Env},
    logging::{init_tracing, LogFormat},
    shutdown::shutdown_token,
    state::AppState,
    tank::{initialize, EvmTankProvider, SponsorshipService, TankRegistry},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_source(&Env));

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(
        owner = %config.owner.address(),
        tanks = config.tanks.len(),
        "Starting gas tank sponsorship service"
    );

    // Tanks are provisioned before the listener binds, so every request
    // sees the complete registry.
    let registry = Arc::new(TankRegistry::new());
    let provider = EvmTankProvider::new(config.provider.clone());
    let report = initialize(&registry, &provider, &config.tanks).await;
    if report.registered.is_empty() && report.duplicates.is_empty() {
        warn!("No gas tank available; sponsorship requests will fail until restart");
    }

    let state = AppState::new(SponsorshipService::new(registry));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Gas tank server listening (docs at /docs)");

    let shutdown = shutdown_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("Server failed")?;

    info!("Server stopped");
    Ok(())
}
