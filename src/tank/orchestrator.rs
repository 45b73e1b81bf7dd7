// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup initialization of the tank registry.
//!
//! Runs once before the listener binds. Each configured tank is connected,
//! checked against the registry and provisioned if new. A tank that fails
//! is logged and skipped; the others still register. Running it again with
//! the same configuration adds nothing.

use std::fmt;

use alloy::primitives::Address;
use tracing::{info, warn};

use super::lifecycle::{provision_with_handle, ProvisionOutcome};
use super::provider::{TankConfig, TankProvider};
use super::registry::TankRegistry;

/// Identifies one configured tank in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankKey {
    pub chain_id: u64,
    pub token: Address,
}

impl From<&TankConfig> for TankKey {
    fn from(config: &TankConfig) -> Self {
        Self {
            chain_id: config.chain_id(),
            token: config.token,
        }
    }
}

impl fmt::Display for TankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.token, self.chain_id)
    }
}

/// What happened to each configuration during [`initialize`].
#[derive(Debug, Default)]
pub struct InitReport {
    pub registered: Vec<TankKey>,
    pub duplicates: Vec<TankKey>,
    pub underfunded: Vec<TankKey>,
    pub failed: Vec<(TankKey, String)>,
}

/// Populate `registry` from `configs`, in order.
pub async fn initialize(
    registry: &TankRegistry,
    provider: &dyn TankProvider,
    configs: &[TankConfig],
) -> InitReport {
    let mut report = InitReport::default();

    for config in configs {
        let key = TankKey::from(config);

        let handle = match provider.connect(config).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(
                    chain_id = key.chain_id,
                    token = %key.token,
                    error = %e,
                    "Failed to connect gas tank"
                );
                report.failed.push((key, e.to_string()));
                continue;
            }
        };

        let tank_address = handle.address();
        if registry
            .contains(key.chain_id, key.token, tank_address)
            .await
        {
            info!(
                chain_id = key.chain_id,
                tank = %tank_address,
                "Gas tank already registered"
            );
            report.duplicates.push(key);
            continue;
        }

        match provision_with_handle(config, handle).await {
            Ok(provisioned) => {
                if registry.insert(provisioned.record).await {
                    info!(
                        chain_id = key.chain_id,
                        token = %key.token,
                        tank = %tank_address,
                        "Gas tank registered"
                    );
                    report.registered.push(key);
                } else {
                    report.duplicates.push(key);
                }
            }
            Err(ProvisionOutcome::InsufficientFunds { .. }) => {
                report.underfunded.push(key);
            }
            Err(e) => {
                warn!(
                    chain_id = key.chain_id,
                    token = %key.token,
                    error = %e,
                    "Skipping gas tank"
                );
                report.failed.push((key, e.to_string()));
            }
        }
    }

    info!(
        registered = report.registered.len(),
        duplicates = report.duplicates.len(),
        underfunded = report.underfunded.len(),
        failed = report.failed.len(),
        "Gas tank initialization finished"
    );

    report
}
