// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deploy and fund the primary gas tank.
//!
//! Uses the first `GAS_TANKS` entry with its deposit replaced by
//! `INITIAL_DEPOSIT`. An already deployed tank is reported, not touched.

use anyhow::Context;
use tracing::info;

use gas_tank_sponsorship::{
    config::{amount, AppConfig, Env, DEFAULT_INITIAL_DEPOSIT, INITIAL_DEPOSIT_ENV},
    logging::{init_tracing, LogFormat},
    tank::{
        lifecycle::{required_balance, Deployment},
        operations::create,
        EvmTankProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_source(&Env));

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let mut tank = config.primary_tank()?.clone();
    tank.deposit_amount = amount(
        &Env,
        INITIAL_DEPOSIT_ENV,
        DEFAULT_INITIAL_DEPOSIT,
        tank.token_decimals,
    )?;

    info!(
        network = %tank.network.name,
        owner = %tank.owner.address(),
        token = %tank.token,
        deposit = %tank.deposit_amount,
        required = ?required_balance(tank.deposit_amount),
        "Creating gas tank"
    );

    let provider = EvmTankProvider::new(config.provider.clone());
    let report = create(&provider, &tank)
        .await
        .context("Gas tank creation failed")?;

    let address = report.provisioned.record.tank_address;
    match report.provisioned.deployment {
        Deployment::Existing => info!(tank = %address, "Gas tank already deployed"),
        Deployment::Deployed { tx_hash } => info!(
            tank = %address,
            tx = %tank.network.tx_url(&tx_hash),
            "Gas tank deployed"
        ),
        Deployment::DeployedConcurrently => {
            info!(tank = %address, "Gas tank was deployed by another process")
        }
    }
    info!(
        tank = %address,
        balance = %report.balance.formatted(),
        "Gas tank ready"
    );

    Ok(())
}
