// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Top up the primary gas tank with `DEPOSIT_AMOUNT` from the owner account.

use anyhow::Context;
use tracing::info;

use gas_tank_sponsorship::{
    blockchain::format_amount,
    config::{amount, AppConfig, Env, DEFAULT_DEPOSIT_AMOUNT, DEPOSIT_AMOUNT_ENV},
    logging::{init_tracing, LogFormat},
    tank::{operations::deposit, EvmTankProvider, TankProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_source(&Env));

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let tank = config.primary_tank()?;
    let value = amount(
        &Env,
        DEPOSIT_AMOUNT_ENV,
        DEFAULT_DEPOSIT_AMOUNT,
        tank.token_decimals,
    )?;

    let provider = EvmTankProvider::new(config.provider.clone());
    let handle = provider.connect(tank).await?;

    let owner_balance = handle.owner_balance(tank.token).await?;
    info!(
        network = %tank.network.name,
        tank = %handle.address(),
        owner = %handle.owner_address(),
        owner_balance = %format_amount(owner_balance, tank.token_decimals),
        amount = %format_amount(value, tank.token_decimals),
        "Depositing into gas tank"
    );

    let report = deposit(handle.as_ref(), tank.token, value)
        .await
        .context("Deposit failed")?;

    info!(
        tank = %report.tank,
        before = %report.balance_before.formatted(),
        after = %report.balance_after.formatted(),
        deposited = %format_amount(report.deposited(), report.balance_after.decimals),
        tx = %tank.network.tx_url(&report.tx_hash),
        "Deposit complete"
    );

    Ok(())
}
