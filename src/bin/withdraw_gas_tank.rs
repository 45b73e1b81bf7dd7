// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Withdraw from the primary gas tank.
//!
//! `WITHDRAW_ALL=true` empties the tank; otherwise `WITHDRAW_AMOUNT` is
//! sent. Funds go to `RECIPIENT_ADDRESS`, or back to the owner. An empty
//! tank is not an error.

use anyhow::Context;
use tracing::info;

use gas_tank_sponsorship::{
    blockchain::format_amount,
    config::{AppConfig, Env, WithdrawSettings},
    logging::{init_tracing, LogFormat},
    tank::{
        operations::{withdraw, WithdrawOutcome, WithdrawRequest, WITHDRAW_CONFIRMATIONS},
        EvmTankProvider, TankProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_source(&Env));

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let tank = config.primary_tank()?;
    let settings = WithdrawSettings::load(&Env, tank.token_decimals)?;

    let provider = EvmTankProvider::new(config.provider.clone());
    let handle = provider.connect(tank).await?;

    info!(
        network = %tank.network.name,
        tank = %handle.address(),
        amount = ?settings.amount,
        confirmations = WITHDRAW_CONFIRMATIONS,
        "Withdrawing from gas tank"
    );

    let request = WithdrawRequest {
        token: tank.token,
        amount: settings.amount,
        recipient: settings.recipient,
    };
    let outcome = withdraw(handle.as_ref(), request)
        .await
        .context("Withdrawal failed")?;

    match outcome {
        WithdrawOutcome::EmptyTank { tank } => {
            info!(tank = %tank, "Gas tank is empty, nothing withdrawn");
        }
        WithdrawOutcome::Withdrawn(report) => {
            info!(
                tank = %report.tank,
                recipient = %report.recipient,
                before = %report.balance_before.formatted(),
                after = %report.balance_after.formatted(),
                withdrawn = %format_amount(report.withdrawn(), report.balance_after.decimals),
                tx = %tank.network.tx_url(&report.tx_hash),
                "Withdrawal complete"
            );
        }
    }

    Ok(())
}
