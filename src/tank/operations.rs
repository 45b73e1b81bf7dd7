// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operator-triggered tank operations: create, deposit and withdraw.
//!
//! These work on a handle resolved straight from configuration and never
//! touch the registry. Deposit and withdraw refuse to act on a tank that
//! is not deployed yet.

use alloy::primitives::{Address, TxHash, U256};
use thiserror::Error;
use tracing::info;

use crate::blockchain::{ChainError, TankBalance};

use super::lifecycle::{provision, ProvisionOutcome, Provisioned};
use super::provider::{TankConfig, TankHandle, TankProvider};

/// Extra blocks a deposit waits for after inclusion.
pub const DEPOSIT_CONFIRMATIONS: u64 = 0;

/// Blocks a withdrawal must be buried under before it is reported.
pub const WITHDRAW_CONFIRMATIONS: u64 = 3;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Gas tank {0} is not deployed; run create-gas-tank first")]
    NotDeployed(Address),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient tank balance: requested {requested}, available {available}")]
    InsufficientFunds { requested: U256, available: U256 },

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Transaction not confirmed in time: {0}")]
    Timeout(String),

    #[error("Provider error: {0}")]
    Provider(ChainError),
}

impl From<ChainError> for OperationError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::TransactionFailed(msg) => Self::TransferFailed(msg),
            ChainError::Timeout(msg) => Self::Timeout(msg),
            other => Self::Provider(other),
        }
    }
}

async fn ensure_deployed(handle: &dyn TankHandle) -> Result<(), OperationError> {
    if handle.is_deployed().await? {
        Ok(())
    } else {
        Err(OperationError::NotDeployed(handle.address()))
    }
}

// =============================================================================
// Create
// =============================================================================

/// Result of [`create`].
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub provisioned: Provisioned,
    /// Tank balance after provisioning
    pub balance: TankBalance,
}

/// Provision the tank for `config` and read back its balance.
pub async fn create(
    provider: &dyn TankProvider,
    config: &TankConfig,
) -> Result<CreateReport, ProvisionOutcome> {
    let provisioned = provision(provider, config).await?;
    let balance = provisioned.record.handle.balance(config.token).await?;

    Ok(CreateReport {
        provisioned,
        balance,
    })
}

// =============================================================================
// Deposit
// =============================================================================

#[derive(Debug, Clone)]
pub struct DepositReport {
    pub tank: Address,
    pub tx_hash: TxHash,
    pub balance_before: TankBalance,
    pub balance_after: TankBalance,
}

impl DepositReport {
    /// Balance change observed across the deposit.
    pub fn deposited(&self) -> U256 {
        self.balance_after
            .amount
            .saturating_sub(self.balance_before.amount)
    }
}

/// Move `amount` of `token` from the owner account into the tank.
pub async fn deposit(
    handle: &dyn TankHandle,
    token: Address,
    amount: U256,
) -> Result<DepositReport, OperationError> {
    ensure_deployed(handle).await?;
    if amount.is_zero() {
        return Err(OperationError::InvalidAmount(
            "deposit amount must be greater than zero".to_string(),
        ));
    }

    let balance_before = handle.balance(token).await?;
    let tx_hash = handle.transfer_to_tank(token, amount).await?;
    handle
        .wait_for_transaction(tx_hash, DEPOSIT_CONFIRMATIONS)
        .await?;
    let balance_after = handle.balance(token).await?;

    info!(
        tank = %handle.address(),
        %amount,
        tx = %handle.network().tx_url(&tx_hash),
        "Deposit confirmed"
    );

    Ok(DepositReport {
        tank: handle.address(),
        tx_hash,
        balance_before,
        balance_after,
    })
}

// =============================================================================
// Withdraw
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawAmount {
    /// The whole tank balance at the time of the call.
    All,
    /// An exact amount in base units.
    Exact(U256),
}

#[derive(Debug, Clone)]
pub struct WithdrawRequest {
    pub token: Address,
    pub amount: WithdrawAmount,
    /// Defaults to the owner address.
    pub recipient: Option<Address>,
}

#[derive(Debug, Clone)]
pub struct WithdrawReport {
    pub tank: Address,
    pub recipient: Address,
    pub amount: U256,
    pub tx_hash: TxHash,
    pub balance_before: TankBalance,
    pub balance_after: TankBalance,
}

impl WithdrawReport {
    /// Balance change observed across the withdrawal.
    pub fn withdrawn(&self) -> U256 {
        self.balance_before
            .amount
            .saturating_sub(self.balance_after.amount)
    }
}

#[derive(Debug, Clone)]
pub enum WithdrawOutcome {
    /// Nothing to withdraw; no transaction was sent.
    EmptyTank { tank: Address },
    Withdrawn(WithdrawReport),
}

/// Withdraw from the tank, waiting for [`WITHDRAW_CONFIRMATIONS`].
pub async fn withdraw(
    handle: &dyn TankHandle,
    request: WithdrawRequest,
) -> Result<WithdrawOutcome, OperationError> {
    ensure_deployed(handle).await?;

    let tank = handle.address();
    let balance_before = handle.balance(request.token).await?;
    if balance_before.amount.is_zero() {
        info!(tank = %tank, "Gas tank is empty, nothing to withdraw");
        return Ok(WithdrawOutcome::EmptyTank { tank });
    }

    let amount = match request.amount {
        WithdrawAmount::All => balance_before.amount,
        WithdrawAmount::Exact(amount) if amount.is_zero() => {
            return Err(OperationError::InvalidAmount(
                "withdraw amount must be greater than zero".to_string(),
            ));
        }
        WithdrawAmount::Exact(amount) if amount > balance_before.amount => {
            return Err(OperationError::InsufficientFunds {
                requested: amount,
                available: balance_before.amount,
            });
        }
        WithdrawAmount::Exact(amount) => amount,
    };
    let recipient = request.recipient.unwrap_or_else(|| handle.owner_address());

    let tx_hash = handle
        .withdraw(request.token, recipient, amount, WITHDRAW_CONFIRMATIONS)
        .await?;
    let balance_after = handle.balance(request.token).await?;

    info!(
        tank = %tank,
        recipient = %recipient,
        %amount,
        tx = %handle.network().tx_url(&tx_hash),
        "Withdrawal confirmed"
    );

    Ok(WithdrawOutcome::Withdrawn(WithdrawReport {
        tank,
        recipient,
        amount,
        tx_hash,
        balance_before,
        balance_after,
    }))
}
