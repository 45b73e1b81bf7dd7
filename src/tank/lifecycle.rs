// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tank lifecycle controller.
//!
//! Takes one configured tank from "not provisioned" to "deployed and
//! funded". Deployment state is never cached: every run asks the chain.
//!
//! ```text
//! connect -> deployed? --yes--> record (no deploy, no funding)
//!               |
//!               no
//!               v
//!     owner balance >= deposit * 125% ? --no--> InsufficientFunds (skip)
//!               |
//!              yes
//!               v
//!     deploy-with-deposit -> record
//! ```

use std::sync::Arc;

use alloy::primitives::{TxHash, U256};
use thiserror::Error;
use tracing::{info, warn};

use crate::blockchain::ChainError;

use super::provider::{TankConfig, TankHandle, TankProvider};
use super::registry::TankRecord;

/// Owner balance required before deploying, as a percentage of the deposit.
/// The margin covers fees paid in the deposit token.
pub const FUNDING_BUFFER_PERCENT: u64 = 125;

/// Owner balance needed to provision a tank with `deposit`, `None` when the
/// buffered amount does not fit in 256 bits.
pub fn required_balance(deposit: U256) -> Option<U256> {
    deposit
        .checked_mul(U256::from(FUNDING_BUFFER_PERCENT))
        .map(|buffered| buffered / U256::from(100u64))
}

/// Why provisioning did not produce a tank.
#[derive(Debug, Error)]
pub enum ProvisionOutcome {
    /// The owner cannot cover the deposit plus buffer. Nothing was sent.
    #[error("insufficient owner balance: have {balance}, need {required}")]
    InsufficientFunds { balance: U256, required: U256 },

    /// The configured deposit is too large to carry the funding buffer.
    #[error("deposit {deposit} is too large to provision")]
    DepositTooLarge { deposit: U256 },

    #[error("provisioning failed: {0}")]
    Failed(ChainError),

    /// A transaction was sent but not confirmed before the deadline. Its
    /// final state is unknown; the next run re-checks deployment.
    #[error("provisioning timed out: {0}")]
    Timeout(ChainError),
}

impl From<ChainError> for ProvisionOutcome {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Timeout(_) => Self::Timeout(err),
            other => Self::Failed(other),
        }
    }
}

/// How the tank came to be deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    /// Already on chain before this run.
    Existing,
    /// Deployed and funded by this run.
    Deployed { tx_hash: TxHash },
    /// Another process deployed it between the check and the send.
    DeployedConcurrently,
}

/// A provisioned tank and how it got there.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub record: TankRecord,
    pub deployment: Deployment,
}

/// Connect a handle for `config` and provision the tank.
pub async fn provision(
    provider: &dyn TankProvider,
    config: &TankConfig,
) -> Result<Provisioned, ProvisionOutcome> {
    let handle = provider.connect(config).await?;
    provision_with_handle(config, handle).await
}

/// Provision the tank behind an already connected handle.
pub async fn provision_with_handle(
    config: &TankConfig,
    handle: Arc<dyn TankHandle>,
) -> Result<Provisioned, ProvisionOutcome> {
    let chain_id = config.chain_id();
    let tank_address = handle.address();
    let record = TankRecord {
        chain_id,
        token: config.token,
        tank_address,
        handle: Arc::clone(&handle),
    };

    if handle.is_deployed().await? {
        info!(chain_id, tank = %tank_address, "Gas tank already deployed");
        return Ok(Provisioned {
            record,
            deployment: Deployment::Existing,
        });
    }

    let required =
        required_balance(config.deposit_amount).ok_or(ProvisionOutcome::DepositTooLarge {
            deposit: config.deposit_amount,
        })?;
    let balance = handle.owner_balance(config.token).await?;
    if balance < required {
        warn!(
            chain_id,
            owner = %handle.owner_address(),
            token = %config.token,
            %balance,
            %required,
            "Owner balance too low to deploy gas tank"
        );
        return Err(ProvisionOutcome::InsufficientFunds { balance, required });
    }

    info!(
        chain_id,
        tank = %tank_address,
        deposit = %config.deposit_amount,
        "Deploying gas tank"
    );

    let deployment = match handle.deploy(config.token, config.deposit_amount).await? {
        Some(tx_hash) => {
            info!(
                chain_id,
                tank = %tank_address,
                tx = %handle.network().tx_url(&tx_hash),
                "Gas tank deployed"
            );
            Deployment::Deployed { tx_hash }
        }
        None => {
            info!(chain_id, tank = %tank_address, "Gas tank deployed concurrently");
            Deployment::DeployedConcurrently
        }
    };

    Ok(Provisioned { record, deployment })
}
