// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability provider seam.
//!
//! A [`TankProvider`] turns a [`TankConfig`] into a [`TankHandle`]: the
//! object that owns the tank's key-backed capabilities. Everything above
//! this seam (lifecycle, registry, signing service, operations) talks only
//! to these traits, so the chain and the account-abstraction primitive can
//! be swapped or mocked.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::blockchain::{ChainError, NetworkConfig, OwnerKey, TankBalance, TankNonce};

use super::quote::Quote;

/// Startup configuration of one gas tank.
#[derive(Debug, Clone)]
pub struct TankConfig {
    /// Network the tank lives on
    pub network: NetworkConfig,
    /// Token the tank custodies and sponsors with
    pub token: Address,
    /// Token decimals, used for amount parsing and display
    pub token_decimals: u8,
    /// Initial deposit in token base units
    pub deposit_amount: U256,
    /// RPC endpoint
    pub rpc_url: String,
    /// Owner credential
    pub owner: OwnerKey,
}

impl TankConfig {
    pub fn chain_id(&self) -> u64 {
        self.network.chain_id
    }
}

/// Capability object for one tank.
///
/// Implementations are free to serialize calls internally; callers must not
/// assume two concurrent calls against one handle run in parallel.
#[async_trait]
pub trait TankHandle: Send + Sync {
    /// Network the handle is bound to.
    fn network(&self) -> &NetworkConfig;

    /// Tank account address (deterministic, no chain access).
    fn address(&self) -> Address;

    /// Owner EOA address.
    fn owner_address(&self) -> Address;

    /// Whether the tank account is deployed on chain.
    async fn is_deployed(&self) -> Result<bool, ChainError>;

    /// Token balance held by the tank.
    async fn balance(&self, token: Address) -> Result<TankBalance, ChainError>;

    /// Token balance held by the owner EOA, in base units.
    async fn owner_balance(&self, token: Address) -> Result<U256, ChainError>;

    /// Current account-abstraction nonce of the tank.
    async fn nonce(&self) -> Result<TankNonce, ChainError>;

    /// Deploy the tank and fund it with `amount` of `token` in one
    /// operation. `None` means the tank was already deployed and nothing
    /// was sent.
    async fn deploy(&self, token: Address, amount: U256) -> Result<Option<TxHash>, ChainError>;

    /// Transfer `amount` of `token` from the owner EOA into the tank.
    async fn transfer_to_tank(&self, token: Address, amount: U256) -> Result<TxHash, ChainError>;

    /// Wait for a transaction to be buried under `confirmations` blocks.
    async fn wait_for_transaction(&self, hash: TxHash, confirmations: u64)
        -> Result<(), ChainError>;

    /// Withdraw `amount` of `token` from the tank to `recipient`, returning
    /// once the withdrawal has `confirmations` confirmations.
    async fn withdraw(
        &self,
        token: Address,
        recipient: Address,
        amount: U256,
        confirmations: u64,
    ) -> Result<TxHash, ChainError>;

    /// Co-sign a sponsorship quote as this tank.
    async fn sign_sponsorship(&self, quote: Quote) -> Result<Quote, ChainError>;

    /// Raw receipt of a transaction on this network, `None` if unknown.
    async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<serde_json::Value>, ChainError>;
}

/// Factory of tank handles.
#[async_trait]
pub trait TankProvider: Send + Sync {
    /// Build the handle for `config`. No transaction is sent.
    async fn connect(&self, config: &TankConfig) -> Result<Arc<dyn TankHandle>, ChainError>;
}
