// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM capability provider.
//!
//! Tanks are counterfactual smart accounts created by a gas tank factory.
//! The owner EOA pays for and signs every transaction: approval and the
//! combined deploy-and-fund call at provisioning, owner-only withdrawals,
//! direct ERC-20 top-ups, and the EIP-191 co-signature on sponsorship
//! quotes.

use std::sync::Arc;

use alloy::{
    primitives::{aliases::U192, Address, TxHash, B256, U256},
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::blockchain::{
    contracts::{
        deploy_with_deposit_calldata, derive_tank_address, withdraw_calldata, IEntryPoint,
        ENTRY_POINT_V07,
    },
    erc20::{approve_calldata, transfer_calldata},
    ChainClient, ChainError, ConfirmationPolicy, NetworkConfig, OwnerKey, TankBalance, TankNonce,
};

use super::provider::{TankConfig, TankHandle, TankProvider};
use super::quote::Quote;

/// Contract addresses and wait policy shared by every EVM tank.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Gas tank factory
    pub factory: Address,
    /// CREATE2 init code hash of accounts deployed by the factory
    pub init_code_hash: B256,
    /// ERC-4337 entry point used as the nonce source
    pub entry_point: Address,
    /// Account index under the owner (one tank per owner and index)
    pub account_index: u64,
    /// Entry point nonce key
    pub nonce_key: u64,
    /// Confirmation polling and deadline
    pub confirmations: ConfirmationPolicy,
}

impl ProviderSettings {
    pub fn new(factory: Address, init_code_hash: B256) -> Self {
        Self {
            factory,
            init_code_hash,
            entry_point: ENTRY_POINT_V07,
            account_index: 0,
            nonce_key: 0,
            confirmations: ConfirmationPolicy::default(),
        }
    }
}

/// Builds [`EvmTankHandle`]s over HTTP RPC.
pub struct EvmTankProvider {
    settings: ProviderSettings,
}

impl EvmTankProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    /// Tank address of `owner` under these settings.
    pub fn tank_address(&self, owner: Address) -> Address {
        derive_tank_address(
            self.settings.factory,
            self.settings.init_code_hash,
            owner,
            self.settings.account_index,
        )
    }
}

#[async_trait]
impl TankProvider for EvmTankProvider {
    async fn connect(&self, config: &TankConfig) -> Result<Arc<dyn TankHandle>, ChainError> {
        let client = ChainClient::new(
            config.network.clone(),
            &config.rpc_url,
            config.owner.signer().clone(),
        )?;

        Ok(Arc::new(EvmTankHandle {
            client,
            owner: config.owner.clone(),
            address: self.tank_address(config.owner.address()),
            settings: self.settings.clone(),
            ops: Mutex::new(()),
        }))
    }
}

/// Handle to one factory-deployed tank.
pub struct EvmTankHandle {
    client: ChainClient,
    owner: OwnerKey,
    address: Address,
    settings: ProviderSettings,
    /// Serializes every operation that signs with the owner key or consumes
    /// an owner nonce. The HTTP transport gives no ordering guarantee, and
    /// two interleaved sends could race on the same nonce.
    ops: Mutex<()>,
}

impl EvmTankHandle {
    async fn confirm(&self, hash: TxHash, confirmations: u64) -> Result<(), ChainError> {
        self.client
            .wait_for_confirmations(hash, confirmations, self.settings.confirmations)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl TankHandle for EvmTankHandle {
    fn network(&self) -> &NetworkConfig {
        self.client.network()
    }

    fn address(&self) -> Address {
        self.address
    }

    fn owner_address(&self) -> Address {
        self.owner.address()
    }

    async fn is_deployed(&self) -> Result<bool, ChainError> {
        self.client.has_code(self.address).await
    }

    async fn balance(&self, token: Address) -> Result<TankBalance, ChainError> {
        let (amount, decimals) = futures::try_join!(
            self.client.token_balance(token, self.address),
            self.client.token_decimals(token)
        )?;
        Ok(TankBalance { amount, decimals })
    }

    async fn owner_balance(&self, token: Address) -> Result<U256, ChainError> {
        self.client.token_balance(token, self.owner.address()).await
    }

    async fn nonce(&self) -> Result<TankNonce, ChainError> {
        let entry_point =
            IEntryPoint::new(self.settings.entry_point, self.client.provider().clone());
        let nonce = entry_point
            .getNonce(self.address, U192::from(self.settings.nonce_key))
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        Ok(TankNonce {
            key: U256::from(self.settings.nonce_key),
            nonce,
        })
    }

    async fn deploy(&self, token: Address, amount: U256) -> Result<Option<TxHash>, ChainError> {
        let _guard = self.ops.lock().await;

        if self.client.has_code(self.address).await? {
            return Ok(None);
        }

        // The allowance alone changes nothing observable about the tank, so
        // a crash between the two sends leaves it "never attempted".
        let approval = self
            .client
            .send_call(token, approve_calldata(self.settings.factory, amount))
            .await?;
        self.confirm(approval, 0).await?;

        let hash = self
            .client
            .send_call(
                self.settings.factory,
                deploy_with_deposit_calldata(
                    self.owner.address(),
                    self.settings.account_index,
                    token,
                    amount,
                ),
            )
            .await?;
        self.confirm(hash, 0).await?;

        if !self.client.has_code(self.address).await? {
            return Err(ChainError::TransactionFailed(format!(
                "factory did not deploy a tank at {}",
                self.address
            )));
        }

        Ok(Some(hash))
    }

    async fn transfer_to_tank(&self, token: Address, amount: U256) -> Result<TxHash, ChainError> {
        let _guard = self.ops.lock().await;
        self.client
            .send_call(token, transfer_calldata(self.address, amount))
            .await
    }

    async fn wait_for_transaction(
        &self,
        hash: TxHash,
        confirmations: u64,
    ) -> Result<(), ChainError> {
        self.confirm(hash, confirmations).await
    }

    async fn withdraw(
        &self,
        token: Address,
        recipient: Address,
        amount: U256,
        confirmations: u64,
    ) -> Result<TxHash, ChainError> {
        let hash = {
            let _guard = self.ops.lock().await;
            self.client
                .send_call(self.address, withdraw_calldata(token, recipient, amount))
                .await?
        };
        self.confirm(hash, confirmations).await?;
        Ok(hash)
    }

    async fn sign_sponsorship(&self, quote: Quote) -> Result<Quote, ChainError> {
        let _guard = self.ops.lock().await;
        sponsor_quote(self.owner.signer(), self.address, quote).await
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Value>, ChainError> {
        match self.client.transaction_receipt(hash).await? {
            Some(receipt) => serde_json::to_value(&receipt)
                .map(Some)
                .map_err(|e| ChainError::Rpc(format!("Unreadable receipt: {}", e))),
            None => Ok(None),
        }
    }
}

/// Attach the tank's sponsorship to a quote.
///
/// The owner signs the quote hash (EIP-191); the signature, the sponsoring
/// tank and the `sponsored` flag are written under `paymentInfo`. All other
/// fields pass through untouched.
pub async fn sponsor_quote(
    signer: &PrivateKeySigner,
    tank: Address,
    mut quote: Quote,
) -> Result<Quote, ChainError> {
    let hash: B256 = quote
        .hash()
        .ok_or_else(|| ChainError::InvalidQuote("quote has no hash".to_string()))?
        .parse()
        .map_err(|e| ChainError::InvalidQuote(format!("invalid quote hash: {}", e)))?;

    let signature = signer
        .sign_message(hash.as_slice())
        .await
        .map_err(|e| ChainError::Signing(e.to_string()))?;

    let info = quote
        .payment_info_mut()
        .ok_or_else(|| ChainError::InvalidQuote("quote has no paymentInfo".to_string()))?;
    info.insert("sponsored".to_string(), Value::Bool(true));
    info.insert("sponsor".to_string(), Value::String(tank.to_string()));
    info.insert(
        "sponsorSignature".to_string(),
        Value::String(format!("0x{}", alloy::hex::encode(signature.as_bytes()))),
    );

    Ok(quote)
}
