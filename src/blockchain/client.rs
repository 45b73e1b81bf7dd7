// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM chain client for gas tank interactions.

use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
};

use super::erc20::Erc20Contract;
use super::types::NetworkConfig;

/// Chain client bound to one network and one signing account.
///
/// Every transaction it sends is signed by the owner key; reads go through
/// the same provider.
#[derive(Clone)]
pub struct ChainClient {
    /// Network configuration
    network: NetworkConfig,
    /// Address of the signing account
    sender: Address,
    /// Alloy HTTP provider with wallet filler
    provider: DynProvider,
}

impl ChainClient {
    /// Create a new client for the specified network and RPC endpoint.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        signer: PrivateKeySigner,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        Ok(Self {
            network,
            sender,
            provider,
        })
    }

    /// Client over an already built provider, e.g. alloy's mocked transport.
    #[cfg(test)]
    pub(crate) fn with_provider(
        network: NetworkConfig,
        sender: Address,
        provider: DynProvider,
    ) -> Self {
        Self {
            network,
            sender,
            provider,
        }
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Address that signs outgoing transactions.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Underlying provider, for contract bindings.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Whether contract code exists at `address`.
    pub async fn has_code(&self, address: Address) -> Result<bool, ChainError> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(!code.is_empty())
    }

    /// Raw ERC-20 balance of `holder`.
    pub async fn token_balance(&self, token: Address, holder: Address) -> Result<U256, ChainError> {
        Erc20Contract::new(&self.provider, token)
            .balance_of(holder)
            .await
    }

    /// ERC-20 decimals of `token`.
    pub async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        Erc20Contract::new(&self.provider, token).decimals().await
    }

    /// Get the current block number.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    /// Sign and broadcast a contract call, returning its hash.
    ///
    /// Gas, nonce and chain id are filled by the provider.
    pub async fn send_call(&self, to: Address, input: Bytes) -> Result<TxHash, ChainError> {
        let tx = TransactionRequest::default()
            .from(self.sender)
            .to(to)
            .input(input.into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(*pending.tx_hash())
    }

    /// Fetch a transaction receipt, `None` while the transaction is pending
    /// or unknown.
    pub async fn transaction_receipt(
        &self,
        hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::Rpc(format!("Failed to get receipt: {}", e)))
    }

    /// Wait until `hash` is included and buried under `confirmations` blocks.
    ///
    /// `confirmations == 0` returns as soon as the receipt exists. The wait
    /// is bounded by `policy.timeout`; a reverted transaction fails
    /// immediately.
    pub async fn wait_for_confirmations(
        &self,
        hash: TxHash,
        confirmations: u64,
        policy: ConfirmationPolicy,
    ) -> Result<TransactionReceipt, ChainError> {
        let wait = async {
            loop {
                if let Some(receipt) = self.transaction_receipt(hash).await? {
                    if !receipt.status() {
                        return Err(ChainError::TransactionFailed(format!(
                            "Transaction {:?} reverted",
                            hash
                        )));
                    }
                    if let Some(included) = receipt.block_number {
                        let head = self.block_number().await?;
                        if included.saturating_add(confirmations) <= head {
                            return Ok(receipt);
                        }
                    }
                }
                tokio::time::sleep(policy.poll_interval).await;
            }
        };

        tokio::time::timeout(policy.timeout, wait)
            .await
            .map_err(|_| {
                ChainError::Timeout(format!(
                    "{:?} not confirmed by {} block(s) within {}s",
                    hash,
                    confirmations,
                    policy.timeout.as_secs()
                ))
            })?
    }
}

/// How confirmation waits poll and when they give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}
