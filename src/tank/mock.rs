// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scriptable in-memory capability provider for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, TxHash, B256, U256};
use async_trait::async_trait;
use serde_json::Value;

use crate::blockchain::{
    contracts::derive_tank_address, ChainError, NetworkConfig, TankBalance, TankNonce,
};

use super::provider::{TankConfig, TankHandle, TankProvider};
use super::quote::Quote;

const MOCK_FACTORY: Address = address!("fafafafafafafafafafafafafafafafafafafafa");

/// Mutable chain state and call log of a [`MockHandle`].
#[derive(Debug, Clone)]
pub struct MockState {
    pub deployed: bool,
    pub tank_balance: U256,
    pub owner_balance: U256,
    pub decimals: u8,
    pub nonce: TankNonce,
    /// Hash returned by `deploy`; `None` simulates a concurrent deployment.
    pub deploy_hash: Option<TxHash>,
    pub fail_balance: bool,
    pub fail_deploy: bool,
    pub fail_sign: bool,
    pub timeout_deploy: bool,
    pub deploy_calls: usize,
    pub sign_calls: usize,
    pub withdrawals: Vec<(Address, U256, u64)>,
    pub transfers: Vec<U256>,
    pub waits: Vec<(TxHash, u64)>,
    pub receipts: HashMap<TxHash, Value>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            deployed: false,
            tank_balance: U256::ZERO,
            owner_balance: U256::ZERO,
            decimals: 6,
            nonce: TankNonce {
                key: U256::ZERO,
                nonce: U256::ZERO,
            },
            deploy_hash: Some(B256::repeat_byte(0xde)),
            fail_balance: false,
            fail_deploy: false,
            fail_sign: false,
            timeout_deploy: false,
            deploy_calls: 0,
            sign_calls: 0,
            withdrawals: Vec::new(),
            transfers: Vec::new(),
            waits: Vec::new(),
            receipts: HashMap::new(),
        }
    }
}

pub struct MockHandle {
    network: NetworkConfig,
    address: Address,
    owner: Address,
    pub state: Mutex<MockState>,
}

impl MockHandle {
    pub fn new(chain_id: u64, address: Address) -> Self {
        let network = NetworkConfig::known(chain_id).unwrap_or_else(|| NetworkConfig {
            name: format!("chain-{chain_id}"),
            chain_id,
            default_rpc_url: "http://127.0.0.1:8545".to_string(),
            explorer_url: "http://explorer.invalid".to_string(),
        });
        Self {
            network,
            address,
            owner: Address::repeat_byte(0x0e),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_state(self, state: MockState) -> Self {
        *self.state.lock().unwrap() = state;
        self
    }

    pub fn snapshot(&self) -> MockState {
        self.state.lock().unwrap().clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }
}

#[async_trait]
impl TankHandle for MockHandle {
    fn network(&self) -> &NetworkConfig {
        &self.network
    }

    fn address(&self) -> Address {
        self.address
    }

    fn owner_address(&self) -> Address {
        self.owner
    }

    async fn is_deployed(&self) -> Result<bool, ChainError> {
        Ok(self.state.lock().unwrap().deployed)
    }

    async fn balance(&self, _token: Address) -> Result<TankBalance, ChainError> {
        let state = self.state.lock().unwrap();
        if state.fail_balance {
            return Err(ChainError::Rpc("balance unavailable".to_string()));
        }
        Ok(TankBalance {
            amount: state.tank_balance,
            decimals: state.decimals,
        })
    }

    async fn owner_balance(&self, _token: Address) -> Result<U256, ChainError> {
        let state = self.state.lock().unwrap();
        if state.fail_balance {
            return Err(ChainError::Rpc("balance unavailable".to_string()));
        }
        Ok(state.owner_balance)
    }

    async fn nonce(&self) -> Result<TankNonce, ChainError> {
        Ok(self.state.lock().unwrap().nonce)
    }

    async fn deploy(&self, _token: Address, amount: U256) -> Result<Option<TxHash>, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.deploy_calls += 1;
        if state.fail_deploy {
            return Err(ChainError::TransactionFailed("deploy reverted".to_string()));
        }
        if state.timeout_deploy {
            return Err(ChainError::Timeout("deploy not confirmed".to_string()));
        }
        state.deployed = true;
        state.owner_balance = state.owner_balance.saturating_sub(amount);
        state.tank_balance += amount;
        Ok(state.deploy_hash)
    }

    async fn transfer_to_tank(&self, _token: Address, amount: U256) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.transfers.push(amount);
        state.owner_balance = state.owner_balance.saturating_sub(amount);
        state.tank_balance += amount;
        Ok(B256::repeat_byte(0x7d))
    }

    async fn wait_for_transaction(
        &self,
        hash: TxHash,
        confirmations: u64,
    ) -> Result<(), ChainError> {
        self.state.lock().unwrap().waits.push((hash, confirmations));
        Ok(())
    }

    async fn withdraw(
        &self,
        _token: Address,
        recipient: Address,
        amount: U256,
        confirmations: u64,
    ) -> Result<TxHash, ChainError> {
        let mut state = self.state.lock().unwrap();
        state.withdrawals.push((recipient, amount, confirmations));
        state.tank_balance = state.tank_balance.saturating_sub(amount);
        Ok(B256::repeat_byte(0x3d))
    }

    async fn sign_sponsorship(&self, mut quote: Quote) -> Result<Quote, ChainError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sign {
            return Err(ChainError::Signing("signer offline".to_string()));
        }
        state.sign_calls += 1;
        if let Some(info) = quote.payment_info_mut() {
            info.insert("sponsored".to_string(), Value::Bool(true));
        }
        Ok(quote)
    }

    async fn transaction_receipt(&self, hash: TxHash) -> Result<Option<Value>, ChainError> {
        Ok(self.state.lock().unwrap().receipts.get(&hash).cloned())
    }
}

/// Provider handing out one shared [`MockHandle`] per (chain, owner).
///
/// Handles can be pre-registered to script chain state; otherwise a fresh
/// undeployed handle is created on first connect and reused afterwards, so
/// state written by one run is visible to the next.
#[derive(Default)]
pub struct MockProvider {
    handles: Mutex<HashMap<(u64, Address), Arc<MockHandle>>>,
    pub connect_calls: Mutex<usize>,
    pub fail_connect: Mutex<Vec<u64>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tank address the provider derives for `config`.
    pub fn address_for(config: &TankConfig) -> Address {
        derive_tank_address(
            MOCK_FACTORY,
            B256::repeat_byte(0x01),
            config.owner.address(),
            config.chain_id(),
        )
    }

    /// Pre-register the handle for `config` with scripted state.
    pub fn register(&self, config: &TankConfig, state: MockState) -> Arc<MockHandle> {
        let handle = Arc::new(
            MockHandle::new(config.chain_id(), Self::address_for(config)).with_state(state),
        );
        self.handles.lock().unwrap().insert(
            (config.chain_id(), config.owner.address()),
            Arc::clone(&handle),
        );
        handle
    }
}

#[async_trait]
impl TankProvider for MockProvider {
    async fn connect(&self, config: &TankConfig) -> Result<Arc<dyn TankHandle>, ChainError> {
        *self.connect_calls.lock().unwrap() += 1;
        if self.fail_connect.lock().unwrap().contains(&config.chain_id()) {
            return Err(ChainError::InvalidRpcUrl(config.rpc_url.clone()));
        }

        let handle: Arc<dyn TankHandle> = self
            .handles
            .lock()
            .unwrap()
            .entry((config.chain_id(), config.owner.address()))
            .or_insert_with(|| {
                Arc::new(MockHandle::new(config.chain_id(), Self::address_for(config)))
            })
            .clone();
        Ok(handle)
    }
}

/// Tank configuration on `network` for the shared test owner key.
pub fn test_config(network: NetworkConfig, token: Address, deposit: u64) -> TankConfig {
    TankConfig {
        rpc_url: network.default_rpc_url.clone(),
        network,
        token,
        token_decimals: 6,
        deposit_amount: U256::from(deposit),
        owner: crate::blockchain::OwnerKey::from_hex(
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
        )
        .unwrap(),
    }
}
