// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{address, Address, TxHash, U256};

use super::units::format_amount;

/// EVM network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// Public RPC endpoint used when a tank entry does not set one
    pub default_rpc_url: String,
    /// Block explorer URL
    pub explorer_url: String,
}

impl NetworkConfig {
    /// Base Sepolia testnet.
    pub fn base_sepolia() -> Self {
        Self {
            name: "Base Sepolia".to_string(),
            chain_id: BASE_SEPOLIA_CHAIN_ID,
            default_rpc_url: "https://sepolia.base.org".to_string(),
            explorer_url: "https://sepolia.basescan.org".to_string(),
        }
    }

    /// Base mainnet.
    pub fn base() -> Self {
        Self {
            name: "Base".to_string(),
            chain_id: 8453,
            default_rpc_url: "https://mainnet.base.org".to_string(),
            explorer_url: "https://basescan.org".to_string(),
        }
    }

    /// Ethereum Sepolia testnet.
    pub fn sepolia() -> Self {
        Self {
            name: "Sepolia".to_string(),
            chain_id: 11_155_111,
            default_rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            explorer_url: "https://sepolia.etherscan.io".to_string(),
        }
    }

    /// Look up a built-in network by chain id.
    pub fn known(chain_id: u64) -> Option<Self> {
        [Self::base_sepolia(), Self::base(), Self::sepolia()]
            .into_iter()
            .find(|network| network.chain_id == chain_id)
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, hash: &TxHash) -> String {
        format!("{}/tx/{:?}", self.explorer_url, hash)
    }
}

/// Chain id of Base Sepolia, the default sponsorship network.
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84_532;

/// Circle test USDC on Base Sepolia.
pub const BASE_SEPOLIA_USDC: Address = address!("036cbd53842c5426634e7929541ec2318f3dcf7e");

/// Decimals of USDC on every supported network.
pub const USDC_DECIMALS: u8 = 6;

/// Token balance held by an account, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankBalance {
    /// Balance in the token's smallest unit
    pub amount: U256,
    /// Token decimals
    pub decimals: u8,
}

impl TankBalance {
    /// Human-readable decimal rendering of the balance.
    pub fn formatted(&self) -> String {
        format_amount(self.amount, self.decimals)
    }
}

/// Account-abstraction sequence number of a tank.
///
/// Both halves are full 256-bit values; callers render them as decimal
/// strings so nothing is lost on the way through JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankNonce {
    pub key: U256,
    pub nonce: U256,
}
