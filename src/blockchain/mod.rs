// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration module for EVM networks.
//!
//! This module provides functionality for:
//! - Querying ERC-20 token balances and contract deployment
//! - Encoding gas tank factory, account and entry point calls
//! - Broadcasting owner-signed transactions and waiting for confirmations
//! - Owner key parsing

pub mod client;
pub mod contracts;
pub mod erc20;
#[cfg(test)]
pub(crate) mod mock_rpc;
pub mod signing;
pub mod types;
pub mod units;

pub use client::{ChainClient, ChainError, ConfirmationPolicy};
pub use signing::OwnerKey;
pub use types::*;
pub use units::{format_amount, parse_amount, AmountError};
