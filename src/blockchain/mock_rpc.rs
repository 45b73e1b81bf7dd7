// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Queued JSON-RPC responses for driving [`ChainClient`] without a node.
//!
//! Responses are consumed in request order, so each test pushes exactly
//! what the code under test will ask for.

use alloy::{
    primitives::{Address, Bytes, TxHash, B256, U64},
    providers::{Provider, ProviderBuilder},
    transports::mock::Asserter,
};
use serde_json::{json, Value};

use super::{ChainClient, NetworkConfig};

/// Client on Base Sepolia whose RPC answers come from `asserter`.
///
/// No fillers are installed: sends go out as plain `eth_sendTransaction`
/// and take exactly one queued response.
pub fn mocked_client(asserter: &Asserter, sender: Address) -> ChainClient {
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_mocked_client(asserter.clone())
        .erased();
    ChainClient::with_provider(NetworkConfig::base_sepolia(), sender, provider)
}

/// `eth_getTransactionReceipt` result for `hash` mined in `block`.
pub fn receipt(hash: TxHash, block: u64, success: bool) -> Value {
    json!({
        "transactionHash": hash,
        "transactionIndex": "0x0",
        "blockHash": B256::repeat_byte(0xbb),
        "blockNumber": format!("{block:#x}"),
        "from": Address::repeat_byte(0x01),
        "to": Address::repeat_byte(0x02),
        "contractAddress": null,
        "gasUsed": "0x5208",
        "cumulativeGasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "status": if success { "0x1" } else { "0x0" },
        "type": "0x2"
    })
}

pub fn push_receipt(asserter: &Asserter, hash: TxHash, block: u64, success: bool) {
    asserter.push_success(&receipt(hash, block, success));
}

/// Receipt not yet available.
pub fn push_pending(asserter: &Asserter) {
    asserter.push_success(&Value::Null);
}

pub fn push_block_number(asserter: &Asserter, head: u64) {
    asserter.push_success(&U64::from(head));
}

pub fn push_code(asserter: &Asserter, deployed: bool) {
    let code = if deployed {
        Bytes::from_static(&[0x60, 0x80, 0x60, 0x40])
    } else {
        Bytes::new()
    };
    asserter.push_success(&code);
}

pub fn push_tx_hash(asserter: &Asserter, hash: TxHash) {
    asserter.push_success(&hash);
}
