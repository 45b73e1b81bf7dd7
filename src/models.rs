// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Response bodies of the sponsorship API. Field names are camelCase on the
//! wire. Token amounts and nonces are decimal strings so 256-bit values
//! survive JSON clients that parse numbers as doubles.
//!
//! The sign endpoint's request and response body is the opaque
//! [`Quote`](crate::tank::Quote); it is not modelled here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Sponsorship
// =============================================================================

/// Token custodied by a gas tank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Token contract address
    #[schema(example = "0x036CbD53842c5426634e7929541eC2318f3dCF7e")]
    pub address: String,
    /// Tank balance in whole tokens, e.g. `"4.75"`
    #[schema(example = "4.75")]
    pub balance: String,
    /// Token decimals
    #[schema(example = 6)]
    pub decimals: u8,
}

/// One registered gas tank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GasTankInfo {
    #[schema(example = 84532)]
    pub chain_id: u64,
    pub token: TokenInfo,
    /// Address callers pass to the nonce and sign endpoints
    pub gas_tank_address: String,
}

/// Every registered tank, keyed by chain id (as a string).
pub type SponsorshipInfo = BTreeMap<String, Vec<GasTankInfo>>;

/// Account-abstraction nonce of a gas tank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NonceResponse {
    /// Nonce key, decimal
    #[schema(example = "0")]
    pub nonce_key: String,
    /// Nonce value, decimal
    #[schema(example = "12")]
    pub nonce: String,
}

/// Error body returned with every 400 response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ErrorResponse {
    #[schema(example = json!(["Unsupported token"]))]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gas_tank_info_uses_camel_case() {
        let info = GasTankInfo {
            chain_id: 84532,
            token: TokenInfo {
                address: "0x01".to_string(),
                balance: "1.5".to_string(),
                decimals: 6,
            },
            gas_tank_address: "0x02".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "chainId": 84532,
                "token": { "address": "0x01", "balance": "1.5", "decimals": 6 },
                "gasTankAddress": "0x02"
            })
        );
    }

    #[test]
    fn nonce_response_uses_camel_case() {
        let nonce = NonceResponse {
            nonce_key: "0".to_string(),
            nonce: "9007199254740993".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&nonce).unwrap(),
            json!({ "nonceKey": "0", "nonce": "9007199254740993" })
        );
    }
}
