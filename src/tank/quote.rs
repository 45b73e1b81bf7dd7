// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sponsorship quote payload.
//!
//! The quote format belongs to the sponsorship protocol, not to this
//! service. It is carried as raw JSON; the only field read here is
//! `paymentInfo.token`, and signing adds the sponsorship fields under
//! `paymentInfo`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Opaque sponsorship quote as exchanged with callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Quote(pub Value);

impl Quote {
    /// Payment token named by the quote, if present.
    pub fn payment_token(&self) -> Option<&str> {
        self.0.get("paymentInfo")?.get("token")?.as_str()
    }

    /// Quote hash the sponsor signs over.
    pub fn hash(&self) -> Option<&str> {
        self.0.get("hash")?.as_str()
    }

    /// Mutable `paymentInfo` object, if the quote has one.
    pub fn payment_info_mut(&mut self) -> Option<&mut serde_json::Map<String, Value>> {
        self.0.get_mut("paymentInfo")?.as_object_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_payment_token_and_hash() {
        let quote = Quote(json!({
            "hash": "0xabc",
            "paymentInfo": { "token": "0xToken", "chainId": "84532" }
        }));
        assert_eq!(quote.payment_token(), Some("0xToken"));
        assert_eq!(quote.hash(), Some("0xabc"));
    }

    #[test]
    fn missing_fields_are_none() {
        let quote = Quote(json!({ "paymentInfo": { "token": 7 } }));
        assert_eq!(quote.payment_token(), None);
        assert_eq!(quote.hash(), None);
        assert_eq!(Quote(json!([])).payment_token(), None);
    }

    #[test]
    fn serializes_transparently() {
        let raw = json!({ "paymentInfo": { "token": "0x01" }, "userOps": [] });
        let quote: Quote = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&quote).unwrap(), raw);
    }
}
