// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owner key handling.
//!
//! The gas tank owner key is accepted either as a hex string (the usual
//! `PRIVATE_KEY` form, with or without `0x`) or as a SEC1/PKCS#8 PEM file
//! body. Whatever the input, it ends up as an alloy [`PrivateKeySigner`]
//! wrapped in [`OwnerKey`], whose `Debug` output never shows key material.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use k256::SecretKey;

use super::client::ChainError;

/// Owner credential of a gas tank.
#[derive(Clone)]
pub struct OwnerKey {
    signer: PrivateKeySigner,
}

impl OwnerKey {
    /// Parse a hex or PEM encoded secp256k1 private key.
    pub fn parse(raw: &str) -> Result<Self, ChainError> {
        let raw = raw.trim();
        if raw.starts_with("-----BEGIN") {
            Self::from_pem(raw.as_bytes())
        } else {
            Self::from_hex(raw)
        }
    }

    /// Parse a hex-encoded private key (64 hex characters, optional 0x).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, ChainError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| ChainError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self { signer })
    }

    /// Parse a PEM-encoded private key.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self, ChainError> {
        let hex_key = pem_to_hex(pem_bytes)?;
        Self::from_hex(&hex_key)
    }

    /// EOA address controlled by this key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signer for transactions and messages.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerKey")
            .field("address", &self.address())
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Parse a private key from PEM format to hex string.
///
/// SEC1 (`EC PRIVATE KEY`) is tried first, then PKCS#8 (`PRIVATE KEY`).
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, ChainError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    // Parse the PEM to get the DER-encoded key
    let pem = pem::parse(pem_str)
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}
