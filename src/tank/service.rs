// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sponsorship signing and query operations.
//!
//! Request-time logic behind the REST surface. Path parameters arrive as
//! raw strings and are validated here, so the HTTP layer only maps
//! [`SponsorshipError`] to a response.
//!
//! ## Trust boundary
//!
//! Anyone who can reach the service and names a registered tank with a
//! quote for its token gets that quote co-signed. Restricting this (API
//! keys, spending limits) is the job of a [`SponsorshipPolicy`]; the
//! default [`AllowAll`] policy accepts every request.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{GasTankInfo, NonceResponse, SponsorshipInfo, TokenInfo};

use super::quote::Quote;
use super::registry::{TankRecord, TankRegistry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SponsorshipError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Gas tank not found")]
    TankNotFound,

    #[error("No gas tanks found for chain {0}")]
    NoTanksFound(u64),

    #[error("Unsupported token")]
    UnsupportedToken,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Receipt not found for {0}")]
    ReceiptNotFound(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Authorization hook run before a quote is signed.
#[async_trait]
pub trait SponsorshipPolicy: Send + Sync {
    /// `Err(reason)` rejects the request as unauthorized.
    async fn authorize(&self, tank: &TankRecord, quote: &Quote) -> Result<(), String>;
}

/// Policy that accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

#[async_trait]
impl SponsorshipPolicy for AllowAll {
    async fn authorize(&self, _tank: &TankRecord, _quote: &Quote) -> Result<(), String> {
        Ok(())
    }
}

/// Parse a chain id path segment: a positive decimal integer.
pub fn parse_chain_id(raw: &str) -> Result<u64, SponsorshipError> {
    let invalid = || SponsorshipError::InvalidRequest(format!("invalid chain id: {raw}"));

    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(chain_id) => Ok(chain_id),
    }
}

/// Parse a `0x`-prefixed 20-byte address, any casing.
pub fn parse_address(raw: &str) -> Result<Address, SponsorshipError> {
    parse_hex(raw, 40)
        .and_then(|hex| hex.parse().ok())
        .ok_or_else(|| SponsorshipError::InvalidRequest(format!("invalid address: {raw}")))
}

/// Parse a `0x`-prefixed 32-byte transaction hash.
pub fn parse_tx_hash(raw: &str) -> Result<TxHash, SponsorshipError> {
    parse_hex(raw, 64)
        .and_then(|hex| hex.parse().ok())
        .ok_or_else(|| {
            SponsorshipError::InvalidRequest(format!("invalid transaction hash: {raw}"))
        })
}

fn parse_hex(raw: &str, digits: usize) -> Option<&str> {
    let hex = raw.strip_prefix("0x")?;
    (hex.len() == digits && hex.bytes().all(|b| b.is_ascii_hexdigit())).then_some(raw)
}

/// Signing and query operations over the tank registry.
#[derive(Clone)]
pub struct SponsorshipService {
    registry: Arc<TankRegistry>,
    policy: Arc<dyn SponsorshipPolicy>,
}

impl SponsorshipService {
    /// Service with the [`AllowAll`] policy.
    pub fn new(registry: Arc<TankRegistry>) -> Self {
        Self::with_policy(registry, Arc::new(AllowAll))
    }

    pub fn with_policy(registry: Arc<TankRegistry>, policy: Arc<dyn SponsorshipPolicy>) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &Arc<TankRegistry> {
        &self.registry
    }

    async fn resolve(&self, chain_id: &str, tank: &str) -> Result<TankRecord, SponsorshipError> {
        let chain_id = parse_chain_id(chain_id)?;
        let tank = parse_address(tank)?;
        self.registry
            .lookup(chain_id, tank)
            .await
            .ok_or(SponsorshipError::TankNotFound)
    }

    /// Co-sign `quote` with the tank at (`chain_id`, `tank`).
    ///
    /// The quote's payment token must be the tank's token; otherwise the
    /// tank is never asked to sign.
    pub async fn sign(
        &self,
        chain_id: &str,
        tank: &str,
        quote: Quote,
    ) -> Result<Quote, SponsorshipError> {
        let record = self.resolve(chain_id, tank).await?;

        let token = quote.payment_token().ok_or_else(|| {
            SponsorshipError::InvalidRequest("quote has no paymentInfo.token".to_string())
        })?;
        if token.parse::<Address>().ok() != Some(record.token) {
            debug!(
                chain_id = record.chain_id,
                tank = %record.tank_address,
                token,
                "Rejected quote for foreign token"
            );
            return Err(SponsorshipError::UnsupportedToken);
        }

        self.policy
            .authorize(&record, &quote)
            .await
            .map_err(SponsorshipError::Unauthorized)?;

        let signed = record.handle.sign_sponsorship(quote).await.map_err(|e| {
            warn!(
                chain_id = record.chain_id,
                tank = %record.tank_address,
                error = %e,
                "Sponsorship signing failed"
            );
            SponsorshipError::SigningFailed(e.to_string())
        })?;

        info!(
            chain_id = record.chain_id,
            tank = %record.tank_address,
            "Sponsorship quote signed"
        );
        Ok(signed)
    }

    /// Account-abstraction nonce of the tank at (`chain_id`, `tank`).
    pub async fn nonce(
        &self,
        chain_id: &str,
        tank: &str,
    ) -> Result<NonceResponse, SponsorshipError> {
        let record = self.resolve(chain_id, tank).await?;
        let nonce = record
            .handle
            .nonce()
            .await
            .map_err(|e| SponsorshipError::QueryFailed(e.to_string()))?;

        Ok(NonceResponse {
            nonce_key: nonce.key.to_string(),
            nonce: nonce.nonce.to_string(),
        })
    }

    /// Raw receipt of `hash`, fetched through the first tank on `chain_id`.
    pub async fn receipt(&self, chain_id: &str, hash: &str) -> Result<Value, SponsorshipError> {
        let chain_id = parse_chain_id(chain_id)?;
        let hash = parse_tx_hash(hash)?;
        let record = self
            .registry
            .first(chain_id)
            .await
            .ok_or(SponsorshipError::NoTanksFound(chain_id))?;

        record
            .handle
            .transaction_receipt(hash)
            .await
            .map_err(|e| SponsorshipError::QueryFailed(e.to_string()))?
            .ok_or_else(|| SponsorshipError::ReceiptNotFound(format!("{hash:?}")))
    }

    /// Balance of every registered tank, keyed by chain id.
    ///
    /// Balances are fetched concurrently; if any fetch fails the whole
    /// call fails.
    pub async fn info(&self) -> Result<SponsorshipInfo, SponsorshipError> {
        let chains = self.registry.snapshot().await;

        let entries = try_join_all(chains.iter().map(|(chain_id, records)| async move {
            let tanks = try_join_all(records.iter().map(tank_info)).await?;
            Ok::<_, SponsorshipError>((chain_id.to_string(), tanks))
        }))
        .await?;

        Ok(entries.into_iter().collect())
    }
}

async fn tank_info(record: &TankRecord) -> Result<GasTankInfo, SponsorshipError> {
    let balance = record.handle.balance(record.token).await.map_err(|e| {
        warn!(
            chain_id = record.chain_id,
            tank = %record.tank_address,
            error = %e,
            "Failed to read gas tank balance"
        );
        SponsorshipError::QueryFailed(e.to_string())
    })?;

    Ok(GasTankInfo {
        chain_id: record.chain_id,
        token: TokenInfo {
            address: record.token.to_string(),
            balance: balance.formatted(),
            decimals: balance.decimals,
        },
        gas_tank_address: record.tank_address.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{TankNonce, BASE_SEPOLIA_USDC};
    use crate::tank::mock::{MockHandle, MockState};
    use crate::tank::provider::TankHandle;
    use alloy::primitives::{B256, U256};
    use serde_json::json;

    const TANK: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";

    fn tank_address() -> Address {
        TANK.parse().unwrap()
    }

    async fn service_with(handle: Arc<MockHandle>, token: Address) -> SponsorshipService {
        let registry = Arc::new(TankRegistry::new());
        registry
            .insert(TankRecord {
                chain_id: 84_532,
                token,
                tank_address: handle.address(),
                handle,
            })
            .await;
        SponsorshipService::new(registry)
    }

    fn mock() -> Arc<MockHandle> {
        Arc::new(MockHandle::new(84_532, tank_address()))
    }

    fn quote(token: &str) -> Quote {
        Quote(json!({
            "hash": "0x01",
            "paymentInfo": { "token": token, "amount": "10" }
        }))
    }

    #[test]
    fn validates_path_parameters() {
        assert_eq!(parse_chain_id("84532"), Ok(84_532));
        for bad in ["", "0", "-1", "+1", "1.5", "abc", "99999999999999999999999"] {
            assert!(parse_chain_id(bad).is_err(), "{bad:?} accepted");
        }

        assert_eq!(parse_address(TANK), Ok(tank_address()));
        let upper = TANK.to_uppercase().replace("0X", "0x");
        assert_eq!(parse_address(&upper), Ok(tank_address()));
        for bad in [
            "abcdefabcdefabcdefabcdefabcdefabcdefabcd",
            "0xabcdef",
            "0xgbcdefabcdefabcdefabcdefabcdefabcdefabcd",
            "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd00",
        ] {
            assert!(parse_address(bad).is_err(), "{bad:?} accepted");
        }

        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(parse_tx_hash(&hash), Ok(B256::repeat_byte(0xab)));
        assert!(parse_tx_hash("0xabc").is_err());
        assert!(parse_tx_hash(&"ab".repeat(32)).is_err());
    }

    #[tokio::test]
    async fn signs_quote_for_tank_token_in_any_casing() {
        let handle = mock();
        let service = service_with(handle.clone(), BASE_SEPOLIA_USDC).await;

        let lower = format!("{:#x}", BASE_SEPOLIA_USDC);
        let upper = format!("0x{}", lower[2..].to_uppercase());
        let checksummed = BASE_SEPOLIA_USDC.to_checksum(None);

        for token in [&lower, &upper, &checksummed] {
            let signed = service.sign("84532", TANK, quote(token)).await.expect("signed");
            assert_eq!(signed.0["paymentInfo"]["sponsored"], json!(true));
            assert_eq!(signed.0["paymentInfo"]["amount"], json!("10"));
        }
        assert_eq!(handle.snapshot().sign_calls, 3);
    }

    #[tokio::test]
    async fn foreign_token_never_reaches_signer() {
        let handle = mock();
        let service = service_with(handle.clone(), BASE_SEPOLIA_USDC).await;
        let other = Address::repeat_byte(0x77);

        for token in [
            format!("{other:#x}"),
            other.to_checksum(None),
            format!("0x{}", "77".repeat(20).to_uppercase()),
            "not-an-address".to_string(),
        ] {
            assert_eq!(
                service.sign("84532", TANK, quote(&token)).await,
                Err(SponsorshipError::UnsupportedToken)
            );
        }

        let no_token = Quote(json!({ "paymentInfo": {} }));
        assert!(matches!(
            service.sign("84532", TANK, no_token).await,
            Err(SponsorshipError::InvalidRequest(_))
        ));
        assert_eq!(handle.snapshot().sign_calls, 0);
    }

    #[tokio::test]
    async fn sign_resolves_tank_before_anything_else() {
        let handle = mock();
        let service = service_with(handle.clone(), BASE_SEPOLIA_USDC).await;
        let token = format!("{:#x}", BASE_SEPOLIA_USDC);

        assert!(matches!(
            service.sign("zero", TANK, quote(&token)).await,
            Err(SponsorshipError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.sign("84532", "0x1234", quote(&token)).await,
            Err(SponsorshipError::InvalidRequest(_))
        ));
        assert_eq!(
            service.sign("1", TANK, quote(&token)).await,
            Err(SponsorshipError::TankNotFound)
        );
        assert_eq!(
            service
                .sign("84532", &format!("{:#x}", Address::repeat_byte(0x01)), quote(&token))
                .await,
            Err(SponsorshipError::TankNotFound)
        );
    }

    #[tokio::test]
    async fn signing_errors_are_reported() {
        let handle = mock();
        handle.update(|s| s.fail_sign = true);
        let service = service_with(handle, BASE_SEPOLIA_USDC).await;

        let result = service
            .sign("84532", TANK, quote(&format!("{:#x}", BASE_SEPOLIA_USDC)))
            .await;
        assert!(matches!(result, Err(SponsorshipError::SigningFailed(_))));
    }

    struct DenyAll;

    #[async_trait]
    impl SponsorshipPolicy for DenyAll {
        async fn authorize(&self, _tank: &TankRecord, _quote: &Quote) -> Result<(), String> {
            Err("sponsorship paused".to_string())
        }
    }

    #[tokio::test]
    async fn policy_can_refuse() {
        let handle = mock();
        let base = service_with(handle.clone(), BASE_SEPOLIA_USDC).await;
        let service =
            SponsorshipService::with_policy(Arc::clone(base.registry()), Arc::new(DenyAll));

        let result = service
            .sign("84532", TANK, quote(&format!("{:#x}", BASE_SEPOLIA_USDC)))
            .await;
        assert_eq!(
            result,
            Err(SponsorshipError::Unauthorized("sponsorship paused".to_string()))
        );
        assert_eq!(handle.snapshot().sign_calls, 0);
    }

    #[tokio::test]
    async fn nonce_keeps_full_precision() {
        let handle = mock();
        let big = U256::from(1u64 << 53) + U256::from(1u64);
        handle.update(|s| {
            s.nonce = TankNonce {
                key: U256::from(7u64),
                nonce: big,
            }
        });
        let service = service_with(handle, BASE_SEPOLIA_USDC).await;

        let response = service.nonce("84532", TANK).await.unwrap();
        assert_eq!(response.nonce, "9007199254740993");
        assert_eq!(response.nonce.parse::<U256>().unwrap(), big);
        assert_eq!(response.nonce_key, "7");

        assert_eq!(
            service.nonce("84532", &format!("{:#x}", Address::ZERO)).await,
            Err(SponsorshipError::TankNotFound)
        );
    }

    #[tokio::test]
    async fn receipt_uses_first_tank_on_chain() {
        let first = mock();
        let second = Arc::new(MockHandle::new(84_532, Address::repeat_byte(0x02)));
        let hash = B256::repeat_byte(0x99);
        first.update(|s| {
            s.receipts.insert(hash, json!({ "status": "0x1", "from": "first" }));
        });
        second.update(|s| {
            s.receipts.insert(hash, json!({ "status": "0x1", "from": "second" }));
        });

        let registry = Arc::new(TankRegistry::new());
        for (handle, token) in [(first, BASE_SEPOLIA_USDC), (second, Address::repeat_byte(0x05))] {
            registry
                .insert(TankRecord {
                    chain_id: 84_532,
                    token,
                    tank_address: handle.address(),
                    handle,
                })
                .await;
        }
        let service = SponsorshipService::new(registry);
        let raw_hash = format!("{hash:?}");

        let receipt = service.receipt("84532", &raw_hash).await.unwrap();
        assert_eq!(receipt["from"], json!("first"));

        assert!(matches!(
            service.receipt("84532", &format!("0x{}", "11".repeat(32))).await,
            Err(SponsorshipError::ReceiptNotFound(_))
        ));
        assert_eq!(
            service.receipt("1", &raw_hash).await,
            Err(SponsorshipError::NoTanksFound(1))
        );
        assert!(matches!(
            service.receipt("84532", "0x99").await,
            Err(SponsorshipError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn info_reports_every_tank() {
        let handle = mock();
        handle.update(|s| s.tank_balance = U256::from(4_750_000u64));
        let service = service_with(handle, BASE_SEPOLIA_USDC).await;

        let info = service.info().await.unwrap();
        let tanks = &info["84532"];
        assert_eq!(tanks.len(), 1);
        assert_eq!(tanks[0].chain_id, 84_532);
        assert_eq!(tanks[0].token.balance, "4.75");
        assert_eq!(tanks[0].token.decimals, 6);
        assert_eq!(tanks[0].token.address, BASE_SEPOLIA_USDC.to_string());
        assert_eq!(tanks[0].gas_tank_address, tank_address().to_string());

        let empty = SponsorshipService::new(Arc::new(TankRegistry::new()));
        assert!(empty.info().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn info_fails_when_any_balance_fails() {
        let healthy = mock();
        let broken = Arc::new(
            MockHandle::new(1, Address::repeat_byte(0x03)).with_state(MockState {
                fail_balance: true,
                ..MockState::default()
            }),
        );

        let registry = Arc::new(TankRegistry::new());
        for (chain_id, handle) in [(84_532, healthy), (1, broken)] {
            registry
                .insert(TankRecord {
                    chain_id,
                    token: BASE_SEPOLIA_USDC,
                    tank_address: handle.address(),
                    handle,
                })
                .await;
        }

        let result = SponsorshipService::new(registry).info().await;
        assert!(matches!(result, Err(SponsorshipError::QueryFailed(_))));
    }
}
