// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application, and loads them into typed configuration.
//! The server and the operator binaries read the same variables.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PRIVATE_KEY` | Gas tank owner key (hex or PEM) | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3004` |
//! | `GAS_TANKS` | JSON array of gas tank entries | Base Sepolia USDC, 5 USDC deposit |
//! | `TANK_FACTORY_ADDRESS` | Gas tank factory contract | Required |
//! | `TANK_INIT_CODE_HASH` | CREATE2 init code hash of tank accounts | Required |
//! | `ENTRY_POINT_ADDRESS` | ERC-4337 entry point used for nonces | v0.7 entry point |
//! | `CONFIRMATION_TIMEOUT_SECS` | Deadline for confirmation waits | `300` |
//! | `CONFIRMATION_POLL_MS` | Receipt polling interval | `2000` |
//! | `DEPOSIT_AMOUNT` | Amount moved by `deposit-gas-tank` | `1.0` |
//! | `INITIAL_DEPOSIT` | Deposit used by `create-gas-tank` | `0.1` |
//! | `WITHDRAW_AMOUNT` | Amount moved by `withdraw-gas-tank` | `0.5` |
//! | `WITHDRAW_ALL` | `true` to empty the tank | `false` |
//! | `RECIPIENT_ADDRESS` | Withdrawal recipient | Owner address |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! ## `GAS_TANKS` entries
//!
//! ```json
//! [{ "chainId": 84532, "token": "0x036C...", "deposit": "5", "decimals": 6,
//!    "rpcUrl": "https://sepolia.base.org" }]
//! ```
//!
//! `deposit` is in whole tokens. `decimals` defaults to 6. `rpcUrl` may be
//! omitted for built-in networks; unknown chains must set it.

use std::net::SocketAddr;
use std::time::Duration;

use alloy::primitives::{Address, B256, U256};
use serde::Deserialize;
use thiserror::Error;

use crate::blockchain::{
    contracts::ENTRY_POINT_V07, parse_amount, ConfirmationPolicy, NetworkConfig, OwnerKey,
    BASE_SEPOLIA_USDC, USDC_DECIMALS,
};
use crate::tank::{operations::WithdrawAmount, ProviderSettings, TankConfig};

/// Environment variable name for the gas tank owner private key.
///
/// The same key owns every configured tank and pays for provisioning. It
/// is never logged.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Environment variable name for the server bind host.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3004;

/// Environment variable name for the gas tank list (JSON array).
///
/// # Default
/// One Base Sepolia USDC tank with a 5 USDC initial deposit.
pub const GAS_TANKS_ENV: &str = "GAS_TANKS";

/// Environment variable name for the gas tank factory address.
pub const TANK_FACTORY_ADDRESS_ENV: &str = "TANK_FACTORY_ADDRESS";

/// Environment variable name for the tank account CREATE2 init code hash.
///
/// Must match the factory, otherwise derived tank addresses are wrong and
/// every tank looks undeployed.
pub const TANK_INIT_CODE_HASH_ENV: &str = "TANK_INIT_CODE_HASH";

/// Environment variable name for the ERC-4337 entry point address.
pub const ENTRY_POINT_ADDRESS_ENV: &str = "ENTRY_POINT_ADDRESS";

/// Environment variable name for the confirmation deadline, in seconds.
pub const CONFIRMATION_TIMEOUT_SECS_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";

/// Environment variable name for the receipt polling interval, in ms.
pub const CONFIRMATION_POLL_MS_ENV: &str = "CONFIRMATION_POLL_MS";

/// Environment variable name for the `deposit-gas-tank` amount.
pub const DEPOSIT_AMOUNT_ENV: &str = "DEPOSIT_AMOUNT";
pub const DEFAULT_DEPOSIT_AMOUNT: &str = "1.0";

/// Environment variable name for the `create-gas-tank` initial deposit.
pub const INITIAL_DEPOSIT_ENV: &str = "INITIAL_DEPOSIT";
pub const DEFAULT_INITIAL_DEPOSIT: &str = "0.1";

/// Environment variable name for the `withdraw-gas-tank` amount.
pub const WITHDRAW_AMOUNT_ENV: &str = "WITHDRAW_AMOUNT";
pub const DEFAULT_WITHDRAW_AMOUNT: &str = "0.5";

/// Environment variable name for the withdraw-everything switch.
pub const WITHDRAW_ALL_ENV: &str = "WITHDRAW_ALL";

/// Environment variable name for the withdrawal recipient.
pub const RECIPIENT_ADDRESS_ENV: &str = "RECIPIENT_ADDRESS";

/// Environment variable name for the log output format.
///
/// # Values
/// - `json` - Structured JSON logs (recommended for production)
/// - `pretty` - Human-readable colored output (default)
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Initial deposit of the built-in tank, in whole tokens.
const DEFAULT_TANK_DEPOSIT: &str = "5";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("no gas tank configured")]
    NoTanks,
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Source of configuration values by variable name.
///
/// Empty values count as unset.
pub trait ConfigSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct Env;

impl ConfigSource for Env {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

fn required(source: &dyn ConfigSource, name: &'static str) -> Result<String, ConfigError> {
    source.get(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T>(source: &dyn ConfigSource, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    source
        .get(name)
        .map(|raw| raw.trim().parse().map_err(|e| ConfigError::invalid(name, e)))
        .transpose()
}

/// One element of `GAS_TANKS`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TankEntry {
    chain_id: u64,
    token: String,
    deposit: String,
    #[serde(default)]
    decimals: Option<u8>,
    #[serde(default)]
    rpc_url: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    explorer_url: Option<String>,
}

impl TankEntry {
    fn into_config(self, owner: &OwnerKey) -> Result<TankConfig, ConfigError> {
        let token: Address = self
            .token
            .parse()
            .map_err(|e| ConfigError::invalid(GAS_TANKS_ENV, format!("token {}: {e}", self.token)))?;
        let decimals = self.decimals.unwrap_or(USDC_DECIMALS);
        let deposit_amount = parse_amount(&self.deposit, decimals)
            .map_err(|e| ConfigError::invalid(GAS_TANKS_ENV, format!("deposit: {e}")))?;

        let network = match NetworkConfig::known(self.chain_id) {
            Some(mut network) => {
                if let Some(name) = self.name {
                    network.name = name;
                }
                if let Some(explorer_url) = self.explorer_url {
                    network.explorer_url = explorer_url;
                }
                network
            }
            None => {
                let rpc_url = self.rpc_url.clone().ok_or_else(|| {
                    ConfigError::invalid(
                        GAS_TANKS_ENV,
                        format!("chain {} is not built in; set rpcUrl", self.chain_id),
                    )
                })?;
                NetworkConfig {
                    name: self.name.unwrap_or_else(|| format!("chain {}", self.chain_id)),
                    chain_id: self.chain_id,
                    default_rpc_url: rpc_url,
                    explorer_url: self.explorer_url.unwrap_or_default(),
                }
            }
        };

        Ok(TankConfig {
            rpc_url: self
                .rpc_url
                .unwrap_or_else(|| network.default_rpc_url.clone()),
            network,
            token,
            token_decimals: decimals,
            deposit_amount,
            owner: owner.clone(),
        })
    }
}

/// Parse the `GAS_TANKS` JSON array into tank configurations for `owner`.
pub fn parse_tank_configs(json: &str, owner: &OwnerKey) -> Result<Vec<TankConfig>, ConfigError> {
    let entries: Vec<TankEntry> =
        serde_json::from_str(json).map_err(|e| ConfigError::invalid(GAS_TANKS_ENV, e))?;
    if entries.is_empty() {
        return Err(ConfigError::NoTanks);
    }
    entries
        .into_iter()
        .map(|entry| entry.into_config(owner))
        .collect()
}

/// The built-in tank list: Base Sepolia USDC with a 5 USDC deposit.
pub fn default_tank_configs(owner: &OwnerKey) -> Result<Vec<TankConfig>, ConfigError> {
    let entry = TankEntry {
        chain_id: NetworkConfig::base_sepolia().chain_id,
        token: BASE_SEPOLIA_USDC.to_string(),
        deposit: DEFAULT_TANK_DEPOSIT.to_string(),
        decimals: Some(USDC_DECIMALS),
        rpc_url: None,
        name: None,
        explorer_url: None,
    };
    Ok(vec![entry.into_config(owner)?])
}

/// Configuration shared by the server and the operator binaries.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub owner: OwnerKey,
    pub tanks: Vec<TankConfig>,
    pub provider: ProviderSettings,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&Env)
    }

    pub fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let owner = OwnerKey::parse(&required(source, PRIVATE_KEY_ENV)?)
            .map_err(|e| ConfigError::invalid(PRIVATE_KEY_ENV, e))?;

        let host = source.get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parsed::<u16>(source, PORT_ENV)?.unwrap_or(DEFAULT_PORT);
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, e))?;

        let tanks = match source.get(GAS_TANKS_ENV) {
            Some(json) => parse_tank_configs(&json, &owner)?,
            None => default_tank_configs(&owner)?,
        };

        Ok(Self {
            bind_addr,
            owner,
            tanks,
            provider: provider_settings(source)?,
        })
    }

    /// The tank the operator binaries act on: the first configured one.
    pub fn primary_tank(&self) -> Result<&TankConfig, ConfigError> {
        self.tanks.first().ok_or(ConfigError::NoTanks)
    }
}

fn provider_settings(source: &dyn ConfigSource) -> Result<ProviderSettings, ConfigError> {
    let factory = parsed::<Address>(source, TANK_FACTORY_ADDRESS_ENV)?
        .ok_or(ConfigError::Missing(TANK_FACTORY_ADDRESS_ENV))?;
    let init_code_hash = parsed::<B256>(source, TANK_INIT_CODE_HASH_ENV)?
        .ok_or(ConfigError::Missing(TANK_INIT_CODE_HASH_ENV))?;

    let mut settings = ProviderSettings::new(factory, init_code_hash);
    settings.entry_point =
        parsed::<Address>(source, ENTRY_POINT_ADDRESS_ENV)?.unwrap_or(ENTRY_POINT_V07);

    let defaults = ConfirmationPolicy::default();
    settings.confirmations = ConfirmationPolicy {
        poll_interval: parsed::<u64>(source, CONFIRMATION_POLL_MS_ENV)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval),
        timeout: parsed::<u64>(source, CONFIRMATION_TIMEOUT_SECS_ENV)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout),
    };

    Ok(settings)
}

/// Read a whole-token amount variable and convert it to base units.
pub fn amount(
    source: &dyn ConfigSource,
    name: &'static str,
    default: &str,
    decimals: u8,
) -> Result<U256, ConfigError> {
    let raw = source.get(name).unwrap_or_else(|| default.to_string());
    let value = parse_amount(&raw, decimals).map_err(|e| ConfigError::invalid(name, e))?;
    if value.is_zero() {
        return Err(ConfigError::invalid(name, "amount must be greater than zero"));
    }
    Ok(value)
}

/// Withdrawal parameters of `withdraw-gas-tank`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawSettings {
    pub amount: WithdrawAmount,
    pub recipient: Option<Address>,
}

impl WithdrawSettings {
    pub fn load(source: &dyn ConfigSource, decimals: u8) -> Result<Self, ConfigError> {
        let withdraw_all = source
            .get(WITHDRAW_ALL_ENV)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let amount = if withdraw_all {
            WithdrawAmount::All
        } else {
            WithdrawAmount::Exact(amount(
                source,
                WITHDRAW_AMOUNT_ENV,
                DEFAULT_WITHDRAW_AMOUNT,
                decimals,
            )?)
        };

        Ok(Self {
            amount,
            recipient: parsed::<Address>(source, RECIPIENT_ADDRESS_ENV)?,
        })
    }
}
