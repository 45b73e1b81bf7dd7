// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable token amounts and base units.

use alloy::primitives::U256;

/// Errors produced while parsing an amount string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Invalid amount format: {0}")]
    Format(String),

    #[error("Too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("Amount overflow")]
    Overflow,
}

/// Parse a human-readable amount to token base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (6 for USDC, 18 for ETH)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 || parts[0].is_empty() {
        return Err(AmountError::Format(amount.to_string()));
    }

    let whole = U256::from_str_radix(parts[0], 10)
        .map_err(|_| AmountError::Format(amount.to_string()))?;

    let fraction = match parts.get(1) {
        Some(dec_str) => {
            if dec_str.len() > decimals as usize {
                return Err(AmountError::TooManyDecimals(decimals));
            }
            if dec_str.is_empty() || !dec_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(AmountError::Format(amount.to_string()));
            }
            // Pad with zeros to match decimals
            let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
            U256::from_str_radix(&padded, 10)
                .map_err(|_| AmountError::Format(amount.to_string()))?
        }
        None => U256::ZERO,
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow)
}

/// Format base units to a human-readable amount without truncation.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}
