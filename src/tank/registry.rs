// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory gas tank registry.
//!
//! Maps a chain id to the tanks provisioned on that chain, in insertion
//! order. The registry is rebuilt at every start and never persisted.
//! Addresses are compared as parsed 20-byte values, so lookups ignore the
//! hex casing callers use.
//!
//! Resolution by (chain, address) returns the first matching record. This
//! assumes at most one active tank per (chain, token); a second tank for the
//! same token is stored but never routed to.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::RwLock;

use super::provider::TankHandle;

/// One provisioned tank.
#[derive(Clone)]
pub struct TankRecord {
    pub chain_id: u64,
    pub token: Address,
    pub tank_address: Address,
    pub handle: Arc<dyn TankHandle>,
}

impl TankRecord {
    fn same_tank(&self, token: Address, tank_address: Address) -> bool {
        self.token == token && self.tank_address == tank_address
    }
}

impl std::fmt::Debug for TankRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TankRecord")
            .field("chain_id", &self.chain_id)
            .field("token", &self.token)
            .field("tank_address", &self.tank_address)
            .finish_non_exhaustive()
    }
}

/// Process-wide tank registry.
#[derive(Default)]
pub struct TankRegistry {
    tanks: RwLock<BTreeMap<u64, Vec<TankRecord>>>,
}

impl TankRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record with this (chain, token, address) exists.
    pub async fn contains(&self, chain_id: u64, token: Address, tank_address: Address) -> bool {
        self.tanks
            .read()
            .await
            .get(&chain_id)
            .is_some_and(|records| records.iter().any(|r| r.same_tank(token, tank_address)))
    }

    /// Append a record to its chain.
    ///
    /// Returns `false` and leaves the registry unchanged when a record with
    /// the same token and tank address is already present on that chain.
    pub async fn insert(&self, record: TankRecord) -> bool {
        let mut tanks = self.tanks.write().await;
        let records = tanks.entry(record.chain_id).or_default();

        if records
            .iter()
            .any(|r| r.same_tank(record.token, record.tank_address))
        {
            return false;
        }

        records.push(record);
        true
    }

    /// First record on `chain_id` whose tank address is `tank_address`.
    pub async fn lookup(&self, chain_id: u64, tank_address: Address) -> Option<TankRecord> {
        self.tanks
            .read()
            .await
            .get(&chain_id)?
            .iter()
            .find(|r| r.tank_address == tank_address)
            .cloned()
    }

    /// First record registered on `chain_id`.
    pub async fn first(&self, chain_id: u64) -> Option<TankRecord> {
        self.tanks.read().await.get(&chain_id)?.first().cloned()
    }

    /// Records on `chain_id`, in insertion order.
    pub async fn list_by_network(&self, chain_id: u64) -> Vec<TankRecord> {
        self.tanks
            .read()
            .await
            .get(&chain_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Every chain with its records, chains in ascending id order.
    pub async fn snapshot(&self) -> Vec<(u64, Vec<TankRecord>)> {
        self.tanks
            .read()
            .await
            .iter()
            .map(|(chain_id, records)| (*chain_id, records.clone()))
            .collect()
    }

    /// Total number of records.
    pub async fn len(&self) -> usize {
        self.tanks.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
