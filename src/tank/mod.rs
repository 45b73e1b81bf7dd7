// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gas tank registry and sponsorship subsystem.
//!
//! - `provider` - capability seam between the service and the chain
//! - `evm` - EVM implementation of the seam
//! - `lifecycle` - deploy-and-fund state machine for one tank
//! - `registry` - in-memory map of provisioned tanks
//! - `orchestrator` - idempotent startup population of the registry
//! - `service` - request-time signing and queries
//! - `operations` - operator create / deposit / withdraw

pub mod evm;
pub mod lifecycle;
pub mod operations;
pub mod orchestrator;
pub mod provider;
pub mod quote;
pub mod registry;
pub mod service;

#[cfg(test)]
pub mod mock;

pub use evm::{EvmTankProvider, ProviderSettings};
pub use lifecycle::{provision, Deployment, ProvisionOutcome, Provisioned};
pub use orchestrator::{initialize, InitReport};
pub use provider::{TankConfig, TankHandle, TankProvider};
pub use quote::Quote;
pub use registry::{TankRecord, TankRegistry};
pub use service::{AllowAll, SponsorshipError, SponsorshipPolicy, SponsorshipService};
