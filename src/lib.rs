// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gas Tank Sponsorship - Self-hosted gas sponsorship service
//!
//! Provisions one custodial gas tank account per (network, token) at
//! startup and co-signs payment sponsorship quotes for callers. The owner
//! key stays inside the process.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - EVM chain client, contract bindings and owner keys
//! - `tank` - Gas tank lifecycle, registry and sponsorship signing
//! - `config` - Environment configuration
//! - `logging` - Tracing subscriber setup

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod shutdown;
pub mod state;
pub mod tank;
