// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::tank::{SponsorshipService, TankRegistry};

#[derive(Clone)]
pub struct AppState {
    pub sponsorship: Arc<SponsorshipService>,
}

impl AppState {
    pub fn new(sponsorship: SponsorshipService) -> Self {
        Self {
            sponsorship: Arc::new(sponsorship),
        }
    }

    pub fn registry(&self) -> &Arc<TankRegistry> {
        self.sponsorship.registry()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SponsorshipService::new(Arc::new(TankRegistry::new())))
    }
}
