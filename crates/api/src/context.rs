// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborators shared by every service call.

use ndis_market_domain::PlatformSettings;
use std::sync::Arc;
use time::OffsetDateTime;

use crate::gateway::{MockPaymentGateway, PaymentGateway};
use crate::notifications::NotificationDispatcher;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Settings, adapters, and the clock used by the services.
#[derive(Clone)]
pub struct ServiceContext {
    pub settings: PlatformSettings,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifications: NotificationDispatcher,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("settings", &self.settings)
            .field("mock_mode", &self.gateway.mock_mode())
            .finish_non_exhaustive()
    }
}

impl Default for ServiceContext {
    fn default() -> Self {
        Self {
            settings: PlatformSettings::default(),
            gateway: Arc::new(MockPaymentGateway::new()),
            notifications: NotificationDispatcher::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl ServiceContext {
    pub(crate) fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }
}
