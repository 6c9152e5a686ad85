// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{BillToType, RateType, Role, UserStatus};
use rust_decimal::Decimal;
use time::OffsetDateTime;

/// A marketplace account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Returns true if the account may transact.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// The participant side of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantProfile {
    pub id: i64,
    pub user_id: i64,
    pub ndis_number: Option<String>,
    pub plan_manager_id: Option<String>,
    pub bill_to_type: BillToType,
}

/// The provider side of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub id: i64,
    pub user_id: i64,
    pub business_name: String,
    pub abn: Option<String>,
    pub gst_registered: bool,
}

/// A priced service offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderService {
    pub id: i64,
    pub provider_id: i64,
    pub service_type: String,
    pub name: String,
    pub ndis_item_number: Option<String>,
    pub base_rate: Option<Decimal>,
    pub weekday_rate: Option<Decimal>,
    pub rate_type: RateType,
    pub unit: String,
}
