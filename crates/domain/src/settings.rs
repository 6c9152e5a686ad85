// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use time::Duration;

/// Default geofence radius around a service location, in meters.
pub const DEFAULT_GEOFENCE_RADIUS_METERS: f64 = 100.0;

/// Platform-wide constants that drive pricing, deadlines, and geofencing.
///
/// One value per concern. The server builds this from its CLI/env
/// configuration and every aggregate reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformSettings {
    /// Maximum distance (meters) at which a check-in counts as on site.
    pub geofence_radius_meters: f64,
    /// GST rate applied to GST-applicable lines and to the platform fee.
    pub gst_rate: Decimal,
    /// Share of the invoice subtotal retained by the platform.
    pub platform_fee_rate: Decimal,
    /// Time a provider has to accept or decline a new booking.
    pub provider_response_window: Duration,
    /// Time both parties have to confirm after check-out.
    pub confirmation_window: Duration,
    /// Days after the invoice date that payment falls due.
    pub invoice_due_days: i64,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            geofence_radius_meters: DEFAULT_GEOFENCE_RADIUS_METERS,
            gst_rate: Decimal::new(10, 2),
            platform_fee_rate: Decimal::new(5, 2),
            provider_response_window: Duration::hours(24),
            confirmation_window: Duration::hours(48),
            invoice_due_days: 14,
        }
    }
}
