// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BillToType, CheckType, Coordinates, DomainError, PlatformSettings, RateType, Role, UserStatus,
};
use rust_decimal::Decimal;
use time::Duration;

#[test]
fn test_role_round_trip_through_str() {
    for role in [Role::Participant, Role::Provider, Role::Coordinator, Role::Admin] {
        assert_eq!(role.as_str().parse::<Role>(), Ok(role));
    }
}

#[test]
fn test_unknown_role_rejected() {
    let result = "system".parse::<Role>();
    assert_eq!(
        result,
        Err(DomainError::InvalidEnumValue {
            kind: "role",
            value: String::from("system"),
        })
    );
}

#[test]
fn test_role_display_matches_storage_form() {
    assert_eq!(Role::Coordinator.to_string(), "coordinator");
    assert_eq!(UserStatus::Suspended.to_string(), "suspended");
}

#[test]
fn test_enum_defaults() {
    assert_eq!(UserStatus::default(), UserStatus::Active);
    assert_eq!(BillToType::default(), BillToType::SelfManaged);
    assert_eq!(RateType::default(), RateType::Hourly);
}

#[test]
fn test_check_type_parse() {
    assert_eq!("check_in".parse::<CheckType>(), Ok(CheckType::CheckIn));
    assert_eq!("check_out".parse::<CheckType>(), Ok(CheckType::CheckOut));
    assert!("checkin".parse::<CheckType>().is_err());
}

#[test]
fn test_coordinates_range_checked() {
    assert!(Coordinates::new(-33.8688, 151.2093).is_ok());
    assert!(Coordinates::new(90.0, 180.0).is_ok());
    assert!(Coordinates::new(90.1, 0.0).is_err());
    assert!(Coordinates::new(0.0, -180.5).is_err());
    assert!(Coordinates::new(f64::NAN, 0.0).is_err());
}

#[test]
fn test_platform_settings_defaults() {
    let settings = PlatformSettings::default();
    assert!((settings.geofence_radius_meters - 100.0).abs() < f64::EPSILON);
    assert_eq!(settings.gst_rate, Decimal::new(10, 2));
    assert_eq!(settings.platform_fee_rate, Decimal::new(5, 2));
    assert_eq!(settings.provider_response_window, Duration::hours(24));
    assert_eq!(settings.confirmation_window, Duration::hours(48));
    assert_eq!(settings.invoice_due_days, 14);
}
