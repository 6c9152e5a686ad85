// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::GpsReading;
use ndis_market_audit::Actor;
use ndis_market_domain::{
    Address, BillToType, Booking, BookingStatus, Coordinates, Invoice, InvoiceStatus,
    InvoiceTotals, ParticipantProfile, PayoutStatus, ProviderProfile, ProviderService, RateType,
    Role,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::{date, datetime};

pub const PARTICIPANT_USER_ID: i64 = 10;
pub const PROVIDER_USER_ID: i64 = 20;

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-02 09:00 UTC)
}

pub fn participant_actor() -> Actor {
    Actor::user(PARTICIPANT_USER_ID, Role::Participant)
}

pub fn provider_actor() -> Actor {
    Actor::user(PROVIDER_USER_ID, Role::Provider)
}

pub fn site() -> Coordinates {
    Coordinates::new(-33.8688, 151.2093).unwrap()
}

pub fn on_site_reading() -> GpsReading {
    GpsReading {
        location: Coordinates::new(-33.8689, 151.2093).unwrap(),
        accuracy_meters: Some(5.0),
        photo_url: None,
    }
}

pub fn off_site_reading() -> GpsReading {
    GpsReading {
        location: Coordinates::new(-33.8788, 151.2093).unwrap(),
        accuracy_meters: Some(12.0),
        photo_url: Some(String::from("https://photos.example/1.jpg")),
    }
}

pub fn create_test_participant() -> ParticipantProfile {
    ParticipantProfile {
        id: 1,
        user_id: PARTICIPANT_USER_ID,
        ndis_number: Some(String::from("430000001")),
        plan_manager_id: Some(String::from("PM-77")),
        bill_to_type: BillToType::PlanManaged,
    }
}

pub fn create_test_provider(gst_registered: bool) -> ProviderProfile {
    ProviderProfile {
        id: 2,
        user_id: PROVIDER_USER_ID,
        business_name: String::from("Harbour Care"),
        abn: Some(String::from("51824753556")),
        gst_registered,
    }
}

pub fn create_test_service() -> ProviderService {
    ProviderService {
        id: 3,
        provider_id: 2,
        service_type: String::from("personal_care"),
        name: String::from("Morning routine"),
        ndis_item_number: Some(String::from("01_011_0107_1_1")),
        base_rate: Some(Decimal::from(50)),
        weekday_rate: Some(Decimal::from(55)),
        rate_type: RateType::Hourly,
        unit: String::from("hour"),
    }
}

pub fn create_test_booking(status: BookingStatus) -> Booking {
    let created: OffsetDateTime = datetime!(2026-03-01 08:00 UTC);
    Booking {
        id: 100,
        booking_number: String::from("VC202603-0042"),
        participant_id: 1,
        provider_id: 2,
        provider_service_id: 3,
        created_by_user_id: PARTICIPANT_USER_ID,
        created_by_role: Role::Participant,
        service_type: String::from("personal_care"),
        scheduled_date: date!(2026 - 03 - 02),
        scheduled_start_time: String::from("09:00"),
        scheduled_end_time: String::from("12:00"),
        scheduled_duration_hours: Decimal::from(3),
        address: Address {
            line1: String::from("1 George St"),
            line2: None,
            suburb: String::from("Sydney"),
            state: String::from("NSW"),
            postcode: String::from("2000"),
        },
        service_location: Some(site()),
        notes: None,
        quoted_rate: Decimal::from(55),
        rate_type: RateType::Hourly,
        estimated_total: Decimal::from(165),
        status,
        provider_response_deadline: datetime!(2026-03-02 08:00 UTC),
        provider_response_at: None,
        decline_reason: None,
        actual_start_time: None,
        actual_end_time: None,
        actual_duration_hours: None,
        confirmation_deadline: None,
        provider_confirmed_at: None,
        provider_confirmed_by: None,
        participant_confirmed_at: None,
        participant_confirmed_by: None,
        cancelled_at: None,
        cancelled_by: None,
        cancellation_reason: None,
        created_at: created,
        updated_at: created,
        version: 1,
    }
}

pub fn create_test_invoice(status: InvoiceStatus) -> Invoice {
    let created: OffsetDateTime = datetime!(2026-03-03 10:00 UTC);
    Invoice {
        id: 500,
        invoice_number: String::from("INV-202603-0001"),
        provider_id: 2,
        participant_id: 1,
        bill_to_type: BillToType::PlanManaged,
        plan_manager_id: Some(String::from("PM-77")),
        totals: InvoiceTotals {
            subtotal: Decimal::from(200),
            gst_amount: Decimal::from(20),
            platform_fee: Decimal::from(10),
            platform_fee_gst: Decimal::ONE,
            total_amount: Decimal::from(220),
            provider_payout: Decimal::from(209),
        },
        invoice_date: created,
        due_date: date!(2026 - 03 - 17),
        status,
        payout_status: PayoutStatus::Pending,
        sent_at: None,
        viewed_at: None,
        paid_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        notes: None,
        created_at: created,
        updated_at: created,
    }
}
