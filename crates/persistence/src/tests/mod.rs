// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;
mod payment_tests;

use crate::{NewParticipantProfile, NewProviderProfile, NewProviderService, NewUser, Persistence};
use ndis_market::{
    BookingCommand, BookingDraft, BookingRequest, BookingTransition, GpsReading, InvoiceDraft,
    InvoiceParties, apply_booking, draft_booking, draft_invoice,
};
use ndis_market_audit::Actor;
use ndis_market_domain::{
    Address, BillToType, Booking, Coordinates, LineItemInput, ParticipantProfile,
    PlatformSettings, ProviderProfile, ProviderService, RateType, Role, UserStatus,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use time::macros::{date, datetime};

/// A directory with one participant, one provider, and one service.
pub struct Marketplace {
    pub participant_user_id: i64,
    pub provider_user_id: i64,
    pub participant: ParticipantProfile,
    pub provider: ProviderProfile,
    pub service: ProviderService,
}

impl Marketplace {
    pub const fn participant_actor(&self) -> Actor {
        Actor::user(self.participant_user_id, Role::Participant)
    }

    pub const fn provider_actor(&self) -> Actor {
        Actor::user(self.provider_user_id, Role::Provider)
    }
}

pub fn now() -> OffsetDateTime {
    datetime!(2026-03-02 09:00 UTC)
}

pub fn site() -> Coordinates {
    Coordinates::new(-33.8688, 151.2093).unwrap()
}

pub fn register_user(persistence: &mut Persistence, email: &str, role: Role) -> i64 {
    persistence
        .insert_user(&NewUser {
            email: email.to_string(),
            display_name: format!("User {email}"),
            phone: None,
            role,
            status: UserStatus::Active,
            created_at: now(),
        })
        .unwrap()
}

pub fn seed_marketplace(persistence: &mut Persistence, gst_registered: bool) -> Marketplace {
    let participant_user_id: i64 =
        register_user(persistence, "pat@example.com", Role::Participant);
    let provider_user_id: i64 = register_user(persistence, "care@example.com", Role::Provider);

    let participant_id: i64 = persistence
        .insert_participant(&NewParticipantProfile {
            user_id: participant_user_id,
            ndis_number: Some(String::from("430000001")),
            plan_manager_id: Some(String::from("PM-77")),
            bill_to_type: BillToType::PlanManaged,
        })
        .unwrap();
    let provider_id: i64 = persistence
        .insert_provider(&NewProviderProfile {
            user_id: provider_user_id,
            business_name: String::from("Harbour Care"),
            abn: None,
            gst_registered,
        })
        .unwrap();
    let service_id: i64 = persistence
        .insert_provider_service(&NewProviderService {
            provider_id,
            service_type: String::from("personal_care"),
            name: String::from("Morning routine"),
            ndis_item_number: Some(String::from("01_011_0107_1_1")),
            base_rate: Some(Decimal::from(50)),
            weekday_rate: Some(Decimal::new(5550, 2)),
            rate_type: RateType::Hourly,
            unit: String::from("hour"),
        })
        .unwrap();

    Marketplace {
        participant_user_id,
        provider_user_id,
        participant: persistence.get_participant(participant_id).unwrap().unwrap(),
        provider: persistence.get_provider(provider_id).unwrap().unwrap(),
        service: persistence.get_provider_service(service_id).unwrap().unwrap(),
    }
}

pub fn booking_draft(market: &Marketplace, booking_number: &str) -> BookingDraft {
    let request: BookingRequest = BookingRequest {
        provider_id: market.provider.id,
        provider_service_id: market.service.id,
        service_type: String::from("personal_care"),
        scheduled_date: date!(2026 - 03 - 04),
        scheduled_start_time: String::from("09:00"),
        scheduled_end_time: String::from("12:00"),
        address: Address {
            line1: String::from("1 George St"),
            line2: None,
            suburb: String::from("Sydney"),
            state: String::from("NSW"),
            postcode: String::from("2000"),
        },
        service_location: Some(site()),
        notes: None,
    };
    draft_booking(
        request,
        &market.participant,
        &market.service,
        market.participant_actor(),
        booking_number.to_string(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap()
}

/// Applies a command to the stored booking and persists the result.
pub fn step(
    persistence: &mut Persistence,
    booking: &Booking,
    command: BookingCommand,
    actor: Actor,
) -> Booking {
    let transition: BookingTransition =
        apply_booking(booking, command, actor, now(), &PlatformSettings::default()).unwrap();
    persistence
        .persist_booking_transition(booking.version, &transition)
        .unwrap()
}

pub fn on_site() -> GpsReading {
    GpsReading {
        location: Coordinates::new(-33.8689, 151.2093).unwrap(),
        accuracy_meters: Some(5.0),
        photo_url: None,
    }
}

/// Stores a booking and drives it to `completed`.
pub fn completed_booking(
    persistence: &mut Persistence,
    market: &Marketplace,
    booking_number: &str,
) -> Booking {
    let provider: Actor = market.provider_actor();
    let participant: Actor = market.participant_actor();
    let booking: Booking = persistence
        .insert_booking(&booking_draft(market, booking_number))
        .unwrap();
    let booking: Booking = step(persistence, &booking, BookingCommand::Accept, provider);
    let booking: Booking = step(
        persistence,
        &booking,
        BookingCommand::CheckIn(on_site()),
        provider,
    );
    let booking: Booking = step(
        persistence,
        &booking,
        BookingCommand::CheckOut(on_site()),
        provider,
    );
    let booking: Booking = step(persistence, &booking, BookingCommand::ConfirmAsProvider, provider);
    step(
        persistence,
        &booking,
        BookingCommand::ConfirmAsParticipant,
        participant,
    )
}

pub fn manual_line(amount: i64) -> LineItemInput {
    LineItemInput {
        booking_id: None,
        description: String::from("Community access"),
        ndis_item_number: None,
        service_date: date!(2026 - 03 - 01),
        quantity: Decimal::ONE,
        unit: String::from("each"),
        unit_rate: Decimal::from(amount),
        gst_applicable: None,
    }
}

pub fn invoice_draft(
    market: &Marketplace,
    items: &[LineItemInput],
    invoice_number: &str,
) -> InvoiceDraft {
    draft_invoice(
        InvoiceParties {
            provider: &market.provider,
            participant: &market.participant,
        },
        items,
        None,
        invoice_number.to_string(),
        market.provider_actor(),
        now(),
        &PlatformSettings::default(),
    )
    .unwrap()
}
