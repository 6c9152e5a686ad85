// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test fixtures: a seeded marketplace with a clock the tests can move.

use std::sync::{Arc, Mutex};

use ndis_market_domain::{Address, PlatformSettings, Role, UserStatus};
use ndis_market_persistence::{NewUser, Persistence};
use rust_decimal::Decimal;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::{
    AddProviderServiceRequest, AuthenticatedActor, AuthenticationService, BookingSummary,
    CheckInRequest, Clock, CreateBookingRequest, CreateParticipantProfileRequest,
    CreateProviderProfileRequest, MockPaymentGateway, NotificationDispatcher, RecordingChannel,
    RegisterUserRequest, ServiceContext, UserInfo, accept_booking, add_provider_service, check_in,
    confirm_booking, create_booking, create_participant_profile, create_provider_profile,
    register_user,
};

pub const SERVICE_LAT: f64 = -33.8688;
pub const SERVICE_LON: f64 = 151.2093;

pub const PARTICIPANT_EMAIL: &str = "pat@example.com";
pub const PROVIDER_EMAIL: &str = "care@example.com";

/// A clock that only moves when told to.
pub struct TestClock(Mutex<OffsetDateTime>);

impl TestClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }
}

pub struct Market {
    pub persistence: Persistence,
    pub ctx: ServiceContext,
    pub channel: RecordingChannel,
    pub clock: Arc<TestClock>,
    pub admin: AuthenticatedActor,
    pub coordinator: AuthenticatedActor,
    pub participant: AuthenticatedActor,
    pub provider: AuthenticatedActor,
    pub other_participant: AuthenticatedActor,
    pub other_provider: AuthenticatedActor,
    /// The provider's $60/hour personal care service.
    pub service_id: i64,
}

impl Market {
    pub fn participant_id(&self) -> i64 {
        self.participant.participant_id.unwrap()
    }

    pub fn provider_id(&self) -> i64 {
        self.provider.provider_id.unwrap()
    }
}

/// Monday 2 March 2026, 09:00 UTC.
pub fn start_time() -> OffsetDateTime {
    datetime!(2026-03-02 09:00 UTC)
}

pub fn setup() -> Market {
    let mut persistence = Persistence::new_in_memory().expect("in-memory store");
    let channel = RecordingChannel::new();
    let clock = Arc::new(TestClock(Mutex::new(start_time())));
    let ctx = ServiceContext {
        settings: PlatformSettings::default(),
        gateway: Arc::new(MockPaymentGateway::new()),
        notifications: NotificationDispatcher::new(Arc::new(channel.clone())),
        clock: clock.clone(),
    };

    let admin_id = persistence
        .insert_user(&NewUser {
            email: String::from("admin@example.com"),
            display_name: String::from("Platform Admin"),
            phone: None,
            role: Role::Admin,
            status: UserStatus::Active,
            created_at: start_time(),
        })
        .expect("seed admin");
    let admin = resolve(&mut persistence, admin_id, "admin");

    let coordinator_user = register(
        &mut persistence,
        &ctx,
        Some(&admin),
        "coord@example.com",
        "Casey Coordinator",
        "coordinator",
    );
    let coordinator = resolve(&mut persistence, coordinator_user.id, "coordinator");

    let participant =
        seed_participant(&mut persistence, &ctx, PARTICIPANT_EMAIL, "Pat Participant");
    let other_participant =
        seed_participant(&mut persistence, &ctx, "sam@example.com", "Sam Participant");
    let provider = seed_provider(&mut persistence, &ctx, PROVIDER_EMAIL, "Careful Care Pty Ltd");
    let other_provider =
        seed_provider(&mut persistence, &ctx, "other@example.com", "Other Supports");

    let service_id = add_provider_service(
        &mut persistence,
        &provider,
        provider.provider_id.unwrap(),
        AddProviderServiceRequest {
            service_type: String::from("personal_care"),
            name: String::from("Personal care"),
            ndis_item_number: Some(String::from("01_011_0107_1_1")),
            base_rate: Some(Decimal::from(55)),
            weekday_rate: Some(Decimal::from(60)),
            rate_type: Some(String::from("hourly")),
            unit: None,
        },
    )
    .expect("seed service")
    .id;

    Market {
        persistence,
        ctx,
        channel,
        clock,
        admin,
        coordinator,
        participant,
        provider,
        other_participant,
        other_provider,
        service_id,
    }
}

pub fn resolve(persistence: &mut Persistence, user_id: i64, role: &str) -> AuthenticatedActor {
    AuthenticationService::resolve(persistence, user_id, role).expect("resolve actor")
}

fn register(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    admin: Option<&AuthenticatedActor>,
    email: &str,
    name: &str,
    role: &str,
) -> UserInfo {
    register_user(
        persistence,
        ctx,
        admin,
        RegisterUserRequest {
            email: String::from(email),
            display_name: String::from(name),
            phone: None,
            role: String::from(role),
        },
    )
    .expect("register user")
}

fn seed_participant(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    email: &str,
    name: &str,
) -> AuthenticatedActor {
    let user = register(persistence, ctx, None, email, name, "participant");
    let bare = resolve(persistence, user.id, "participant");
    create_participant_profile(
        persistence,
        &bare,
        CreateParticipantProfileRequest {
            user_id: user.id,
            ndis_number: Some(String::from("430000000")),
            plan_manager_id: None,
            bill_to_type: None,
        },
    )
    .expect("participant profile");
    resolve(persistence, user.id, "participant")
}

fn seed_provider(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    email: &str,
    business_name: &str,
) -> AuthenticatedActor {
    let user = register(persistence, ctx, None, email, business_name, "provider");
    let bare = resolve(persistence, user.id, "provider");
    create_provider_profile(
        persistence,
        &bare,
        CreateProviderProfileRequest {
            user_id: user.id,
            business_name: String::from(business_name),
            abn: Some(String::from("51824753556")),
            gst_registered: false,
        },
    )
    .expect("provider profile");
    resolve(persistence, user.id, "provider")
}

pub fn booking_request(market: &Market) -> CreateBookingRequest {
    CreateBookingRequest {
        participant_id: None,
        provider_id: market.provider_id(),
        provider_service_id: market.service_id,
        service_type: String::from("personal_care"),
        scheduled_date: String::from("2026-03-04"),
        scheduled_start_time: String::from("09:00"),
        scheduled_end_time: String::from("12:00"),
        address: Address {
            line1: String::from("1 George St"),
            line2: None,
            suburb: String::from("Sydney"),
            state: String::from("NSW"),
            postcode: String::from("2000"),
        },
        latitude: Some(SERVICE_LAT),
        longitude: Some(SERVICE_LON),
        notes: None,
    }
}

pub fn gps(check_type: &str, latitude: f64, longitude: f64) -> CheckInRequest {
    CheckInRequest {
        check_type: String::from(check_type),
        latitude,
        longitude,
        accuracy_meters: Some(5.0),
        photo_url: None,
    }
}

/// Books as the participant and returns the new booking.
pub fn book(market: &mut Market) -> BookingSummary {
    let request = booking_request(market);
    let participant = market.participant;
    create_booking(&mut market.persistence, &market.ctx, &participant, request)
        .expect("create booking")
}

/// Books, accepts, and checks in on site.
pub fn book_in_progress(market: &mut Market) -> BookingSummary {
    let booking = book(market);
    let provider = market.provider;
    accept_booking(&mut market.persistence, &market.ctx, &provider, booking.id)
        .expect("accept booking");
    check_in(
        &mut market.persistence,
        &market.ctx,
        &provider,
        booking.id,
        gps("check_in", SERVICE_LAT, SERVICE_LON),
    )
    .expect("check in")
}

/// Runs a three-hour visit through to dual confirmation.
pub fn book_completed(market: &mut Market) -> BookingSummary {
    let booking = book_in_progress(market);
    let provider = market.provider;
    let participant = market.participant;
    market.clock.advance(Duration::hours(3));
    check_in(
        &mut market.persistence,
        &market.ctx,
        &provider,
        booking.id,
        gps("check_out", SERVICE_LAT, SERVICE_LON),
    )
    .expect("check out");
    confirm_booking(&mut market.persistence, &market.ctx, &provider, booking.id)
        .expect("provider confirms");
    confirm_booking(&mut market.persistence, &market.ctx, &participant, booking.id)
        .expect("participant confirms")
}
