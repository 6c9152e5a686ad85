// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{Router, http::StatusCode};
use clap::Parser;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;

use super::{create_test_app_state, id_of, send};
use crate::{Args, build_router};

/// Registers a participant and a provider with profiles and one service.
///
/// Returns `(participant_user, participant_id, provider_user, provider_id, service_id)`.
async fn seed_parties(app: &Router) -> (i64, i64, i64, i64, i64) {
    let (status, participant_user) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "email": "pat@example.com",
            "display_name": "Pat Participant",
            "phone": null,
            "role": "participant"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let participant_user: i64 = id_of(&participant_user);

    let (status, provider_user) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "email": "care@example.com",
            "display_name": "Careful Care",
            "phone": null,
            "role": "provider"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let provider_user: i64 = id_of(&provider_user);

    let (status, participant) = send(
        app,
        "POST",
        "/participants",
        Some((participant_user, "participant")),
        Some(json!({ "user_id": participant_user, "ndis_number": "430000001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, provider) = send(
        app,
        "POST",
        "/providers",
        Some((provider_user, "provider")),
        Some(json!({
            "user_id": provider_user,
            "business_name": "Careful Care Pty Ltd",
            "abn": null,
            "gst_registered": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let provider_id: i64 = id_of(&provider);

    let (status, service) = send(
        app,
        "POST",
        &format!("/providers/{provider_id}/services"),
        Some((provider_user, "provider")),
        Some(json!({
            "service_type": "personal_care",
            "name": "Personal care",
            "base_rate": "55",
            "weekday_rate": "60"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        participant_user,
        id_of(&participant),
        provider_user,
        provider_id,
        id_of(&service),
    )
}

fn booking_body(provider_id: i64, service_id: i64) -> Value {
    json!({
        "provider_id": provider_id,
        "provider_service_id": service_id,
        "service_type": "personal_care",
        "scheduled_date": "2026-03-04",
        "scheduled_start_time": "09:00",
        "scheduled_end_time": "12:00",
        "address": {
            "line1": "1 George St",
            "suburb": "Sydney",
            "state": "NSW",
            "postcode": "2000"
        },
        "latitude": -33.8688,
        "longitude": 151.2093
    })
}

#[tokio::test]
async fn test_health() {
    let (app_state, _) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["mock_payments"], true);
}

#[tokio::test]
async fn test_self_registration_without_headers() {
    let (app_state, _) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({
            "email": "New@Example.com",
            "display_name": "New Person",
            "phone": null,
            "role": "provider"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["role"], "provider");
}

#[tokio::test]
async fn test_admin_registration_requires_admin() {
    let (app_state, admin_id) = create_test_app_state();
    let app: Router = build_router(app_state);
    let request: Value = json!({
        "email": "second@example.com",
        "display_name": "Second Admin",
        "phone": null,
        "role": "admin"
    });

    let (status, body) = send(&app, "POST", "/users", None, Some(request.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some((admin_id, "admin")),
        Some(request),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_missing_or_mismatched_identity_is_unauthorized() {
    let (app_state, admin_id) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(&app, "GET", "/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], true);

    let (status, _) = send(&app, "GET", "/bookings", Some((admin_id, "provider")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/bookings", Some((9999, "admin")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() {
    let (app_state, admin_id) = create_test_app_state();
    let app: Router = build_router(app_state);

    let (status, body) = send(&app, "GET", "/bookings/999", Some((admin_id, "admin")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn test_booking_request_and_acceptance() {
    let (app_state, _) = create_test_app_state();
    let app: Router = build_router(app_state);
    let (participant_user, participant_id, provider_user, provider_id, service_id) =
        seed_parties(&app).await;

    let (status, booking) = send(
        &app,
        "POST",
        "/bookings",
        Some((participant_user, "participant")),
        Some(booking_body(provider_id, service_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["participant_id"], participant_id);
    assert!(
        booking["booking_number"]
            .as_str()
            .expect("booking number")
            .starts_with("VC202603-")
    );
    // Money travels as strings.
    let total: &str = booking["estimated_total"]
        .as_str()
        .expect("estimated_total is a string");
    assert_eq!(Decimal::from_str(total).expect("decimal"), Decimal::from(180));
    let booking_id: i64 = id_of(&booking);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/bookings/{booking_id}/accept"),
        Some((participant_user, "participant")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], true);

    let (status, accepted) = send(
        &app,
        "POST",
        &format!("/bookings/{booking_id}/accept"),
        Some((provider_user, "provider")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, history) = send(
        &app,
        "GET",
        &format!("/bookings/{booking_id}/history"),
        Some((participant_user, "participant")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().expect("history list").len(), 2);
}

#[tokio::test]
async fn test_decline_accepts_missing_body() {
    let (app_state, _) = create_test_app_state();
    let app: Router = build_router(app_state);
    let (participant_user, _, provider_user, provider_id, service_id) = seed_parties(&app).await;

    let (_, booking) = send(
        &app,
        "POST",
        "/bookings",
        Some((participant_user, "participant")),
        Some(booking_body(provider_id, service_id)),
    )
    .await;
    let booking_id: i64 = id_of(&booking);

    let (status, declined) = send(
        &app,
        "POST",
        &format!("/bookings/{booking_id}/decline"),
        Some((provider_user, "provider")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(declined["status"], "declined");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/bookings/{booking_id}/cancel"),
        Some((participant_user, "participant")),
        Some(json!({ "reason": "changed plans" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_services_are_listed() {
    let (app_state, _) = create_test_app_state();
    let app: Router = build_router(app_state);
    let (participant_user, _, _, provider_id, _) = seed_parties(&app).await;

    let (status, services) = send(
        &app,
        "GET",
        &format!("/providers/{provider_id}/services"),
        Some((participant_user, "participant")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let services: &Vec<Value> = services.as_array().expect("list");
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["weekday_rate"], "60");
    assert_eq!(services[0]["rate_type"], "hourly");
}

#[test]
fn test_fee_rate_must_be_below_one() {
    let args: Args =
        Args::try_parse_from(["ndis-market-server", "--platform-fee-rate", "1.5"]).expect("args");
    assert!(args.platform_settings().is_err());

    let args: Args = Args::try_parse_from(["ndis-market-server", "--geofence-radius-meters", "0"])
        .expect("args");
    assert!(args.platform_settings().is_err());

    let args: Args = Args::try_parse_from(["ndis-market-server"]).expect("args");
    let settings = args.platform_settings().expect("defaults are valid");
    assert_eq!(settings.platform_fee_rate, Decimal::new(5, 2));
}
