// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod router_tests;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use ndis_market_api::{
    FixedClock, MockPaymentGateway, NotificationDispatcher, ServiceContext, UserInfo,
    bootstrap_admin,
};
use ndis_market_domain::PlatformSettings;
use ndis_market_persistence::Persistence;
use serde_json::Value;
use std::sync::Arc;
use time::macros::datetime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::AppState;
use crate::identity::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};

/// Helper to create test app state with in-memory persistence and a seeded admin.
///
/// The clock is fixed at Monday 2 March 2026, 09:00 UTC.
fn create_test_app_state() -> (AppState, i64) {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let ctx: ServiceContext = ServiceContext {
        settings: PlatformSettings::default(),
        gateway: Arc::new(MockPaymentGateway::new()),
        notifications: NotificationDispatcher::default(),
        clock: Arc::new(FixedClock(datetime!(2026-03-02 09:00 UTC))),
    };
    let admin: UserInfo = bootstrap_admin(&mut persistence, &ctx, "admin@example.com", "Admin")
        .expect("bootstrap admin")
        .expect("admin created");
    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        ctx,
    };
    (app_state, admin.id)
}

/// Sends one request and returns the status with the decoded JSON body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<(i64, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, id.to_string())
            .header(ACTOR_ROLE_HEADER, role);
    }
    let request: Request<Body> = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id field")
}
