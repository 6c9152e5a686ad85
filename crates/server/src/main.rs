// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod identity;

#[cfg(test)]
mod tests;

use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use ndis_market_api::{
    GatewayConfig, NotificationDispatcher, ServiceContext, SystemClock, UserInfo, bootstrap_admin,
};
use ndis_market_domain::{DEFAULT_GEOFENCE_RADIUS_METERS, PlatformSettings};
use ndis_market_persistence::Persistence;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::handlers::{
    handle_accept_booking, handle_add_provider_service, handle_booking_history,
    handle_cancel_booking, handle_cancel_invoice, handle_check_in, handle_confirm_booking,
    handle_confirm_payment, handle_create_booking, handle_create_invoice,
    handle_create_participant, handle_create_payment_intent, handle_create_payout,
    handle_create_provider, handle_decline_booking, handle_get_booking, handle_get_invoice,
    handle_health, handle_invoice_from_booking, handle_invoice_history, handle_list_bookings,
    handle_list_check_ins, handle_list_invoices, handle_list_payments, handle_list_payouts,
    handle_list_provider_services, handle_mark_invoice_paid, handle_mark_overdue,
    handle_refund_payment, handle_register_user, handle_send_invoice, handle_set_user_status,
    handle_view_invoice,
};

/// NDIS Market Server - HTTP server for the NDIS service marketplace
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "DATABASE_PATH")]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Maximum distance in meters between a check-in and the service location
    #[arg(long, env = "GEOFENCE_RADIUS_METERS", default_value_t = DEFAULT_GEOFENCE_RADIUS_METERS)]
    geofence_radius_meters: f64,

    /// Share of each invoice subtotal kept by the platform
    #[arg(long, env = "PLATFORM_FEE_RATE", default_value = "0.05")]
    platform_fee_rate: Decimal,

    /// Email of an admin account to create on startup if it does not exist
    #[arg(long, env = "BOOTSTRAP_ADMIN_EMAIL")]
    bootstrap_admin_email: Option<String>,

    /// Display name for the bootstrapped admin
    #[arg(long, env = "BOOTSTRAP_ADMIN_NAME", default_value = "Platform Admin")]
    bootstrap_admin_name: String,
}

impl Args {
    /// Builds the platform settings, rejecting out-of-range values.
    fn platform_settings(&self) -> Result<PlatformSettings, String> {
        if !self.geofence_radius_meters.is_finite() || self.geofence_radius_meters <= 0.0 {
            return Err(format!(
                "Geofence radius must be a positive number of meters, got {}",
                self.geofence_radius_meters
            ));
        }
        if self.platform_fee_rate.is_sign_negative() || self.platform_fee_rate >= Decimal::ONE {
            return Err(format!(
                "Platform fee rate must be in [0, 1), got {}",
                self.platform_fee_rate
            ));
        }
        Ok(PlatformSettings {
            geofence_radius_meters: self.geofence_radius_meters,
            platform_fee_rate: self.platform_fee_rate,
            ..PlatformSettings::default()
        })
    }
}

/// Application state shared across handlers.
///
/// The store sits behind a Mutex; each request holds it for the length of
/// one service call.
#[derive(Clone)]
pub struct AppState {
    /// The marketplace store.
    pub persistence: Arc<Mutex<Persistence>>,
    /// Settings, gateway, notifications and clock.
    pub ctx: ServiceContext,
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        // Directory
        .route("/users", post(handle_register_user))
        .route("/users/{id}/status", post(handle_set_user_status))
        .route("/participants", post(handle_create_participant))
        .route("/providers", post(handle_create_provider))
        .route(
            "/providers/{id}/services",
            post(handle_add_provider_service).get(handle_list_provider_services),
        )
        .route("/providers/{id}/payouts", get(handle_list_payouts))
        // Bookings
        .route(
            "/bookings",
            post(handle_create_booking).get(handle_list_bookings),
        )
        .route("/bookings/{id}", get(handle_get_booking))
        .route("/bookings/{id}/accept", post(handle_accept_booking))
        .route("/bookings/{id}/decline", post(handle_decline_booking))
        .route("/bookings/{id}/check_in", post(handle_check_in))
        .route("/bookings/{id}/check_ins", get(handle_list_check_ins))
        .route("/bookings/{id}/confirm", post(handle_confirm_booking))
        .route("/bookings/{id}/cancel", post(handle_cancel_booking))
        .route("/bookings/{id}/history", get(handle_booking_history))
        // Invoices
        .route(
            "/invoices",
            post(handle_create_invoice).get(handle_list_invoices),
        )
        .route("/invoices/mark_overdue", post(handle_mark_overdue))
        .route(
            "/invoices/from_booking/{id}",
            post(handle_invoice_from_booking),
        )
        .route("/invoices/{id}", get(handle_get_invoice))
        .route("/invoices/{id}/history", get(handle_invoice_history))
        .route("/invoices/{id}/send", post(handle_send_invoice))
        .route("/invoices/{id}/view", post(handle_view_invoice))
        .route("/invoices/{id}/mark_paid", post(handle_mark_invoice_paid))
        .route("/invoices/{id}/cancel", post(handle_cancel_invoice))
        // Payments
        .route(
            "/invoices/{id}/payment_intent",
            post(handle_create_payment_intent),
        )
        .route("/invoices/{id}/payments", get(handle_list_payments))
        .route("/payments/{id}/confirm", post(handle_confirm_payment))
        .route("/payments/{id}/refund", post(handle_refund_payment))
        .route("/payouts", post(handle_create_payout))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing NDIS Market Server");

    let settings: PlatformSettings = args.platform_settings()?;

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };
    persistence.verify_foreign_key_enforcement()?;

    let gateway_config: GatewayConfig = GatewayConfig::from_env();
    if gateway_config.mock_mode() {
        warn!("No payment gateway credential configured; payments run in mock mode");
    }

    let ctx: ServiceContext = ServiceContext {
        settings,
        gateway: gateway_config.build(),
        notifications: NotificationDispatcher::default(),
        clock: Arc::new(SystemClock),
    };

    if let Some(email) = &args.bootstrap_admin_email {
        let created: Option<UserInfo> =
            bootstrap_admin(&mut persistence, &ctx, email, &args.bootstrap_admin_name)?;
        match created {
            Some(user) => info!(user_id = user.id, "Created bootstrap admin"),
            None => info!("Bootstrap admin already exists"),
        }
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        ctx,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
