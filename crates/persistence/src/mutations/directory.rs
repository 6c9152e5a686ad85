// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Directory mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market_domain::UserStatus;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{
    NewParticipantProfile, NewProviderProfile, NewProviderService, NewUser, format_timestamp,
};
use crate::diesel_schema::{participants, provider_services, providers, users};
use crate::error::PersistenceError;

/// Inserts a user and returns its id.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the email is taken.
pub fn insert_user(conn: &mut SqliteConnection, user: &NewUser) -> Result<i64, PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::email.eq(&user.email),
            users::display_name.eq(&user.display_name),
            users::phone.eq(&user.phone),
            users::role.eq(user.role.as_str()),
            users::status.eq(user.status.as_str()),
            users::created_at.eq(format_timestamp(user.created_at)?),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;
    info!(user_id, role = %user.role, "Registered user");
    Ok(user_id)
}

/// Sets a user's account status.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no such user exists.
pub fn set_user_status(
    conn: &mut SqliteConnection,
    user_id: i64,
    status: UserStatus,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(users::table.filter(users::id.eq(user_id)))
        .set(users::status.eq(status.as_str()))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("user {user_id}")));
    }

    info!(user_id, status = %status, "Updated user status");
    Ok(())
}

/// Inserts a participant profile and returns its id.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the user already has a
/// participant profile.
pub fn insert_participant(
    conn: &mut SqliteConnection,
    profile: &NewParticipantProfile,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(participants::table)
        .values((
            participants::user_id.eq(profile.user_id),
            participants::ndis_number.eq(&profile.ndis_number),
            participants::plan_manager_id.eq(&profile.plan_manager_id),
            participants::bill_to_type.eq(profile.bill_to_type.as_str()),
        ))
        .execute(conn)?;

    let participant_id: i64 = conn.get_last_insert_rowid()?;
    info!(participant_id, user_id = profile.user_id, "Created participant profile");
    Ok(participant_id)
}

/// Inserts a provider profile and returns its id.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the user already has a
/// provider profile.
pub fn insert_provider(
    conn: &mut SqliteConnection,
    profile: &NewProviderProfile,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(providers::table)
        .values((
            providers::user_id.eq(profile.user_id),
            providers::business_name.eq(&profile.business_name),
            providers::abn.eq(&profile.abn),
            providers::gst_registered.eq(profile.gst_registered),
        ))
        .execute(conn)?;

    let provider_id: i64 = conn.get_last_insert_rowid()?;
    info!(provider_id, user_id = profile.user_id, "Created provider profile");
    Ok(provider_id)
}

/// Inserts a provider service and returns its id.
///
/// # Errors
///
/// Returns an error if the provider does not exist or the insert fails.
pub fn insert_provider_service(
    conn: &mut SqliteConnection,
    service: &NewProviderService,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(provider_services::table)
        .values((
            provider_services::provider_id.eq(service.provider_id),
            provider_services::service_type.eq(&service.service_type),
            provider_services::name.eq(&service.name),
            provider_services::ndis_item_number.eq(&service.ndis_item_number),
            provider_services::base_rate.eq(service.base_rate.map(|r| r.to_string())),
            provider_services::weekday_rate.eq(service.weekday_rate.map(|r| r.to_string())),
            provider_services::rate_type.eq(service.rate_type.as_str()),
            provider_services::unit.eq(&service.unit),
        ))
        .execute(conn)?;

    let service_id: i64 = conn.get_last_insert_rowid()?;
    info!(service_id, provider_id = service.provider_id, "Added provider service");
    Ok(service_id)
}
