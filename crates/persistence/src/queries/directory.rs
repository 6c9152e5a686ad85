// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Directory lookups.
//!
//! Lookups by id return `Ok(None)` when no row matches; callers decide
//! whether absence is an error.

use diesel::prelude::*;
use diesel::SqliteConnection;
use ndis_market_domain::{ParticipantProfile, ProviderProfile, ProviderService, User};
use tracing::debug;

use crate::data_models::{ParticipantRow, ProviderRow, ProviderServiceRow, UserRow};
use crate::diesel_schema::{participants, provider_services, providers, users};
use crate::error::PersistenceError;

/// Retrieves a user by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, PersistenceError> {
    debug!(user_id, "Looking up user");

    users::table
        .filter(users::id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?
        .map(UserRow::into_domain)
        .transpose()
}

/// Retrieves a participant profile by profile id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_participant(
    conn: &mut SqliteConnection,
    participant_id: i64,
) -> Result<Option<ParticipantProfile>, PersistenceError> {
    participants::table
        .filter(participants::id.eq(participant_id))
        .select(ParticipantRow::as_select())
        .first(conn)
        .optional()?
        .map(ParticipantRow::into_domain)
        .transpose()
}

/// Retrieves the participant profile owned by a user.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_participant_by_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<ParticipantProfile>, PersistenceError> {
    participants::table
        .filter(participants::user_id.eq(user_id))
        .select(ParticipantRow::as_select())
        .first(conn)
        .optional()?
        .map(ParticipantRow::into_domain)
        .transpose()
}

/// Retrieves a provider profile by profile id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_provider(
    conn: &mut SqliteConnection,
    provider_id: i64,
) -> Result<Option<ProviderProfile>, PersistenceError> {
    Ok(providers::table
        .filter(providers::id.eq(provider_id))
        .select(ProviderRow::as_select())
        .first(conn)
        .optional()?
        .map(ProviderRow::into_domain))
}

/// Retrieves the provider profile owned by a user.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_provider_by_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<ProviderProfile>, PersistenceError> {
    Ok(providers::table
        .filter(providers::user_id.eq(user_id))
        .select(ProviderRow::as_select())
        .first(conn)
        .optional()?
        .map(ProviderRow::into_domain))
}

/// Retrieves a provider service by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
pub fn get_provider_service(
    conn: &mut SqliteConnection,
    service_id: i64,
) -> Result<Option<ProviderService>, PersistenceError> {
    provider_services::table
        .filter(provider_services::id.eq(service_id))
        .select(ProviderServiceRow::as_select())
        .first(conn)
        .optional()?
        .map(ProviderServiceRow::into_domain)
        .transpose()
}

/// Lists a provider's services in creation order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_provider_services(
    conn: &mut SqliteConnection,
    provider_id: i64,
) -> Result<Vec<ProviderService>, PersistenceError> {
    provider_services::table
        .filter(provider_services::provider_id.eq(provider_id))
        .order(provider_services::id.asc())
        .select(ProviderServiceRow::as_select())
        .load(conn)?
        .into_iter()
        .map(ProviderServiceRow::into_domain)
        .collect()
}
