// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction at the server boundary.
//!
//! Token issuance lives outside this service. The gateway in front of it
//! forwards the caller as two headers:
//!
//! - `X-Actor-Id`: the user id
//! - `X-Actor-Role`: `participant`, `provider`, `coordinator` or `admin`
//!
//! The extractor then checks the user exists, is active and holds the
//! claimed role before any handler runs.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use ndis_market_api::{AuthenticatedActor, AuthenticationService};
use tracing::{debug, warn};

use crate::AppState;
use crate::error::HttpError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(Identity(actor): Identity) -> Result<Json<T>, HttpError> { ... }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if either header is missing or malformed, the user
/// is unknown or inactive, or the role does not match.
pub struct Identity(pub AuthenticatedActor);

impl FromRequestParts<AppState> for Identity {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (user_id, role): (i64, String) = read_headers(parts)?.ok_or_else(|| {
            debug!("Missing actor headers");
            HttpError::unauthorized("Missing X-Actor-Id / X-Actor-Role headers")
        })?;
        resolve(state, user_id, &role).await.map(Self)
    }
}

/// Anonymous callers get `None`; callers that send headers are still
/// fully checked.
impl OptionalFromRequestParts<AppState> for Identity {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match read_headers(parts)? {
            Some((user_id, role)) => resolve(state, user_id, &role).await.map(|a| Some(Self(a))),
            None => Ok(None),
        }
    }
}

fn read_headers(parts: &Parts) -> Result<Option<(i64, String)>, HttpError> {
    let id: Option<&str> = header(parts, ACTOR_ID_HEADER)?;
    let role: Option<&str> = header(parts, ACTOR_ROLE_HEADER)?;
    match (id, role) {
        (None, None) => Ok(None),
        (Some(id), Some(role)) => {
            let user_id: i64 = id.trim().parse().map_err(|_| {
                warn!(header = ACTOR_ID_HEADER, "Actor id is not an integer");
                HttpError::unauthorized(format!("Invalid actor id '{id}'"))
            })?;
            Ok(Some((user_id, role.trim().to_string())))
        }
        _ => Err(HttpError::unauthorized(
            "X-Actor-Id and X-Actor-Role must be sent together",
        )),
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, HttpError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| {
                warn!(header = name, "Invalid header encoding");
                HttpError::unauthorized(format!("Invalid {name} header"))
            })
        })
        .transpose()
}

async fn resolve(
    state: &AppState,
    user_id: i64,
    role: &str,
) -> Result<AuthenticatedActor, HttpError> {
    let mut persistence = state.persistence.lock().await;
    let actor: AuthenticatedActor = AuthenticationService::resolve(&mut persistence, user_id, role)
        .map_err(|e| {
            warn!(user_id, role, error = %e, "Actor rejected");
            HttpError::from(e)
        })?;
    debug!(user_id, role = %actor.role, "Actor resolved");
    Ok(actor)
}
