// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity resolution and ownership checks.
//!
//! Credentials are issued elsewhere. The caller hands over a user id and a
//! claimed role; resolution confirms the user exists, is active, and holds
//! that role, then attaches the participant or provider profile the user
//! owns. Every ownership check after that is a pure comparison.

use ndis_market_audit::Actor;
use ndis_market_domain::{Booking, DomainError, Invoice, Role, User};
use ndis_market_persistence::Persistence;

use crate::error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};

/// An active user together with the profile they act through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's identifier.
    pub user_id: i64,
    /// The user's role.
    pub role: Role,
    /// The participant profile owned by the user, if any.
    pub participant_id: Option<i64>,
    /// The provider profile owned by the user, if any.
    pub provider_id: Option<i64>,
}

impl AuthenticatedActor {
    /// Creates an actor with no attached profile.
    #[must_use]
    pub const fn new(user_id: i64, role: Role) -> Self {
        Self {
            user_id,
            role,
            participant_id: None,
            provider_id: None,
        }
    }

    /// Converts this actor into the audit actor recorded on history rows.
    #[must_use]
    pub const fn to_audit_actor(&self) -> Actor {
        Actor::user(self.user_id, self.role)
    }

    /// Returns true for platform staff.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn owns_participant(&self, participant_id: i64) -> bool {
        self.participant_id == Some(participant_id)
    }

    fn owns_provider(&self, provider_id: i64) -> bool {
        self.provider_id == Some(provider_id)
    }
}

/// Resolves request identities against the user directory.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Resolves a claimed identity to an active actor.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if the role is unknown, the user does
    /// not exist, is not active, or holds a different role.
    pub fn resolve(
        persistence: &mut Persistence,
        user_id: i64,
        claimed_role: &str,
    ) -> Result<AuthenticatedActor, ApiError> {
        let role: Role = claimed_role
            .parse()
            .map_err(|_: DomainError| AuthError::AuthenticationFailed {
                reason: format!("Unknown role '{claimed_role}'"),
            })?;

        let user: User = persistence
            .get_user(user_id)
            .map_err(translate_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Unknown user {user_id}"),
            })?;

        if !user.is_active() {
            return Err(AuthError::AuthenticationFailed {
                reason: format!("User {user_id} is {}", user.status),
            }
            .into());
        }
        if user.role != role {
            return Err(AuthError::AuthenticationFailed {
                reason: format!("User {user_id} does not hold the {role} role"),
            }
            .into());
        }

        let mut actor: AuthenticatedActor = AuthenticatedActor::new(user.id, role);
        match role {
            Role::Participant => {
                actor.participant_id = persistence
                    .get_participant_by_user(user.id)
                    .map_err(translate_persistence_error)?
                    .map(|p| p.id);
            }
            Role::Provider => {
                actor.provider_id = persistence
                    .get_provider_by_user(user.id)
                    .map_err(translate_persistence_error)?
                    .map(|p| p.id);
            }
            Role::Coordinator | Role::Admin => {}
        }
        Ok(actor)
    }

    /// Parses a role string arriving in a request body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BadRequest` if the role is unknown.
    pub fn parse_role(value: &str) -> Result<Role, ApiError> {
        value.parse().map_err(translate_domain_error)
    }
}

/// Ownership and role checks.
///
/// Admins pass every check. Everyone else must own the side of the
/// resource they act for.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Requires the admin role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` for any other role.
    pub fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(forbidden(action, "admin role required"))
        }
    }

    /// Requires the actor to own the provider profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the actor is neither the provider
    /// nor an admin.
    pub fn authorize_provider(
        actor: &AuthenticatedActor,
        provider_id: i64,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || actor.owns_provider(provider_id) {
            Ok(())
        } else {
            Err(forbidden(action, "not the owning provider"))
        }
    }

    /// Requires the actor to be the booking's provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_booking_provider(
        actor: &AuthenticatedActor,
        booking: &Booking,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::authorize_provider(actor, booking.provider_id, action)
    }

    /// Requires the actor to be the booking's participant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_booking_participant(
        actor: &AuthenticatedActor,
        booking: &Booking,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || actor.owns_participant(booking.participant_id) {
            Ok(())
        } else {
            Err(forbidden(action, "not the booking's participant"))
        }
    }

    /// Requires the actor to be either party to the booking.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_booking_party(
        actor: &AuthenticatedActor,
        booking: &Booking,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin()
            || actor.owns_participant(booking.participant_id)
            || actor.owns_provider(booking.provider_id)
        {
            Ok(())
        } else {
            Err(forbidden(action, "not a party to the booking"))
        }
    }

    /// Requires read access to the booking. Coordinators may read any booking.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_booking_view(
        actor: &AuthenticatedActor,
        booking: &Booking,
    ) -> Result<(), AuthError> {
        if actor.role == Role::Coordinator {
            return Ok(());
        }
        Self::authorize_booking_party(actor, booking, "view booking")
    }

    /// Requires the actor to be the invoice's provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_invoice_provider(
        actor: &AuthenticatedActor,
        invoice: &Invoice,
        action: &str,
    ) -> Result<(), AuthError> {
        Self::authorize_provider(actor, invoice.provider_id, action)
    }

    /// Requires the actor to be the invoice's participant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_invoice_participant(
        actor: &AuthenticatedActor,
        invoice: &Invoice,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || actor.owns_participant(invoice.participant_id) {
            Ok(())
        } else {
            Err(forbidden(action, "not the invoiced participant"))
        }
    }

    /// Requires read access to the invoice.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` otherwise.
    pub fn authorize_invoice_view(
        actor: &AuthenticatedActor,
        invoice: &Invoice,
    ) -> Result<(), AuthError> {
        if actor.is_admin()
            || actor.role == Role::Coordinator
            || actor.owns_participant(invoice.participant_id)
            || actor.owns_provider(invoice.provider_id)
        {
            Ok(())
        } else {
            Err(forbidden("view invoice", "not a party to the invoice"))
        }
    }
}

fn forbidden(action: &str, reason: &str) -> AuthError {
    AuthError::Forbidden {
        action: action.to_string(),
        reason: reason.to_string(),
    }
}
