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

use ndis_market_domain::Role;
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Role string recorded for automatic transitions.
pub const SYSTEM_ROLE: &str = "system";

/// Represents the entity performing an action.
///
/// An actor is either an authenticated marketplace user acting in a role,
/// or the system itself (for example, auto-completion after dual
/// confirmation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// A marketplace user.
    User {
        /// The user's identifier.
        id: i64,
        /// The role the user acted in.
        role: Role,
    },
    /// An automatic transition with no human initiator.
    System,
}

impl Actor {
    /// Creates a user actor.
    #[must_use]
    pub const fn user(id: i64, role: Role) -> Self {
        Self::User { id, role }
    }

    /// The user id, or `None` for the system.
    #[must_use]
    pub const fn user_id(&self) -> Option<i64> {
        match self {
            Self::User { id, .. } => Some(*id),
            Self::System => None,
        }
    }

    /// The role string recorded in history rows.
    #[must_use]
    pub const fn role_str(&self) -> &'static str {
        match self {
            Self::User { role, .. } => role.as_str(),
            Self::System => SYSTEM_ROLE,
        }
    }

    /// Rebuilds an actor from a stored `(changed_by, changed_by_role)` pair.
    ///
    /// Returns `None` if the pair does not describe a valid actor.
    #[must_use]
    pub fn from_parts(id: Option<i64>, role: &str) -> Option<Self> {
        if role == SYSTEM_ROLE {
            return Some(Self::System);
        }
        let role: Role = role.parse().ok()?;
        id.map(|id| Self::User { id, role })
    }
}

/// An immutable record of one status transition.
///
/// Every successful transition produces exactly one `StatusChange`. `from`
/// is `None` only for the creation record. The type parameter is the
/// status enum of the aggregate (booking or invoice).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange<S> {
    /// Status before the transition.
    pub from: Option<S>,
    /// Status after the transition.
    pub to: S,
    /// Who caused the transition.
    pub actor: Actor,
    /// Optional free-text reason (decline or cancellation reason).
    pub reason: Option<String>,
    /// When the transition happened.
    pub at: OffsetDateTime,
}

impl<S> StatusChange<S> {
    /// Creates the record written when an aggregate is first stored.
    #[must_use]
    pub const fn created(to: S, actor: Actor, at: OffsetDateTime) -> Self {
        Self {
            from: None,
            to,
            actor,
            reason: None,
            at,
        }
    }

    /// Creates a transition record.
    #[must_use]
    pub const fn new(
        from: S,
        to: S,
        actor: Actor,
        reason: Option<String>,
        at: OffsetDateTime,
    ) -> Self {
        Self {
            from: Some(from),
            to,
            actor,
            reason,
            at,
        }
    }
}

/// A status change as read back from storage, with its row identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusHistoryEntry<S> {
    /// The history row id.
    pub id: i64,
    /// The aggregate (booking or invoice) id.
    pub subject_id: i64,
    /// The recorded change.
    pub change: StatusChange<S>,
}
