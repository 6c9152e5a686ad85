// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Users, profiles, and provider service catalogues.

use ndis_market_domain::{
    BillToType, DomainError, ParticipantProfile, ProviderProfile, ProviderService, RateType,
    Role, User, UserStatus, validate_business_name, validate_service_offering,
    validate_user_fields,
};
use ndis_market_persistence::{
    NewParticipantProfile, NewProviderProfile, NewProviderService, NewUser, Persistence,
    PersistenceError,
};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use crate::context::ServiceContext;
use crate::error::{ApiError, AuthError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AddProviderServiceRequest, CreateParticipantProfileRequest, CreateProviderProfileRequest,
    ParticipantInfo, ProviderInfo, ProviderServiceInfo, RegisterUserRequest,
    SetUserStatusRequest, UserInfo,
};

const DEFAULT_UNIT: &str = "hour";

/// Registers a user.
///
/// Anyone may register as a participant or provider. Coordinator and admin
/// accounts are created by an admin.
///
/// # Errors
///
/// Returns an error if:
/// - The role is unknown or a field is invalid (`BadRequest`)
/// - A privileged role is requested without an admin (`Unauthorized`/`Forbidden`)
/// - The email is already registered (`Conflict`)
pub fn register_user(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    actor: Option<&AuthenticatedActor>,
    request: RegisterUserRequest,
) -> Result<UserInfo, ApiError> {
    let role: Role = AuthenticationService::parse_role(&request.role)?;
    if matches!(role, Role::Coordinator | Role::Admin) {
        let admin: &AuthenticatedActor = actor.ok_or_else(|| ApiError::Unauthorized {
            reason: format!("Registering a {role} requires an admin"),
        })?;
        AuthorizationService::require_admin(admin, "register privileged user")?;
    }

    let email: String = request.email.trim().to_lowercase();
    validate_user_fields(&email, &request.display_name).map_err(translate_domain_error)?;

    let user_id: i64 = persistence
        .insert_user(&NewUser {
            email: email.clone(),
            display_name: request.display_name.trim().to_string(),
            phone: request.phone,
            role,
            status: UserStatus::Active,
            created_at: ctx.now(),
        })
        .map_err(|e| match e {
            PersistenceError::UniqueViolation(_) => ApiError::Conflict {
                message: format!("Email '{email}' is already registered"),
            },
            other => translate_persistence_error(other),
        })?;

    info!(user_id, role = %role, "Registered user");
    let user: User = load_user(persistence, user_id)?;
    Ok(UserInfo::from(&user))
}

/// Seeds the first admin account at server start.
///
/// Returns `None` if the email is already registered, so restarts against
/// the same database are harmless.
///
/// # Errors
///
/// Returns `BadRequest` for an invalid email or name.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    ctx: &ServiceContext,
    email: &str,
    display_name: &str,
) -> Result<Option<UserInfo>, ApiError> {
    let email: String = email.trim().to_lowercase();
    validate_user_fields(&email, display_name).map_err(translate_domain_error)?;

    let inserted: Result<i64, PersistenceError> = persistence.insert_user(&NewUser {
        email: email.clone(),
        display_name: display_name.trim().to_string(),
        phone: None,
        role: Role::Admin,
        status: UserStatus::Active,
        created_at: ctx.now(),
    });
    match inserted {
        Ok(user_id) => {
            info!(user_id, "Bootstrapped admin account");
            let user: User = load_user(persistence, user_id)?;
            Ok(Some(UserInfo::from(&user)))
        }
        Err(PersistenceError::UniqueViolation(_)) => Ok(None),
        Err(other) => Err(translate_persistence_error(other)),
    }
}

/// Sets a user's account status.
///
/// # Errors
///
/// Returns `Forbidden` for non-admins, `BadRequest` for an unknown status
/// and `NotFound` for an unknown user.
pub fn set_user_status(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    user_id: i64,
    request: &SetUserStatusRequest,
) -> Result<UserInfo, ApiError> {
    AuthorizationService::require_admin(actor, "set user status")?;
    let status: UserStatus = request.status.parse().map_err(translate_domain_error)?;

    persistence
        .set_user_status(user_id, status)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::not_found("User", user_id),
            other => translate_persistence_error(other),
        })?;

    info!(user_id, status = %status, by = actor.user_id, "User status changed");
    let user: User = load_user(persistence, user_id)?;
    Ok(UserInfo::from(&user))
}

/// Creates the participant profile for a user.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither the user nor an admin (`Forbidden`)
/// - The user does not exist (`NotFound`)
/// - The user is not a participant (`BadRequest`)
/// - The user already has a profile (`Conflict`)
pub fn create_participant_profile(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateParticipantProfileRequest,
) -> Result<ParticipantInfo, ApiError> {
    authorize_self_or_admin(actor, request.user_id, "create participant profile")?;
    require_role(persistence, request.user_id, Role::Participant)?;

    let bill_to_type: BillToType = request
        .bill_to_type
        .as_deref()
        .map(str::parse::<BillToType>)
        .transpose()
        .map_err(translate_domain_error)?
        .unwrap_or_default();

    let profile_id: i64 = persistence
        .insert_participant(&NewParticipantProfile {
            user_id: request.user_id,
            ndis_number: request.ndis_number,
            plan_manager_id: request.plan_manager_id,
            bill_to_type,
        })
        .map_err(|e| duplicate_profile(e, "participant", request.user_id))?;

    let profile: ParticipantProfile = persistence
        .get_participant(profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Participant", profile_id))?;
    Ok(ParticipantInfo::from(&profile))
}

/// Creates the provider profile for a user.
///
/// # Errors
///
/// Same rules as [`create_participant_profile`] for the provider role, plus
/// `BadRequest` for a blank business name.
pub fn create_provider_profile(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: CreateProviderProfileRequest,
) -> Result<ProviderInfo, ApiError> {
    authorize_self_or_admin(actor, request.user_id, "create provider profile")?;
    require_role(persistence, request.user_id, Role::Provider)?;
    validate_business_name(&request.business_name).map_err(translate_domain_error)?;

    let profile_id: i64 = persistence
        .insert_provider(&NewProviderProfile {
            user_id: request.user_id,
            business_name: request.business_name.trim().to_string(),
            abn: request.abn,
            gst_registered: request.gst_registered,
        })
        .map_err(|e| duplicate_profile(e, "provider", request.user_id))?;

    let profile: ProviderProfile = persistence
        .get_provider(profile_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider", profile_id))?;
    Ok(ProviderInfo::from(&profile))
}

/// Adds a service to a provider's catalogue.
///
/// # Errors
///
/// Returns `NotFound` for an unknown provider, `Forbidden` unless the actor
/// owns the provider or is an admin, and `BadRequest` for blank names,
/// unknown rate types or negative rates.
pub fn add_provider_service(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    provider_id: i64,
    request: AddProviderServiceRequest,
) -> Result<ProviderServiceInfo, ApiError> {
    let provider: ProviderProfile = persistence
        .get_provider(provider_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider", provider_id))?;
    AuthorizationService::authorize_provider(actor, provider.id, "add provider service")?;

    validate_service_offering(
        &request.service_type,
        &request.name,
        request.base_rate,
        request.weekday_rate,
    )
    .map_err(translate_domain_error)?;
    let rate_type: RateType = request
        .rate_type
        .as_deref()
        .map(str::parse::<RateType>)
        .transpose()
        .map_err(translate_domain_error)?
        .unwrap_or_default();

    let service_id: i64 = persistence
        .insert_provider_service(&NewProviderService {
            provider_id: provider.id,
            service_type: request.service_type.trim().to_string(),
            name: request.name.trim().to_string(),
            ndis_item_number: request.ndis_item_number,
            base_rate: request.base_rate,
            weekday_rate: request.weekday_rate,
            rate_type,
            unit: request.unit.unwrap_or_else(|| String::from(DEFAULT_UNIT)),
        })
        .map_err(translate_persistence_error)?;

    let service: ProviderService = persistence
        .get_provider_service(service_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider service", service_id))?;
    Ok(ProviderServiceInfo::from(&service))
}

/// Lists a provider's services. Open to any authenticated actor.
///
/// # Errors
///
/// Returns `NotFound` for an unknown provider.
pub fn list_provider_services(
    persistence: &mut Persistence,
    provider_id: i64,
) -> Result<Vec<ProviderServiceInfo>, ApiError> {
    persistence
        .get_provider(provider_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Provider", provider_id))?;
    let services: Vec<ProviderService> = persistence
        .list_provider_services(provider_id)
        .map_err(translate_persistence_error)?;
    Ok(services.iter().map(ProviderServiceInfo::from).collect())
}

pub(crate) fn load_user(persistence: &mut Persistence, user_id: i64) -> Result<User, ApiError> {
    persistence
        .get_user(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("User", user_id))
}

fn authorize_self_or_admin(
    actor: &AuthenticatedActor,
    user_id: i64,
    action: &str,
) -> Result<(), AuthError> {
    if actor.is_admin() || actor.user_id == user_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            action: action.to_string(),
            reason: String::from("profiles can only be created for yourself"),
        })
    }
}

fn require_role(persistence: &mut Persistence, user_id: i64, role: Role) -> Result<(), ApiError> {
    let user: User = load_user(persistence, user_id)?;
    if user.role == role {
        Ok(())
    } else {
        Err(translate_domain_error(DomainError::InvalidField {
            field: "user_id",
            reason: format!("user {user_id} is a {}, not a {role}", user.role),
        }))
    }
}

fn duplicate_profile(err: PersistenceError, kind: &str, user_id: i64) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(_) => ApiError::Conflict {
            message: format!("User {user_id} already has a {kind} profile"),
        },
        other => translate_persistence_error(other),
    }
}
