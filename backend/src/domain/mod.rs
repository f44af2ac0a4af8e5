//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define the club membership and election model independently of
//! transport and storage. Aggregates are plain data with pure transition
//! methods; services load them through driven ports, apply one transition
//! and persist the result.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - Club, Membership, Election, Candidate, UserAccount: aggregates.
//! - The `*Service` types implementing the driving ports in [`ports`].

pub mod auth;
pub mod club;
pub mod election;
pub mod error;
pub mod ids;
pub mod ports;
pub mod trace_id;
pub mod user;
mod wire_enum;

mod account_service;
mod admin_provisioning;
mod club_service;
mod election_service;
mod membership_service;
mod service_support;

pub use self::account_service::AccountService;
pub use self::admin_provisioning::{AdminCredentials, AdminProvisioner, ProvisionOutcome};
pub use self::auth::{
    LockoutPolicy, LoginCredentials, LoginValidationError, PASSWORD_MIN, Registration,
    RegistrationValidationError,
};
pub use self::club::{
    CLUB_DESCRIPTION_MAX, CLUB_NAME_MAX, CLUB_NAME_MIN, Club, ClubCategory, ClubName, ClubStatus,
    ClubValidationError, Leadership, LeadershipSlot, MemberProfile, MemberRole, Membership,
    MembershipRuleError, MembershipStatus, Rejection,
};
pub use self::club_service::ClubService;
pub use self::election::{
    Candidate, Election, ElectionDraft, ElectionResults, ElectionRuleError, ElectionStatus,
    ElectionValidationError, NewCandidate, RankedCandidate,
};
pub use self::election_service::ElectionService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CandidateId, ClubId, ElectionId, InvalidId, MembershipId, UserId};
pub use self::membership_service::MembershipService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Actor, DisplayName, PasswordHash, Role, UserAccount, UserValidationError, Username,
};
pub use self::wire_enum::UnknownVariant;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
