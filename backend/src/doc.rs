//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! request/response DTOs and the error schema wrappers, plus the session
//! cookie security scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use crate::inbound::http::clubs::{
    ClubResponse, ClubStatusRequest, CreateClubRequest, LeadershipRequest, LeadershipResponse,
};
use crate::inbound::http::elections::{
    CandidateRequest, CandidateResponse, CreateElectionRequest, ElectionResponse,
    ElectionStatusRequest, RankedCandidateResponse, ResultsResponse, VoteReceiptResponse,
    VoteRequest,
};
use crate::inbound::http::memberships::{
    JoinReceiptResponse, JoinRequest, MembershipResponse, MessageResponse,
};
use crate::inbound::http::schemas::{
    ClubCategorySchema, ClubStatusSchema, ElectionStatusSchema, ErrorCodeSchema, ErrorSchema,
    MemberRoleSchema, MembershipStatusSchema, RoleSchema,
};
use crate::inbound::http::users::{
    LoginRequest, MembershipSummaryResponse, RegisterRequest, UserProfileResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Campus services API",
        description = "Club membership workflows and student elections behind a session cookie."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::my_memberships,
        crate::inbound::http::clubs::list_clubs,
        crate::inbound::http::clubs::get_club,
        crate::inbound::http::clubs::create_club,
        crate::inbound::http::clubs::update_club_status,
        crate::inbound::http::clubs::assign_leadership,
        crate::inbound::http::memberships::join_club,
        crate::inbound::http::memberships::approve_member,
        crate::inbound::http::memberships::reject_member,
        crate::inbound::http::memberships::leave_club,
        crate::inbound::http::memberships::list_join_requests,
        crate::inbound::http::elections::list_elections,
        crate::inbound::http::elections::get_election,
        crate::inbound::http::elections::create_election,
        crate::inbound::http::elections::update_election_status,
        crate::inbound::http::elections::cast_vote,
        crate::inbound::http::elections::announce_results,
        crate::inbound::http::elections::election_results,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        ClubStatusSchema,
        ClubCategorySchema,
        MembershipStatusSchema,
        MemberRoleSchema,
        ElectionStatusSchema,
        LoginRequest,
        RegisterRequest,
        UserProfileResponse,
        MembershipSummaryResponse,
        CreateClubRequest,
        ClubStatusRequest,
        LeadershipRequest,
        LeadershipResponse,
        ClubResponse,
        JoinRequest,
        JoinReceiptResponse,
        MembershipResponse,
        MessageResponse,
        CreateElectionRequest,
        CandidateRequest,
        ElectionStatusRequest,
        VoteRequest,
        CandidateResponse,
        ElectionResponse,
        RankedCandidateResponse,
        ResultsResponse,
        VoteReceiptResponse,
    )),
    tags(
        (name = "users", description = "Registration, sessions and profiles"),
        (name = "clubs", description = "Club catalogue and leadership"),
        (name = "memberships", description = "Join requests and membership decisions"),
        (name = "elections", description = "Election administration, voting and results"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
