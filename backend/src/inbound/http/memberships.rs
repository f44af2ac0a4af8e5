//! Membership workflow handlers.
//!
//! ```text
//! POST /api/v1/clubs/{clubId}/join {"fullName":"…","department":"…","year":"2"}
//! POST /api/v1/clubs/{clubId}/members/{membershipId}/approve
//! POST /api/v1/clubs/{clubId}/members/{membershipId}/reject
//! POST /api/v1/clubs/{clubId}/leave
//! GET /api/v1/clubs/{clubId}/requests
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::JoinReceipt;
use crate::domain::{ClubId, Error, MemberProfile, Membership, MembershipId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::clubs::CLUB_ID;
use crate::inbound::http::schemas::{ErrorSchema, MemberRoleSchema, MembershipStatusSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, map_club_validation_error, parse_id, require};

const MEMBERSHIP_ID: FieldName = FieldName::new("membershipId");

/// Applicant details for `POST /api/v1/clubs/{clubId}/join`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub full_name: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub background: Option<String>,
}

impl TryFrom<JoinRequest> for MemberProfile {
    type Error = Error;

    fn try_from(value: JoinRequest) -> Result<Self, Self::Error> {
        let full_name = require(value.full_name, FieldName::new("fullName"))?;
        let department = require(value.department, FieldName::new("department"))?;
        let year = require(value.year, FieldName::new("year"))?;
        MemberProfile::try_new(
            &full_name,
            &department,
            &year,
            value.background.as_deref().unwrap_or_default(),
        )
        .map_err(map_club_validation_error)
    }
}

/// Acknowledgement for a new join request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinReceiptResponse {
    pub club_id: String,
    pub membership_id: String,
    #[schema(value_type = MembershipStatusSchema, example = "pending")]
    pub status: String,
    #[schema(example = "Join request submitted successfully")]
    pub message: String,
}

impl From<JoinReceipt> for JoinReceiptResponse {
    fn from(value: JoinReceipt) -> Self {
        Self {
            club_id: value.club_id.to_string(),
            membership_id: value.membership_id.to_string(),
            status: value.status.to_string(),
            message: value.message,
        }
    }
}

/// A membership record with the applicant snapshot.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub department: String,
    pub year: String,
    pub background: String,
    #[schema(value_type = MemberRoleSchema, example = "member")]
    pub role: String,
    #[schema(value_type = MembershipStatusSchema, example = "approved")]
    pub status: String,
    pub requested_at: String,
    pub decided_at: Option<String>,
}

impl From<Membership> for MembershipResponse {
    fn from(value: Membership) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            full_name: value.profile.full_name,
            department: value.profile.department,
            year: value.profile.year,
            background: value.profile.background,
            role: value.role.to_string(),
            status: value.status.to_string(),
            requested_at: value.requested_at.to_rfc3339(),
            decided_at: value.decided_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Plain acknowledgement message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn member_path(path: web::Path<(String, String)>) -> Result<(ClubId, MembershipId), Error> {
    let (club_id, membership_id) = path.into_inner();
    Ok((
        parse_id(&club_id, CLUB_ID)?,
        parse_id(&membership_id, MEMBERSHIP_ID)?,
    ))
}

/// Request to join an active club.
#[utoipa::path(
    post,
    path = "/api/v1/clubs/{clubId}/join",
    params(("clubId" = String, Path, description = "Club identifier")),
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Join request recorded as pending", body = JoinReceiptResponse),
        (status = 400, description = "Invalid request or inactive club", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Club not found", body = ErrorSchema),
        (status = 409, description = "Pending request or membership already exists", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "joinClub"
)]
#[post("/clubs/{clubId}/join")]
pub async fn join_club(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<JoinRequest>,
) -> ApiResult<web::Json<JoinReceiptResponse>> {
    let club_id: ClubId = parse_id(&path.into_inner(), CLUB_ID)?;
    let actor = current_actor(&state, &session).await?;
    let profile = MemberProfile::try_from(payload.into_inner())?;
    let receipt = state
        .memberships
        .request_join(&actor, &club_id, profile)
        .await?;
    Ok(web::Json(JoinReceiptResponse::from(receipt)))
}

/// Approve a membership request. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/clubs/{clubId}/members/{membershipId}/approve",
    params(
        ("clubId" = String, Path, description = "Club identifier"),
        ("membershipId" = String, Path, description = "Membership identifier")
    ),
    responses(
        (status = 200, description = "Approved membership", body = MembershipResponse),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Club or membership not found", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "approveMember"
)]
#[post("/clubs/{clubId}/members/{membershipId}/approve")]
pub async fn approve_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MembershipResponse>> {
    let (club_id, membership_id) = member_path(path)?;
    let actor = current_actor(&state, &session).await?;
    let membership = state
        .memberships
        .approve(&actor, &club_id, &membership_id)
        .await?;
    Ok(web::Json(MembershipResponse::from(membership)))
}

/// Reject a membership request. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/clubs/{clubId}/members/{membershipId}/reject",
    params(
        ("clubId" = String, Path, description = "Club identifier"),
        ("membershipId" = String, Path, description = "Membership identifier")
    ),
    responses(
        (status = 200, description = "Rejected membership", body = MembershipResponse),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Club or membership not found", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "rejectMember"
)]
#[post("/clubs/{clubId}/members/{membershipId}/reject")]
pub async fn reject_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<MembershipResponse>> {
    let (club_id, membership_id) = member_path(path)?;
    let actor = current_actor(&state, &session).await?;
    let membership = state
        .memberships
        .reject(&actor, &club_id, &membership_id)
        .await?;
    Ok(web::Json(MembershipResponse::from(membership)))
}

/// Leave a club.
#[utoipa::path(
    post,
    path = "/api/v1/clubs/{clubId}/leave",
    params(("clubId" = String, Path, description = "Club identifier")),
    responses(
        (status = 200, description = "Membership removed", body = MessageResponse),
        (status = 400, description = "Caller is not a member", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Club not found", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "leaveClub"
)]
#[post("/clubs/{clubId}/leave")]
pub async fn leave_club(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let club_id: ClubId = parse_id(&path.into_inner(), CLUB_ID)?;
    let actor = current_actor(&state, &session).await?;
    state.memberships.leave(&actor, &club_id).await?;
    Ok(web::Json(MessageResponse {
        message: "You have left the club".to_owned(),
    }))
}

/// Pending join requests in the order they were made. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/clubs/{clubId}/requests",
    params(("clubId" = String, Path, description = "Club identifier")),
    responses(
        (status = 200, description = "Pending requests", body = [MembershipResponse]),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Club not found", body = ErrorSchema)
    ),
    tags = ["memberships"],
    operation_id = "listJoinRequests"
)]
#[get("/clubs/{clubId}/requests")]
pub async fn list_join_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MembershipResponse>>> {
    let club_id: ClubId = parse_id(&path.into_inner(), CLUB_ID)?;
    let actor = current_actor(&state, &session).await?;
    let pending = state
        .memberships_query
        .pending_requests(&actor, &club_id)
        .await?;
    Ok(web::Json(
        pending.into_iter().map(MembershipResponse::from).collect(),
    ))
}

#[cfg(test)]
#[path = "memberships_tests.rs"]
mod tests;
