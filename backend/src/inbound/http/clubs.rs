//! Club catalogue handlers.
//!
//! ```text
//! GET /api/v1/clubs
//! GET /api/v1/clubs/{clubId}
//! POST /api/v1/clubs {"name":"Chess Society","description":"…","category":"social"}
//! PUT /api/v1/clubs/{clubId}/status {"status":"active"}
//! PUT /api/v1/clubs/{clubId}/leadership {"slot":"president","userId":"…"}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::NewClub;
use crate::domain::{
    Actor, CLUB_DESCRIPTION_MAX, Club, ClubCategory, ClubId, ClubName, ClubStatus,
    ClubValidationError, Error, Leadership, LeadershipSlot, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::memberships::MembershipResponse;
use crate::inbound::http::schemas::{ClubCategorySchema, ClubStatusSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, map_club_validation_error, parse_id, parse_wire_value, require,
};

pub(crate) const CLUB_ID: FieldName = FieldName::new("clubId");

/// Request body for `POST /api/v1/clubs`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<ClubCategorySchema>, example = "academic")]
    pub category: Option<String>,
}

/// Request body for `PUT /api/v1/clubs/{clubId}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubStatusRequest {
    #[schema(value_type = Option<ClubStatusSchema>, example = "active")]
    pub status: Option<String>,
}

/// Request body for `PUT /api/v1/clubs/{clubId}/leadership`.
///
/// Omitting `userId` vacates the slot.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadershipRequest {
    #[schema(example = "president")]
    pub slot: Option<String>,
    pub user_id: Option<String>,
}

/// Leadership slots; each holds a user id or `null`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadershipResponse {
    pub president: Option<String>,
    pub vice_president: Option<String>,
    pub secretary: Option<String>,
    pub treasurer: Option<String>,
}

impl From<&Leadership> for LeadershipResponse {
    fn from(value: &Leadership) -> Self {
        let slot = |id: Option<UserId>| id.map(|id| id.to_string());
        Self {
            president: slot(value.president),
            vice_president: slot(value.vice_president),
            secretary: slot(value.secretary),
            treasurer: slot(value.treasurer),
        }
    }
}

/// Club view. Member records are only included for administrators.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    #[schema(value_type = ClubCategorySchema)]
    pub category: String,
    #[schema(value_type = ClubStatusSchema)]
    pub status: String,
    pub member_count: usize,
    pub leadership: LeadershipResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<MembershipResponse>>,
    pub revision: u32,
    pub created_at: String,
}

impl ClubResponse {
    fn for_actor(club: Club, actor: &Actor) -> Self {
        let members = actor.is_admin().then(|| {
            club.members
                .iter()
                .cloned()
                .map(MembershipResponse::from)
                .collect()
        });
        Self {
            id: club.id.to_string(),
            name: club.name.to_string(),
            description: club.description.clone(),
            category: club.category.to_string(),
            status: club.status.to_string(),
            member_count: club.approved_count(),
            leadership: LeadershipResponse::from(&club.leadership),
            members,
            revision: club.revision,
            created_at: club.created_at.to_rfc3339(),
        }
    }
}

fn parse_new_club(payload: CreateClubRequest) -> Result<NewClub, Error> {
    let name = require(payload.name, FieldName::new("name"))?;
    let description = payload.description.unwrap_or_default().trim().to_owned();
    if description.chars().count() > CLUB_DESCRIPTION_MAX {
        return Err(map_club_validation_error(
            ClubValidationError::DescriptionTooLong {
                max: CLUB_DESCRIPTION_MAX,
            },
        ));
    }
    let category = require(payload.category, FieldName::new("category"))?;
    Ok(NewClub {
        name: ClubName::new(name).map_err(map_club_validation_error)?,
        description,
        category: parse_wire_value::<ClubCategory>(&category, FieldName::new("category"))?,
    })
}

fn parse_leadership(payload: LeadershipRequest) -> Result<(LeadershipSlot, Option<UserId>), Error> {
    let slot = require(payload.slot, FieldName::new("slot"))?;
    let slot = parse_wire_value::<LeadershipSlot>(&slot, FieldName::new("slot"))?;
    let user = payload
        .user_id
        .map(|raw| parse_id::<UserId>(&raw, FieldName::new("userId")))
        .transpose()?;
    Ok((slot, user))
}

/// List clubs visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/clubs",
    description = "Administrators see every club; other users only active clubs.",
    responses(
        (status = 200, description = "Clubs", body = [ClubResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["clubs"],
    operation_id = "listClubs"
)]
#[get("/clubs")]
pub async fn list_clubs(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ClubResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let clubs = state.clubs_query.list(&actor).await?;
    Ok(web::Json(
        clubs
            .into_iter()
            .map(|club| ClubResponse::for_actor(club, &actor))
            .collect(),
    ))
}

/// Fetch one club.
#[utoipa::path(
    get,
    path = "/api/v1/clubs/{clubId}",
    params(("clubId" = String, Path, description = "Club identifier")),
    responses(
        (status = 200, description = "Club", body = ClubResponse),
        (status = 400, description = "Invalid club id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Club not found", body = ErrorSchema)
    ),
    tags = ["clubs"],
    operation_id = "getClub"
)]
#[get("/clubs/{clubId}")]
pub async fn get_club(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ClubResponse>> {
    let club_id: ClubId = parse_id(&path.into_inner(), CLUB_ID)?;
    let actor = current_actor(&state, &session).await?;
    let club = state.clubs_query.get(&actor, &club_id).await?;
    Ok(web::Json(ClubResponse::for_actor(club, &actor)))
}

/// Create a club awaiting approval. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/clubs",
    request_body = CreateClubRequest,
    responses(
        (status = 201, description = "Club created", body = ClubResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 409, description = "A club with this name already exists", body = ErrorSchema)
    ),
    tags = ["clubs"],
    operation_id = "createClub"
)]
#[post("/clubs")]
pub async fn create_club(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateClubRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let new_club = parse_new_club(payload.into_inner())?;
    let club = state.clubs.create(&actor, new_club).await?;
    Ok(HttpResponse::Created().json(ClubResponse::for_actor(club, &actor)))
}

/// Change a club's lifecycle status. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/clubs/{clubId}/status",
    params(("clubId" = String, Path, description = "Club identifier")),
    request_body = ClubStatusRequest,
    responses(
        (status = 200, description = "Updated club", body = ClubResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Club not found", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema)
    ),
    tags = ["clubs"],
    operation_id = "updateClubStatus"
)]
#[put("/clubs/{clubId}/status")]
pub async fn update_club_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ClubStatusRequest>,
) -> ApiResult<web::Json<ClubResponse>> {
    let club_id: ClubId = parse_id(&path.into_inner(), CLUB_ID)?;
    let status = require(payload.into_inner().status, FieldName::new("status"))?;
    let status = parse_wire_value::<ClubStatus>(&status, FieldName::new("status"))?;
    let actor = current_actor(&state, &session).await?;
    let club = state.clubs.update_status(&actor, &club_id, status).await?;
    Ok(web::Json(ClubResponse::for_actor(club, &actor)))
}

/// Assign or vacate a leadership slot. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/clubs/{clubId}/leadership",
    params(("clubId" = String, Path, description = "Club identifier")),
    request_body = LeadershipRequest,
    responses(
        (status = 200, description = "Updated club", body = ClubResponse),
        (status = 400, description = "Invalid request or user is not an approved member", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Club not found", body = ErrorSchema)
    ),
    tags = ["clubs"],
    operation_id = "assignLeadership"
)]
#[put("/clubs/{clubId}/leadership")]
pub async fn assign_leadership(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<LeadershipRequest>,
) -> ApiResult<web::Json<ClubResponse>> {
    let club_id: ClubId = parse_id(&path.into_inner(), CLUB_ID)?;
    let (slot, user) = parse_leadership(payload.into_inner())?;
    let actor = current_actor(&state, &session).await?;
    let club = state
        .clubs
        .assign_leadership(&actor, &club_id, slot, user)
        .await?;
    Ok(web::Json(ClubResponse::for_actor(club, &actor)))
}

#[cfg(test)]
#[path = "clubs_tests.rs"]
mod tests;
