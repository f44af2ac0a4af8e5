//! Election administration, voting and results handlers.
//!
//! ```text
//! GET /api/v1/elections
//! GET /api/v1/elections/{electionId}
//! POST /api/v1/elections {"title":"…","startDate":"…","endDate":"…","candidates":[…]}
//! PUT /api/v1/elections/{electionId}/status {"status":"active"}
//! POST /api/v1/elections/{electionId}/vote {"candidateId":"…"}
//! POST /api/v1/elections/{electionId}/announce
//! GET /api/v1/elections/{electionId}/results
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::VoteReceipt;
use crate::domain::{
    Actor, Candidate, CandidateId, Election, ElectionDraft, ElectionId, ElectionResults,
    ElectionStatus, Error, NewCandidate, RankedCandidate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::schemas::{ElectionStatusSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_id, parse_rfc3339_timestamp, parse_wire_value, require,
};

const ELECTION_ID: FieldName = FieldName::new("electionId");
const CANDIDATE_ID: FieldName = FieldName::new("candidateId");

/// Candidate entry in [`CreateElectionRequest`].
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    pub profile_image: Option<String>,
    #[serde(default)]
    pub platform: Vec<String>,
}

impl From<CandidateRequest> for NewCandidate {
    fn from(value: CandidateRequest) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            department: value.department.unwrap_or_default(),
            academic_year: value.academic_year.unwrap_or_default(),
            profile_image: value.profile_image,
            platform: value.platform,
        }
    }
}

/// Request body for `POST /api/v1/elections`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2026-10-01T09:00:00Z")]
    pub start_date: Option<String>,
    #[schema(example = "2026-10-03T17:00:00Z")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub candidates: Vec<CandidateRequest>,
    #[serde(default)]
    pub eligible_voters: u32,
}

impl TryFrom<CreateElectionRequest> for ElectionDraft {
    type Error = Error;

    fn try_from(value: CreateElectionRequest) -> Result<Self, Self::Error> {
        let title = require(value.title, FieldName::new("title"))?;
        let start = require(value.start_date, FieldName::new("startDate"))?;
        let end = require(value.end_date, FieldName::new("endDate"))?;
        Ok(Self {
            title,
            description: value.description.unwrap_or_default(),
            start_date: parse_rfc3339_timestamp(start, FieldName::new("startDate"))?,
            end_date: parse_rfc3339_timestamp(end, FieldName::new("endDate"))?,
            candidates: value.candidates.into_iter().map(NewCandidate::from).collect(),
            eligible_voters: value.eligible_voters,
        })
    }
}

/// Request body for `PUT /api/v1/elections/{electionId}/status`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElectionStatusRequest {
    #[schema(value_type = Option<ElectionStatusSchema>, example = "active")]
    pub status: Option<String>,
}

/// Request body for `POST /api/v1/elections/{electionId}/vote`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub candidate_id: Option<String>,
}

/// Candidate view. `votes` is withheld from non-administrators until results
/// are announced.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub id: String,
    pub name: String,
    pub department: String,
    pub academic_year: String,
    pub profile_image: Option<String>,
    pub platform: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
}

impl CandidateResponse {
    fn new(candidate: Candidate, show_votes: bool) -> Self {
        Self {
            id: candidate.id.to_string(),
            name: candidate.name,
            department: candidate.department,
            academic_year: candidate.academic_year,
            profile_image: candidate.profile_image,
            platform: candidate.platform,
            votes: show_votes.then_some(candidate.votes),
        }
    }
}

/// Election view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    #[schema(value_type = ElectionStatusSchema, example = "active")]
    pub status: String,
    pub candidates: Vec<CandidateResponse>,
    pub total_votes: u64,
    pub eligible_voters: u32,
    pub announced_at: Option<String>,
    pub revision: u32,
    pub created_at: String,
}

impl ElectionResponse {
    fn for_actor(election: Election, actor: &Actor) -> Self {
        let show_votes = actor.is_admin()
            || matches!(election.status, ElectionStatus::ResultsAnnounced);
        Self {
            id: election.id.to_string(),
            title: election.title,
            description: election.description,
            start_date: election.start_date.to_rfc3339(),
            end_date: election.end_date.to_rfc3339(),
            status: election.status.to_string(),
            candidates: election
                .candidates
                .into_iter()
                .map(|candidate| CandidateResponse::new(candidate, show_votes))
                .collect(),
            total_votes: election.total_votes,
            eligible_voters: election.eligible_voters,
            announced_at: election.announced_at.map(|at| at.to_rfc3339()),
            revision: election.revision,
            created_at: election.created_at.to_rfc3339(),
        }
    }
}

/// Ranked entry in [`ResultsResponse`].
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidateResponse {
    pub rank: u32,
    pub candidate_id: String,
    pub name: String,
    pub department: String,
    pub votes: u64,
    #[schema(example = 62.5)]
    pub share_percent: f64,
}

impl From<RankedCandidate> for RankedCandidateResponse {
    fn from(value: RankedCandidate) -> Self {
        Self {
            rank: value.rank,
            candidate_id: value.candidate_id.to_string(),
            name: value.name,
            department: value.department,
            votes: value.votes,
            share_percent: value.share_percent,
        }
    }
}

/// Ranked election results.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub election_id: String,
    pub title: String,
    #[schema(value_type = ElectionStatusSchema)]
    pub status: String,
    pub total_votes: u64,
    pub eligible_voters: u32,
    pub announced_at: Option<String>,
    pub candidates: Vec<RankedCandidateResponse>,
    pub winners: Vec<String>,
}

impl From<ElectionResults> for ResultsResponse {
    fn from(value: ElectionResults) -> Self {
        Self {
            election_id: value.election_id.to_string(),
            title: value.title,
            status: value.status.to_string(),
            total_votes: value.total_votes,
            eligible_voters: value.eligible_voters,
            announced_at: value.announced_at.map(|at| at.to_rfc3339()),
            candidates: value
                .candidates
                .into_iter()
                .map(RankedCandidateResponse::from)
                .collect(),
            winners: value.winners.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Acknowledgement for a recorded vote.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceiptResponse {
    pub election_id: String,
    pub candidate_id: String,
    #[schema(example = "Vote cast successfully")]
    pub message: String,
}

impl From<VoteReceipt> for VoteReceiptResponse {
    fn from(value: VoteReceipt) -> Self {
        Self {
            election_id: value.election_id.to_string(),
            candidate_id: value.candidate_id.to_string(),
            message: value.message,
        }
    }
}

/// List all elections.
#[utoipa::path(
    get,
    path = "/api/v1/elections",
    responses(
        (status = 200, description = "Elections", body = [ElectionResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "listElections"
)]
#[get("/elections")]
pub async fn list_elections(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ElectionResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let elections = state.elections_query.list().await?;
    Ok(web::Json(
        elections
            .into_iter()
            .map(|election| ElectionResponse::for_actor(election, &actor))
            .collect(),
    ))
}

/// Fetch one election.
#[utoipa::path(
    get,
    path = "/api/v1/elections/{electionId}",
    params(("electionId" = String, Path, description = "Election identifier")),
    responses(
        (status = 200, description = "Election", body = ElectionResponse),
        (status = 400, description = "Invalid election id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Election not found", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "getElection"
)]
#[get("/elections/{electionId}")]
pub async fn get_election(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ElectionResponse>> {
    let election_id: ElectionId = parse_id(&path.into_inner(), ELECTION_ID)?;
    let actor = current_actor(&state, &session).await?;
    let election = state.elections_query.get(&election_id).await?;
    Ok(web::Json(ElectionResponse::for_actor(election, &actor)))
}

/// Create a pending election. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/elections",
    request_body = CreateElectionRequest,
    responses(
        (status = 201, description = "Election created", body = ElectionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "createElection"
)]
#[post("/elections")]
pub async fn create_election(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateElectionRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let draft = ElectionDraft::try_from(payload.into_inner())?;
    let election = state.elections.create(&actor, draft).await?;
    Ok(HttpResponse::Created().json(ElectionResponse::for_actor(election, &actor)))
}

/// Move an election between `pending`, `active` and `completed`. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/elections/{electionId}/status",
    params(("electionId" = String, Path, description = "Election identifier")),
    request_body = ElectionStatusRequest,
    responses(
        (status = 200, description = "Updated election", body = ElectionResponse),
        (status = 400, description = "Invalid request or transition", body = ErrorSchema),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Election not found", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "updateElectionStatus"
)]
#[put("/elections/{electionId}/status")]
pub async fn update_election_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ElectionStatusRequest>,
) -> ApiResult<web::Json<ElectionResponse>> {
    let election_id: ElectionId = parse_id(&path.into_inner(), ELECTION_ID)?;
    let status = require(payload.into_inner().status, FieldName::new("status"))?;
    let status = parse_wire_value::<ElectionStatus>(&status, FieldName::new("status"))?;
    let actor = current_actor(&state, &session).await?;
    let election = state
        .elections
        .update_status(&actor, &election_id, status)
        .await?;
    Ok(web::Json(ElectionResponse::for_actor(election, &actor)))
}

/// Cast the caller's vote.
#[utoipa::path(
    post,
    path = "/api/v1/elections/{electionId}/vote",
    params(("electionId" = String, Path, description = "Election identifier")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteReceiptResponse),
        (status = 400, description = "Invalid request or election closed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Election or candidate not found", body = ErrorSchema),
        (status = 409, description = "Already voted", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "castVote"
)]
#[post("/elections/{electionId}/vote")]
pub async fn cast_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<web::Json<VoteReceiptResponse>> {
    let election_id: ElectionId = parse_id(&path.into_inner(), ELECTION_ID)?;
    let candidate = require(payload.into_inner().candidate_id, CANDIDATE_ID)?;
    let candidate_id: CandidateId = parse_id(&candidate, CANDIDATE_ID)?;
    let actor = current_actor(&state, &session).await?;
    let receipt = state
        .elections
        .cast_vote(&actor, &election_id, &candidate_id)
        .await?;
    Ok(web::Json(VoteReceiptResponse::from(receipt)))
}

/// Announce results. Admin only; repeating the call returns the same tally.
#[utoipa::path(
    post,
    path = "/api/v1/elections/{electionId}/announce",
    params(("electionId" = String, Path, description = "Election identifier")),
    responses(
        (status = 200, description = "Announced results", body = ResultsResponse),
        (status = 403, description = "Administrator role required", body = ErrorSchema),
        (status = 404, description = "Election not found", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "announceResults"
)]
#[post("/elections/{electionId}/announce")]
pub async fn announce_results(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ResultsResponse>> {
    let election_id: ElectionId = parse_id(&path.into_inner(), ELECTION_ID)?;
    let actor = current_actor(&state, &session).await?;
    let results = state.elections.announce(&actor, &election_id).await?;
    Ok(web::Json(ResultsResponse::from(results)))
}

/// Ranked results. Non-administrators may only read announced results.
#[utoipa::path(
    get,
    path = "/api/v1/elections/{electionId}/results",
    params(("electionId" = String, Path, description = "Election identifier")),
    responses(
        (status = 200, description = "Ranked results", body = ResultsResponse),
        (status = 403, description = "Results not announced", body = ErrorSchema),
        (status = 404, description = "Election not found", body = ErrorSchema)
    ),
    tags = ["elections"],
    operation_id = "electionResults"
)]
#[get("/elections/{electionId}/results")]
pub async fn election_results(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ResultsResponse>> {
    let election_id: ElectionId = parse_id(&path.into_inner(), ELECTION_ID)?;
    let actor = current_actor(&state, &session).await?;
    let results = state.elections_query.results(&actor, &election_id).await?;
    Ok(web::Json(ResultsResponse::from(results)))
}

#[cfg(test)]
#[path = "elections_tests.rs"]
mod tests;
