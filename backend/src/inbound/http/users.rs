//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"ada","password":"…","displayName":"Ada"}
//! POST /api/v1/login {"username":"ada","password":"…"}
//! POST /api/v1/logout
//! GET /api/v1/users/me
//! GET /api/v1/users/me/memberships
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{MembershipSummary, UserProfile};
use crate::domain::{Error, LoginCredentials, LoginValidationError, Registration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::schemas::{ErrorSchema, MemberRoleSchema, MembershipStatusSchema, RoleSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_registration_error;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Registration request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub department: Option<String>,
    pub year: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Registration::try_new(
            &value.username,
            &value.password,
            &value.display_name,
            value.department.as_deref(),
            value.year.as_deref(),
        )
        .map_err(map_registration_error)
    }
}

/// Account view returned by registration, login and `users/me`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[schema(value_type = RoleSchema, example = "student")]
    pub role: String,
    pub department: Option<String>,
    pub year: Option<String>,
    pub joined_clubs: Vec<String>,
    pub voted_elections: Vec<String>,
    pub created_at: String,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
            display_name: value.display_name,
            role: value.role.to_string(),
            department: value.department,
            year: value.year,
            joined_clubs: value.joined_clubs.iter().map(ToString::to_string).collect(),
            voted_elections: value
                .voted_elections
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// One of the caller's memberships.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSummaryResponse {
    pub club_id: String,
    pub club_name: String,
    pub membership_id: String,
    #[schema(value_type = MembershipStatusSchema, example = "pending")]
    pub status: String,
    #[schema(value_type = MemberRoleSchema, example = "member")]
    pub role: String,
    pub requested_at: String,
}

impl From<MembershipSummary> for MembershipSummaryResponse {
    fn from(value: MembershipSummary) -> Self {
        Self {
            club_id: value.club_id.to_string(),
            club_name: value.club_name,
            membership_id: value.membership_id.to_string(),
            status: value.status.to_string(),
            role: value.role.to_string(),
            requested_at: value.requested_at.to_rfc3339(),
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Create a student account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Username already taken", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let profile = state.registration.register(registration).await?;
    Ok(HttpResponse::Created().json(UserProfileResponse::from(profile)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "Account locked", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    let profile = state.profile.fetch_profile(&user_id).await?;
    Ok(HttpResponse::Ok().json(UserProfileResponse::from(profile)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Fetch the authenticated user's account.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfileResponse>> {
    let user_id = session.require_user_id()?;
    let profile = state.profile.fetch_profile(&user_id).await?;
    Ok(web::Json(UserProfileResponse::from(profile)))
}

/// List the caller's memberships, newest request first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/memberships",
    responses(
        (status = 200, description = "Memberships", body = [MembershipSummaryResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "myMemberships"
)]
#[get("/users/me/memberships")]
pub async fn my_memberships(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<MembershipSummaryResponse>>> {
    let actor = current_actor(&state, &session).await?;
    let memberships = state.memberships_query.my_memberships(&actor).await?;
    Ok(web::Json(
        memberships
            .into_iter()
            .map(MembershipSummaryResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
