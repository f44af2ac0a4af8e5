//! OpenAPI shapes for domain types.
//!
//! Domain types do not derive `ToSchema`; the mirrors below describe their
//! wire form instead. DTO fields that carry a domain enum as a string point
//! at these with `#[schema(value_type = ...)]` so the document lists the
//! accepted values.

use utoipa::ToSchema;

/// Mirror of [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCodeSchema {
    /// Malformed input or a failed field check.
    InvalidRequest,
    /// Not allowed while the club, membership or election is in its current status.
    InvalidState,
    /// No session, bad credentials or an expired account.
    Unauthorized,
    /// Signed in but lacking the administrator role, or locked out.
    Forbidden,
    NotFound,
    /// Duplicate request, repeat vote or a concurrent update.
    Conflict,
    ServiceUnavailable,
    InternalError,
}

/// Mirror of [`crate::domain::Error`], the body of every non-2xx response.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[serde(rename_all = "camelCase")]
#[expect(dead_code, reason = "only read by utoipa schema generation")]
pub struct ErrorSchema {
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    #[schema(example = "You have already voted in this election")]
    message: String,
    /// Matches the `trace-id` response header.
    #[schema(example = "6f1c9a2e-4b7d-4e1a-9c3f-2d8b5a0e7f14")]
    trace_id: Option<String>,
    /// Machine-readable context such as the offending `field`.
    #[schema(value_type = Option<Object>)]
    details: Option<serde_json::Value>,
}

/// Account role.
#[derive(ToSchema)]
#[schema(as = Role)]
#[serde(rename_all = "snake_case")]
pub enum RoleSchema {
    Student,
    Admin,
}

/// Club lifecycle status.
#[derive(ToSchema)]
#[schema(as = ClubStatus)]
#[serde(rename_all = "snake_case")]
pub enum ClubStatusSchema {
    PendingApproval,
    /// Listed to everyone and open to join requests.
    Active,
    Inactive,
}

#[derive(ToSchema)]
#[schema(as = ClubCategory)]
#[serde(rename_all = "snake_case")]
pub enum ClubCategorySchema {
    Academic,
    Sports,
    Cultural,
    Technical,
    Social,
    Other,
}

/// Join request status.
#[derive(ToSchema)]
#[schema(as = MembershipStatus)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatusSchema {
    Pending,
    Approved,
    Rejected,
}

#[derive(ToSchema)]
#[schema(as = MemberRole)]
#[serde(rename_all = "snake_case")]
pub enum MemberRoleSchema {
    Member,
    /// Holds a leadership slot.
    Officer,
}

/// Election lifecycle status.
#[derive(ToSchema)]
#[schema(as = ElectionStatus)]
#[serde(rename_all = "snake_case")]
pub enum ElectionStatusSchema {
    Pending,
    /// Open for voting.
    Active,
    /// Closed; results not yet public.
    Completed,
    ResultsAnnounced,
}
