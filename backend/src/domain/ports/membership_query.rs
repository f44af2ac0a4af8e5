//! Driving port for membership reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Actor, ClubId, Error, MemberRole, Membership, MembershipId, MembershipStatus,
};

/// One of the caller's memberships, tagged with its club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipSummary {
    pub club_id: ClubId,
    pub club_name: String,
    pub membership_id: MembershipId,
    pub status: MembershipStatus,
    pub role: MemberRole,
    pub requested_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipQuery: Send + Sync {
    /// Pending requests for a club in the order they were made. Admin only.
    async fn pending_requests(
        &self,
        actor: &Actor,
        club_id: &ClubId,
    ) -> Result<Vec<Membership>, Error>;

    /// The caller's membership records across clubs, newest request first.
    async fn my_memberships(&self, actor: &Actor) -> Result<Vec<MembershipSummary>, Error>;
}
