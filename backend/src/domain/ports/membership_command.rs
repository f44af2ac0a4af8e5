//! Driving port for the membership workflow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Actor, ClubId, Error, MemberProfile, Membership, MembershipId, MembershipStatus,
};

/// Acknowledgement returned for a new join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReceipt {
    pub club_id: ClubId,
    pub membership_id: MembershipId,
    pub status: MembershipStatus,
    pub message: String,
}

/// Membership transitions.
///
/// Join and leave act on the calling user; approve and reject require an
/// admin actor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipCommand: Send + Sync {
    /// Request to join an active club.
    async fn request_join(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        profile: MemberProfile,
    ) -> Result<JoinReceipt, Error>;

    /// Approve a membership and record the club on the user.
    async fn approve(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        membership_id: &MembershipId,
    ) -> Result<Membership, Error>;

    /// Reject a membership.
    async fn reject(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        membership_id: &MembershipId,
    ) -> Result<Membership, Error>;

    /// Leave a club, removing the caller's active membership.
    async fn leave(&self, actor: &Actor, club_id: &ClubId) -> Result<(), Error>;
}
