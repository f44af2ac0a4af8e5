//! Driving port for club administration.

use async_trait::async_trait;

use crate::domain::{
    Actor, Club, ClubCategory, ClubId, ClubName, ClubStatus, Error, LeadershipSlot, UserId,
};

/// Validated input for a new club.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClub {
    pub name: ClubName,
    pub description: String,
    pub category: ClubCategory,
}

/// Administrative club operations. Every method requires an admin actor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubCommand: Send + Sync {
    /// Create a club awaiting approval.
    ///
    /// # Errors
    ///
    /// `Conflict` when another club already uses the name, ignoring case.
    async fn create(&self, actor: &Actor, club: NewClub) -> Result<Club, Error>;

    /// Change a club's lifecycle status.
    async fn update_status(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        status: ClubStatus,
    ) -> Result<Club, Error>;

    /// Assign (`Some`) or clear (`None`) a leadership slot.
    async fn assign_leadership(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        slot: LeadershipSlot,
        user: Option<UserId>,
    ) -> Result<Club, Error>;
}
