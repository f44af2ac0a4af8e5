//! Membership workflow service.
//!
//! Each operation loads one club document, applies a single transition and
//! saves it with a revision check. The user's `joined_clubs` back-reference
//! is updated afterwards with idempotent set operations, so replaying an
//! approval repairs a back-reference lost to a failed second write.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    ClubRepository, JoinReceipt, MembershipCommand, MembershipQuery, MembershipSummary,
    UserRepository,
};
use crate::domain::service_support::{load_club, map_club_error, map_user_error, save_club};
use crate::domain::{
    Actor, Club, ClubId, Error, MemberProfile, Membership, MembershipId, MembershipRuleError,
    MembershipStatus,
};

/// Membership service implementing the membership driving ports.
#[derive(Clone)]
pub struct MembershipService<C, U> {
    clubs: Arc<C>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<C, U> MembershipService<C, U> {
    /// Create a service that keeps club documents and user back-references in step.
    pub fn new(clubs: Arc<C>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            clubs,
            users,
            clock,
        }
    }
}

fn membership(club: &Club, id: &MembershipId) -> Result<Membership, Error> {
    club.members
        .iter()
        .find(|member| member.id == *id)
        .cloned()
        .ok_or_else(|| MembershipRuleError::MembershipNotFound.into())
}

fn status_of(club: &Club, id: &MembershipId) -> Option<MembershipStatus> {
    club.members
        .iter()
        .find(|member| member.id == *id)
        .map(|member| member.status)
}

#[async_trait]
impl<C, U> MembershipCommand for MembershipService<C, U>
where
    C: ClubRepository,
    U: UserRepository,
{
    async fn request_join(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        profile: MemberProfile,
    ) -> Result<JoinReceipt, Error> {
        let mut club = load_club(self.clubs.as_ref(), club_id).await?;
        let membership_id = club.request_join(actor.user_id, profile, self.clock.utc())?;
        save_club(self.clubs.as_ref(), &mut club).await?;
        info!(club_id = %club.id, user_id = %actor.user_id, "join request submitted");
        Ok(JoinReceipt {
            club_id: club.id,
            membership_id,
            status: MembershipStatus::Pending,
            message: "Join request submitted successfully".to_owned(),
        })
    }

    async fn approve(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        membership_id: &MembershipId,
    ) -> Result<Membership, Error> {
        actor.require_admin()?;
        let mut club = load_club(self.clubs.as_ref(), club_id).await?;
        let before = status_of(&club, membership_id);
        let user_id = club.approve(*membership_id, self.clock.utc())?;
        if before != Some(MembershipStatus::Approved) {
            save_club(self.clubs.as_ref(), &mut club).await?;
            info!(club_id = %club.id, %user_id, "membership approved");
        }
        self.users
            .add_joined_club(&user_id, &club.id)
            .await
            .map_err(map_user_error)?;
        membership(&club, membership_id)
    }

    async fn reject(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        membership_id: &MembershipId,
    ) -> Result<Membership, Error> {
        actor.require_admin()?;
        let mut club = load_club(self.clubs.as_ref(), club_id).await?;
        let before = status_of(&club, membership_id);
        let rejection = club.reject(*membership_id, self.clock.utc())?;
        if before != Some(MembershipStatus::Rejected) {
            save_club(self.clubs.as_ref(), &mut club).await?;
            info!(club_id = %club.id, user_id = %rejection.user_id, "membership rejected");
        }
        if rejection.was_approved {
            self.users
                .remove_joined_club(&rejection.user_id, &club.id)
                .await
                .map_err(map_user_error)?;
        }
        membership(&club, membership_id)
    }

    async fn leave(&self, actor: &Actor, club_id: &ClubId) -> Result<(), Error> {
        let mut club = load_club(self.clubs.as_ref(), club_id).await?;
        club.leave(actor.user_id)?;
        save_club(self.clubs.as_ref(), &mut club).await?;
        self.users
            .remove_joined_club(&actor.user_id, &club.id)
            .await
            .map_err(map_user_error)?;
        info!(club_id = %club.id, user_id = %actor.user_id, "member left club");
        Ok(())
    }
}

#[async_trait]
impl<C, U> MembershipQuery for MembershipService<C, U>
where
    C: ClubRepository,
    U: UserRepository,
{
    async fn pending_requests(
        &self,
        actor: &Actor,
        club_id: &ClubId,
    ) -> Result<Vec<Membership>, Error> {
        actor.require_admin()?;
        let club = load_club(self.clubs.as_ref(), club_id).await?;
        Ok(club.pending_requests())
    }

    async fn my_memberships(&self, actor: &Actor) -> Result<Vec<MembershipSummary>, Error> {
        let clubs = self
            .clubs
            .list_for_member(&actor.user_id)
            .await
            .map_err(map_club_error)?;
        let mut summaries: Vec<MembershipSummary> = clubs
            .iter()
            .flat_map(|club| {
                club.members
                    .iter()
                    .filter(|member| member.user_id == actor.user_id)
                    .map(|member| MembershipSummary {
                        club_id: club.id,
                        club_name: club.name.to_string(),
                        membership_id: member.id,
                        status: member.status,
                        role: member.role,
                        requested_at: member.requested_at,
                    })
            })
            .collect();
        summaries.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(summaries)
    }
}

#[cfg(test)]
#[path = "membership_service_tests.rs"]
mod tests;
