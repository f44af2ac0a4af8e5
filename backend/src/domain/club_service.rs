//! Club catalogue service: creation, visibility-filtered reads, status and
//! leadership administration.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{ClubCommand, ClubQuery, ClubRepository, NewClub};
use crate::domain::service_support::{club_not_found, load_club, map_club_error, save_club};
use crate::domain::{Actor, Club, ClubId, ClubStatus, Error, LeadershipSlot, UserId};

/// Club service implementing the club driving ports.
#[derive(Clone)]
pub struct ClubService<C> {
    clubs: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C> ClubService<C> {
    /// Create a service over a club repository.
    pub fn new(clubs: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { clubs, clock }
    }
}

#[async_trait]
impl<C> ClubCommand for ClubService<C>
where
    C: ClubRepository,
{
    async fn create(&self, actor: &Actor, club: NewClub) -> Result<Club, Error> {
        actor.require_admin()?;
        let created = Club::new(club.name, &club.description, club.category, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.clubs
            .save(&created, None)
            .await
            .map_err(map_club_error)?;
        info!(club_id = %created.id, name = %created.name, "created club");
        Ok(created)
    }

    async fn update_status(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        status: ClubStatus,
    ) -> Result<Club, Error> {
        actor.require_admin()?;
        let mut club = load_club(self.clubs.as_ref(), club_id).await?;
        if club.status == status {
            return Ok(club);
        }
        club.status = status;
        save_club(self.clubs.as_ref(), &mut club).await?;
        info!(club_id = %club.id, status = %status, "changed club status");
        Ok(club)
    }

    async fn assign_leadership(
        &self,
        actor: &Actor,
        club_id: &ClubId,
        slot: LeadershipSlot,
        user: Option<UserId>,
    ) -> Result<Club, Error> {
        actor.require_admin()?;
        let mut club = load_club(self.clubs.as_ref(), club_id).await?;
        club.assign_leader(slot, user)?;
        save_club(self.clubs.as_ref(), &mut club).await?;
        Ok(club)
    }
}

#[async_trait]
impl<C> ClubQuery for ClubService<C>
where
    C: ClubRepository,
{
    async fn list(&self, actor: &Actor) -> Result<Vec<Club>, Error> {
        let clubs = self.clubs.list().await.map_err(map_club_error)?;
        Ok(clubs
            .into_iter()
            .filter(|club| club.is_visible_to(actor))
            .collect())
    }

    async fn get(&self, actor: &Actor, club_id: &ClubId) -> Result<Club, Error> {
        let club = load_club(self.clubs.as_ref(), club_id).await?;
        if club.is_visible_to(actor) {
            Ok(club)
        } else {
            Err(club_not_found())
        }
    }
}

#[cfg(test)]
#[path = "club_service_tests.rs"]
mod tests;
