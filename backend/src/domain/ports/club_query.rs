//! Driving port for club reads.

use async_trait::async_trait;

use crate::domain::{Actor, Club, ClubId, Error};

/// Club catalogue reads, filtered by what the actor may see.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubQuery: Send + Sync {
    /// Admins see every club; other users only active clubs.
    async fn list(&self, actor: &Actor) -> Result<Vec<Club>, Error>;

    /// Fetch one club. Clubs hidden from the actor are `NotFound`.
    async fn get(&self, actor: &Actor, club_id: &ClubId) -> Result<Club, Error>;
}
