//! Driving port for election reads.

use async_trait::async_trait;

use crate::domain::{Actor, Election, ElectionId, ElectionResults, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElectionQuery: Send + Sync {
    /// All elections.
    async fn list(&self) -> Result<Vec<Election>, Error>;

    /// Fetch one election.
    async fn get(&self, election_id: &ElectionId) -> Result<Election, Error>;

    /// Ranked results. Non-admins may only read announced results.
    async fn results(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
    ) -> Result<ElectionResults, Error>;
}
