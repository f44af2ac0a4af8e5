//! Election service: administration, voting and tallying.
//!
//! Votes never go through a read-modify-write of the election document; the
//! [`BallotBox`] port applies the one-vote rule and both counter increments
//! atomically.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    Ballot, BallotBox, BallotBoxError, ElectionCommand, ElectionQuery, ElectionRepository,
    VoteReceipt,
};
use crate::domain::service_support::map_election_error;
use crate::domain::{
    Actor, CandidateId, Election, ElectionDraft, ElectionId, ElectionResults, ElectionRuleError,
    ElectionStatus, Error,
};

/// Election service implementing the election driving ports.
#[derive(Clone)]
pub struct ElectionService<E, B> {
    elections: Arc<E>,
    ballots: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<E, B> ElectionService<E, B> {
    /// Create a service; ballots go through `ballots`, never `elections`.
    pub fn new(elections: Arc<E>, ballots: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            elections,
            ballots,
            clock,
        }
    }
}

fn election_not_found() -> Error {
    Error::not_found("election not found")
}

fn map_ballot_error(error: BallotBoxError) -> Error {
    match error {
        BallotBoxError::ElectionNotFound => election_not_found(),
        BallotBoxError::CandidateNotFound => ElectionRuleError::CandidateNotFound.into(),
        BallotBoxError::AlreadyVoted => ElectionRuleError::AlreadyVoted.into(),
        BallotBoxError::ElectionClosed => ElectionRuleError::Closed.into(),
        BallotBoxError::UserNotFound => Error::unauthorized("session user no longer exists"),
        BallotBoxError::Connection { message } => {
            Error::service_unavailable(format!("ballot box unavailable: {message}"))
        }
        BallotBoxError::Query { message } => Error::internal(format!("ballot box error: {message}")),
    }
}

impl<E, B> ElectionService<E, B>
where
    E: ElectionRepository,
{
    async fn load(&self, election_id: &ElectionId) -> Result<Election, Error> {
        self.elections
            .find_by_id(election_id)
            .await
            .map_err(map_election_error)?
            .ok_or_else(election_not_found)
    }

    async fn save(&self, election: &mut Election) -> Result<(), Error> {
        let expected = election.advance_revision();
        self.elections
            .save(election, Some(expected))
            .await
            .map_err(map_election_error)
    }
}

#[async_trait]
impl<E, B> ElectionCommand for ElectionService<E, B>
where
    E: ElectionRepository,
    B: BallotBox,
{
    async fn create(&self, actor: &Actor, draft: ElectionDraft) -> Result<Election, Error> {
        actor.require_admin()?;
        let election = Election::create(draft, self.clock.utc())?;
        self.elections
            .save(&election, None)
            .await
            .map_err(map_election_error)?;
        info!(
            election_id = %election.id,
            candidates = election.candidates.len(),
            "created election"
        );
        Ok(election)
    }

    async fn update_status(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
        status: ElectionStatus,
    ) -> Result<Election, Error> {
        actor.require_admin()?;
        let mut election = self.load(election_id).await?;
        if election.status == status {
            return Ok(election);
        }
        election.set_status(status)?;
        self.save(&mut election).await?;
        info!(election_id = %election.id, %status, "changed election status");
        Ok(election)
    }

    async fn cast_vote(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
        candidate_id: &CandidateId,
    ) -> Result<VoteReceipt, Error> {
        let ballot = Ballot {
            election_id: *election_id,
            user_id: actor.user_id,
            candidate_id: *candidate_id,
        };
        self.ballots.cast(&ballot).await.map_err(map_ballot_error)?;
        info!(election_id = %election_id, user_id = %actor.user_id, "vote recorded");
        Ok(VoteReceipt {
            election_id: *election_id,
            candidate_id: *candidate_id,
            message: "Vote cast successfully".to_owned(),
        })
    }

    async fn announce(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
    ) -> Result<ElectionResults, Error> {
        actor.require_admin()?;
        let mut election = self.load(election_id).await?;
        if election.announce(self.clock.utc()) {
            self.save(&mut election).await?;
            info!(
                election_id = %election.id,
                total_votes = election.total_votes,
                "announced election results"
            );
        }
        Ok(election.results())
    }
}

#[async_trait]
impl<E, B> ElectionQuery for ElectionService<E, B>
where
    E: ElectionRepository,
    B: BallotBox,
{
    async fn list(&self) -> Result<Vec<Election>, Error> {
        self.elections.list().await.map_err(map_election_error)
    }

    async fn get(&self, election_id: &ElectionId) -> Result<Election, Error> {
        self.load(election_id).await
    }

    async fn results(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
    ) -> Result<ElectionResults, Error> {
        let election = self.load(election_id).await?;
        let announced = matches!(election.status, ElectionStatus::ResultsAnnounced);
        if !announced && !actor.is_admin() {
            return Err(Error::forbidden("results have not been announced"));
        }
        Ok(election.results())
    }
}

#[cfg(test)]
#[path = "election_service_tests.rs"]
mod tests;
