//! Port for atomic vote recording.
//!
//! A vote touches two documents: the election counters and the voter's
//! `voted_elections` set. Adapters must check and write both in one atomic
//! step so that no interleaving can count a user twice.

use async_trait::async_trait;

use crate::domain::{CandidateId, Election, ElectionId, ElectionRuleError, UserId};

use super::define_port_error;

/// One user's vote for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub election_id: ElectionId,
    pub user_id: UserId,
    pub candidate_id: CandidateId,
}

define_port_error! {
    /// Errors raised while casting a ballot.
    pub enum BallotBoxError {
        /// Election does not exist.
        ElectionNotFound => "election not found",
        /// Candidate is not standing in the election.
        CandidateNotFound => "candidate not found",
        /// Voter account does not exist.
        UserNotFound => "user not found",
        /// Voter has already voted in this election.
        AlreadyVoted => "user has already voted in this election",
        /// Election is completed or has announced results.
        ElectionClosed => "election is closed for voting",
        /// Store connection could not be established.
        Connection { message: String } => "ballot box connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ballot box query failed: {message}",
    }
}

impl From<ElectionRuleError> for BallotBoxError {
    fn from(error: ElectionRuleError) -> Self {
        match error {
            ElectionRuleError::Closed => Self::ElectionClosed,
            ElectionRuleError::CandidateNotFound => Self::CandidateNotFound,
            ElectionRuleError::AlreadyVoted => Self::AlreadyVoted,
            other => Self::query(other.to_string()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BallotBox: Send + Sync {
    /// Record a ballot and return the updated election.
    ///
    /// Checks run in this order: election exists, candidate exists, voter
    /// exists, voter has not voted, election is open. Nothing is written
    /// unless every check passes; on success the candidate counter, the
    /// election total and the voter's `voted_elections` all change together.
    async fn cast(&self, ballot: &Ballot) -> Result<Election, BallotBoxError>;
}
