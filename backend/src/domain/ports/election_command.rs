//! Driving port for election administration and voting.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Actor, CandidateId, Election, ElectionDraft, ElectionId, ElectionResults, ElectionStatus,
    Error,
};

/// Acknowledgement returned after a ballot is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub election_id: ElectionId,
    pub candidate_id: CandidateId,
    pub message: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElectionCommand: Send + Sync {
    /// Create a pending election. Admin only.
    async fn create(&self, actor: &Actor, draft: ElectionDraft) -> Result<Election, Error>;

    /// Move an election between `pending`, `active` and `completed`. Admin only.
    async fn update_status(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
        status: ElectionStatus,
    ) -> Result<Election, Error>;

    /// Cast the caller's single vote.
    ///
    /// # Errors
    ///
    /// - `NotFound` for a missing election or candidate.
    /// - `Conflict` when the caller has already voted.
    /// - `InvalidState` once the election is closed.
    async fn cast_vote(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
        candidate_id: &CandidateId,
    ) -> Result<VoteReceipt, Error>;

    /// Announce results and return the tally. Admin only; idempotent.
    async fn announce(
        &self,
        actor: &Actor,
        election_id: &ElectionId,
    ) -> Result<ElectionResults, Error>;
}
