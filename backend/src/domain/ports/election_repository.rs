//! Port abstraction for election document persistence.

use async_trait::async_trait;

use crate::domain::{Election, ElectionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by election repository adapters.
    pub enum ElectionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "election repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "election repository query failed: {message}",
        /// Stored revision did not match the expected revision.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "election revision mismatch: expected {expected}, found {actual}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ElectionRepository: Send + Sync {
    /// Fetch an election by identifier.
    async fn find_by_id(&self, id: &ElectionId)
    -> Result<Option<Election>, ElectionRepositoryError>;

    /// All elections, newest start date first.
    async fn list(&self) -> Result<Vec<Election>, ElectionRepositoryError>;

    /// Persist an election document with the same revision semantics as
    /// [`ClubRepository::save`](super::ClubRepository::save).
    ///
    /// Vote counters are never written through this method by the services;
    /// votes go through [`BallotBox`](super::BallotBox).
    async fn save(
        &self,
        election: &Election,
        expected_revision: Option<u32>,
    ) -> Result<(), ElectionRepositoryError>;
}
