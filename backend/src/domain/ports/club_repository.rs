//! Port abstraction for club document persistence.
//!
//! Clubs are stored as whole documents (members and leadership embedded) and
//! written with a compare-and-swap on `revision`.

use async_trait::async_trait;

use crate::domain::{Club, ClubId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by club repository adapters.
    pub enum ClubRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "club repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "club repository query failed: {message}",
        /// Another club already uses this name, ignoring case.
        DuplicateName { name: String } => "club name already exists: {name}",
        /// Stored revision did not match the expected revision.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "club revision mismatch: expected {expected}, found {actual}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubRepository: Send + Sync {
    /// Fetch a club by identifier.
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, ClubRepositoryError>;

    /// All clubs ordered by creation time.
    async fn list(&self) -> Result<Vec<Club>, ClubRepositoryError>;

    /// Clubs holding any membership record (pending, approved or rejected)
    /// for `user`.
    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Club>, ClubRepositoryError>;

    /// Persist a club document.
    ///
    /// `expected_revision` is `None` for a first insert, which fails with
    /// `DuplicateName` when the name key is taken. `Some(n)` replaces the
    /// stored document only while its revision is still `n`.
    async fn save(
        &self,
        club: &Club,
        expected_revision: Option<u32>,
    ) -> Result<(), ClubRepositoryError>;
}
