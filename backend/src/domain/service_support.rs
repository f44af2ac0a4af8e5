//! Error mapping and loading helpers shared by the domain services.

use serde_json::json;

use crate::domain::ports::{
    ClubRepository, ClubRepositoryError, ElectionRepositoryError, PasswordHasherError,
    UserPersistenceError,
};
use crate::domain::{Club, ClubId, Error};

pub(crate) fn revision_conflict(expected: u32, actual: u32) -> Error {
    Error::conflict("revision mismatch").with_details(json!({
        "expectedRevision": expected,
        "actualRevision": actual,
        "code": "revision_mismatch",
    }))
}

pub(crate) fn map_club_error(error: ClubRepositoryError) -> Error {
    match error {
        ClubRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("club repository unavailable: {message}"))
        }
        ClubRepositoryError::Query { message } => {
            Error::internal(format!("club repository error: {message}"))
        }
        ClubRepositoryError::DuplicateName { .. } => {
            Error::conflict("A club with this name already exists")
                .with_details(json!({ "field": "name", "code": "duplicate_name" }))
        }
        ClubRepositoryError::RevisionMismatch { expected, actual } => {
            revision_conflict(expected, actual)
        }
    }
}

pub(crate) fn map_election_error(error: ElectionRepositoryError) -> Error {
    match error {
        ElectionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("election repository unavailable: {message}"))
        }
        ElectionRepositoryError::Query { message } => {
            Error::internal(format!("election repository error: {message}"))
        }
        ElectionRepositoryError::RevisionMismatch { expected, actual } => {
            revision_conflict(expected, actual)
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateUsername { .. } => Error::conflict("Username already taken")
            .with_details(json!({ "field": "username", "code": "duplicate_username" })),
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn club_not_found() -> Error {
    Error::not_found("club not found")
}

pub(crate) async fn load_club<R>(repo: &R, club_id: &ClubId) -> Result<Club, Error>
where
    R: ClubRepository + ?Sized,
{
    repo.find_by_id(club_id)
        .await
        .map_err(map_club_error)?
        .ok_or_else(club_not_found)
}

/// Persist a changed club with a compare-and-swap on its revision.
pub(crate) async fn save_club<R>(repo: &R, club: &mut Club) -> Result<(), Error>
where
    R: ClubRepository + ?Sized,
{
    let expected = club.advance_revision();
    repo.save(club, Some(expected))
        .await
        .map_err(map_club_error)
}
