//! PostgreSQL-backed `ClubRepository` implementation using Diesel ORM.
//!
//! Clubs are stored whole as JSONB documents. The `revision` column makes
//! every update a compare-and-swap, and `member_ids` mirrors the embedded
//! membership list so member lookups can use a GIN index.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ClubRepository, ClubRepositoryError};
use crate::domain::{Club, ClubId, UserId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, classify_pool_error, decode_document, encode_document,
    revision_from_db, revision_to_db,
};
use super::models::{ClubDocumentRow, ClubRow};
use super::pool::DbPool;
use super::schema::clubs;

const PRIMARY_KEY: &str = "clubs_pkey";

/// Diesel-backed implementation of the `ClubRepository` port.
#[derive(Clone)]
pub struct DieselClubRepository {
    pool: DbPool,
}

impl DieselClubRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DieselFailure, club: Option<&Club>) -> ClubRepositoryError {
    match failure {
        DieselFailure::Connection(message) => ClubRepositoryError::connection(message),
        DieselFailure::UniqueViolation(_) => match club {
            Some(club) => ClubRepositoryError::duplicate_name(club.name.to_string()),
            None => ClubRepositoryError::query("unexpected unique violation"),
        },
        DieselFailure::Query(message) => ClubRepositoryError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ClubRepositoryError {
    map_failure(classify_diesel_error(error), None)
}

fn row_to_club(row: ClubRow) -> Result<Club, ClubRepositoryError> {
    let mut club: Club = decode_document(row.document).map_err(ClubRepositoryError::query)?;
    if club.id.as_uuid() != &row.id {
        return Err(ClubRepositoryError::query(format!(
            "club document {} stored under key {}",
            club.id, row.id
        )));
    }
    club.revision = revision_from_db(row.revision);
    Ok(club)
}

fn club_to_row(club: &Club) -> Result<ClubDocumentRow, ClubRepositoryError> {
    let member_ids: BTreeSet<Uuid> = club
        .members
        .iter()
        .map(|member| *member.user_id.as_uuid())
        .collect();
    Ok(ClubDocumentRow {
        id: *club.id.as_uuid(),
        name_key: club.name.key(),
        member_ids: member_ids.into_iter().collect(),
        document: encode_document(club).map_err(ClubRepositoryError::query)?,
        revision: revision_to_db(club.revision),
        created_at: club.created_at,
    })
}

async fn current_revision<C>(conn: &mut C, id: Uuid) -> Result<Option<u32>, ClubRepositoryError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    clubs::table
        .filter(clubs::id.eq(id))
        .select(clubs::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map(|revision| revision.map(revision_from_db))
        .map_err(map_diesel_error)
}

#[async_trait]
impl ClubRepository for DieselClubRepository {
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, ClubRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err), None))?;
        let row: Option<ClubRow> = clubs::table
            .filter(clubs::id.eq(id.as_uuid()))
            .select(ClubRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_club).transpose()
    }

    async fn list(&self) -> Result<Vec<Club>, ClubRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err), None))?;
        let rows: Vec<ClubRow> = clubs::table
            .order((clubs::created_at.asc(), clubs::id.asc()))
            .select(ClubRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_club).collect()
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Club>, ClubRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err), None))?;
        let rows: Vec<ClubRow> = clubs::table
            .filter(clubs::member_ids.contains(vec![*user.as_uuid()]))
            .order((clubs::created_at.asc(), clubs::id.asc()))
            .select(ClubRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_club).collect()
    }

    async fn save(
        &self,
        club: &Club,
        expected_revision: Option<u32>,
    ) -> Result<(), ClubRepositoryError> {
        let row = club_to_row(club)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err), Some(club)))?;

        match expected_revision {
            None => {
                let inserted = diesel::insert_into(clubs::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await;
                match inserted.map_err(classify_diesel_error) {
                    Ok(_) => Ok(()),
                    Err(DieselFailure::UniqueViolation(Some(constraint)))
                        if constraint == PRIMARY_KEY =>
                    {
                        let actual = current_revision(&mut conn, row.id).await?.unwrap_or(0);
                        Err(ClubRepositoryError::revision_mismatch(0_u32, actual))
                    }
                    Err(failure) => Err(map_failure(failure, Some(club))),
                }
            }
            Some(expected) => {
                let updated = diesel::update(clubs::table)
                    .filter(
                        clubs::id
                            .eq(row.id)
                            .and(clubs::revision.eq(revision_to_db(expected))),
                    )
                    .set(&row)
                    .execute(&mut conn)
                    .await
                    .map_err(|err| map_failure(classify_diesel_error(err), Some(club)))?;
                if updated == 0 {
                    let actual = current_revision(&mut conn, row.id).await?.unwrap_or(0);
                    return Err(ClubRepositoryError::revision_mismatch(expected, actual));
                }
                Ok(())
            }
        }
    }
}
