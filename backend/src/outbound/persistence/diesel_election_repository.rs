//! PostgreSQL-backed `ElectionRepository` implementation using Diesel ORM.
//!
//! Elections are JSONB documents with a revision column, written with the
//! same compare-and-swap discipline as clubs. Vote counters are only ever
//! changed by the ballot box, which bumps the revision as well.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ElectionRepository, ElectionRepositoryError};
use crate::domain::{Election, ElectionId};

use super::diesel_helpers::{
    DieselFailure, classify_diesel_error, classify_pool_error, decode_document, encode_document,
    revision_from_db, revision_to_db,
};
use super::models::{ElectionDocumentRow, ElectionRow};
use super::pool::{DbPool, PoolError};
use super::schema::elections;

/// Diesel-backed implementation of the `ElectionRepository` port.
#[derive(Clone)]
pub struct DieselElectionRepository {
    pool: DbPool,
}

impl DieselElectionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DieselFailure) -> ElectionRepositoryError {
    match failure {
        DieselFailure::Connection(message) => ElectionRepositoryError::connection(message),
        DieselFailure::UniqueViolation(constraint) => ElectionRepositoryError::query(format!(
            "unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
        DieselFailure::Query(message) => ElectionRepositoryError::query(message),
    }
}

fn map_pool_error(error: PoolError) -> ElectionRepositoryError {
    map_failure(classify_pool_error(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ElectionRepositoryError {
    map_failure(classify_diesel_error(error))
}

pub(super) fn row_to_election(row: ElectionRow) -> Result<Election, String> {
    let mut election: Election = decode_document(row.document)?;
    if election.id.as_uuid() != &row.id {
        return Err(format!(
            "election document {} stored under key {}",
            election.id, row.id
        ));
    }
    election.revision = revision_from_db(row.revision);
    Ok(election)
}

pub(super) fn election_to_row(election: &Election) -> Result<ElectionDocumentRow, String> {
    Ok(ElectionDocumentRow {
        id: *election.id.as_uuid(),
        document: encode_document(election)?,
        revision: revision_to_db(election.revision),
        start_date: election.start_date,
        created_at: election.created_at,
    })
}

async fn current_revision<C>(conn: &mut C, id: Uuid) -> Result<u32, ElectionRepositoryError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let revision = elections::table
        .filter(elections::id.eq(id))
        .select(elections::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
    Ok(revision.map_or(0, revision_from_db))
}

#[async_trait]
impl ElectionRepository for DieselElectionRepository {
    async fn find_by_id(
        &self,
        id: &ElectionId,
    ) -> Result<Option<Election>, ElectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ElectionRow> = elections::table
            .filter(elections::id.eq(id.as_uuid()))
            .select(ElectionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_election)
            .transpose()
            .map_err(ElectionRepositoryError::query)
    }

    async fn list(&self) -> Result<Vec<Election>, ElectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ElectionRow> = elections::table
            .order((elections::start_date.desc(), elections::created_at.asc()))
            .select(ElectionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(row_to_election)
            .collect::<Result<_, _>>()
            .map_err(ElectionRepositoryError::query)
    }

    async fn save(
        &self,
        election: &Election,
        expected_revision: Option<u32>,
    ) -> Result<(), ElectionRepositoryError> {
        let row = election_to_row(election).map_err(ElectionRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        match expected_revision {
            None => {
                let inserted = diesel::insert_into(elections::table)
                    .values(&row)
                    .execute(&mut conn)
                    .await;
                match inserted.map_err(classify_diesel_error) {
                    Ok(_) => Ok(()),
                    Err(DieselFailure::UniqueViolation(_)) => {
                        let actual = current_revision(&mut conn, row.id).await?;
                        Err(ElectionRepositoryError::revision_mismatch(0_u32, actual))
                    }
                    Err(failure) => Err(map_failure(failure)),
                }
            }
            Some(expected) => {
                let updated = diesel::update(elections::table)
                    .filter(
                        elections::id
                            .eq(row.id)
                            .and(elections::revision.eq(revision_to_db(expected))),
                    )
                    .set(&row)
                    .execute(&mut conn)
                    .await
                    .map_err(map_diesel_error)?;
                if updated == 0 {
                    let actual = current_revision(&mut conn, row.id).await?;
                    return Err(ElectionRepositoryError::revision_mismatch(expected, actual));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row mapping and error translation.
    use super::*;
    use crate::domain::{ElectionDraft, NewCandidate};
    use crate::test_support::fixed_now;
    use chrono::TimeDelta;
    use rstest::rstest;

    fn election() -> Election {
        let draft = ElectionDraft {
            title: "Student council".to_owned(),
            description: String::new(),
            start_date: fixed_now(),
            end_date: fixed_now() + TimeDelta::days(3),
            candidates: ["Alice", "Bob"]
                .into_iter()
                .map(|name| NewCandidate {
                    name: name.to_owned(),
                    ..NewCandidate::default()
                })
                .collect(),
            eligible_voters: 40,
        };
        Election::create(draft, fixed_now()).expect("election")
    }

    #[rstest]
    fn rows_round_trip_documents() {
        let mut original = election();
        original
            .record_vote(original.candidates[1].id)
            .expect("vote");
        let row = election_to_row(&original).expect("encode");
        assert_eq!(row.start_date, original.start_date);

        let decoded = row_to_election(ElectionRow {
            id: row.id,
            document: row.document,
            revision: 9,
        })
        .expect("decode");
        assert_eq!(decoded.revision, 9);
        assert_eq!(decoded.total_votes, 1);
        assert_eq!(decoded.candidates, original.candidates);
    }

    #[rstest]
    fn corrupt_documents_are_query_errors() {
        let err = row_to_election(ElectionRow {
            id: Uuid::new_v4(),
            document: serde_json::json!({"title": 3}),
            revision: 0,
        })
        .expect_err("corrupt");
        assert!(err.contains("corrupted document"));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, ElectionRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }
}
