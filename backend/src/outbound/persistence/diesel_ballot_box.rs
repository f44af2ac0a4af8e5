//! PostgreSQL-backed `BallotBox` implementation.
//!
//! One transaction locks the election row and the voter row (`FOR UPDATE`),
//! checks both, then writes the incremented election document and appends
//! the election to the voter's `voted_elections`. Concurrent ballots from the
//! same voter serialize on the voter row; the second sees the first's vote.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Uuid as SqlUuid;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::Election;
use crate::domain::ports::{Ballot, BallotBox, BallotBoxError};

use super::diesel_election_repository::{election_to_row, row_to_election};
use super::diesel_helpers::{DieselFailure, classify_diesel_error, classify_pool_error};
use super::models::ElectionRow;
use super::pool::DbPool;
use super::schema::{elections, users};

const RECORD_VOTER_SQL: &str = "UPDATE users \
    SET voted_elections = array_append(voted_elections, $2) \
    WHERE id = $1";

/// Diesel-backed implementation of the `BallotBox` port.
#[derive(Clone)]
pub struct DieselBallotBox {
    pool: DbPool,
}

impl DieselBallotBox {
    /// Create a ballot box over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Transaction outcome: a rule refusal rolls back just like a database error.
#[derive(Debug)]
enum CastFailure {
    Refused(BallotBoxError),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for CastFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<BallotBoxError> for CastFailure {
    fn from(error: BallotBoxError) -> Self {
        Self::Refused(error)
    }
}

fn map_failure(failure: DieselFailure) -> BallotBoxError {
    match failure {
        DieselFailure::Connection(message) => BallotBoxError::connection(message),
        DieselFailure::UniqueViolation(_) => BallotBoxError::query("unexpected unique violation"),
        DieselFailure::Query(message) => BallotBoxError::query(message),
    }
}

fn map_cast_failure(failure: CastFailure) -> BallotBoxError {
    match failure {
        CastFailure::Refused(error) => error,
        CastFailure::Database(error) => map_failure(classify_diesel_error(error)),
    }
}

/// Apply the vote to a decoded election document.
fn apply_vote(
    mut election: Election,
    voted_elections: &[Uuid],
    ballot: &Ballot,
) -> Result<Election, BallotBoxError> {
    if election.candidate(ballot.candidate_id).is_none() {
        return Err(BallotBoxError::CandidateNotFound);
    }
    if voted_elections.contains(ballot.election_id.as_uuid()) {
        return Err(BallotBoxError::AlreadyVoted);
    }
    election.record_vote(ballot.candidate_id)?;
    election.advance_revision();
    Ok(election)
}

#[async_trait]
impl BallotBox for DieselBallotBox {
    async fn cast(&self, ballot: &Ballot) -> Result<Election, BallotBoxError> {
        let ballot = *ballot;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let election = conn
            .transaction::<_, CastFailure, _>(|conn| {
                async move {
                    let row: ElectionRow = elections::table
                        .filter(elections::id.eq(ballot.election_id.as_uuid()))
                        .select(ElectionRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or(BallotBoxError::ElectionNotFound)?;
                    let election = row_to_election(row).map_err(BallotBoxError::query)?;
                    if election.candidate(ballot.candidate_id).is_none() {
                        return Err(BallotBoxError::CandidateNotFound.into());
                    }

                    let voted: Vec<Uuid> = users::table
                        .filter(users::id.eq(ballot.user_id.as_uuid()))
                        .select(users::voted_elections)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or(BallotBoxError::UserNotFound)?;

                    let election = apply_vote(election, &voted, &ballot)?;
                    let document = election_to_row(&election).map_err(BallotBoxError::query)?;

                    diesel::update(elections::table.filter(elections::id.eq(document.id)))
                        .set(&document)
                        .execute(conn)
                        .await?;
                    sql_query(RECORD_VOTER_SQL)
                        .bind::<SqlUuid, _>(*ballot.user_id.as_uuid())
                        .bind::<SqlUuid, _>(*ballot.election_id.as_uuid())
                        .execute(conn)
                        .await?;
                    Ok(election)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_cast_failure)?;

        debug!(
            election_id = %ballot.election_id,
            total_votes = election.total_votes,
            "ballot committed"
        );
        Ok(election)
    }
}
