//! In-memory document store implementing every driven persistence port.
//!
//! One mutex guards all arenas and their indices, so each port call observes
//! and updates a consistent snapshot. The ballot box performs its checks and
//! all three writes while holding the lock once. Used for tests and for
//! running the server without a database.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    Ballot, BallotBox, BallotBoxError, ClubRepository, ClubRepositoryError, ElectionRepository,
    ElectionRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{Club, ClubId, Election, ElectionId, Role, UserAccount, UserId};

#[derive(Default)]
struct State {
    clubs: HashMap<ClubId, Club>,
    club_order: Vec<ClubId>,
    club_names: HashMap<String, ClubId>,
    /// user → clubs holding any membership record for that user.
    member_index: HashMap<UserId, BTreeSet<ClubId>>,
    elections: HashMap<ElectionId, Election>,
    election_order: Vec<ElectionId>,
    users: HashMap<UserId, UserAccount>,
    usernames: HashMap<String, UserId>,
}

impl State {
    fn reindex_members(&mut self, previous: Option<&Club>, club: &Club) {
        if let Some(old) = previous {
            for member in &old.members {
                if let Some(clubs) = self.member_index.get_mut(&member.user_id) {
                    clubs.remove(&old.id);
                }
            }
        }
        for member in &club.members {
            self.member_index
                .entry(member.user_id)
                .or_default()
                .insert(club.id);
        }
    }
}

/// Process-local store. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

/// Lock failure; only possible after a panic while the lock was held.
struct Poisoned;

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, Poisoned> {
        self.state.lock().map_err(|_| Poisoned)
    }
}

const POISONED: &str = "memory store lock poisoned";

impl From<Poisoned> for ClubRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query(POISONED)
    }
}

impl From<Poisoned> for ElectionRepositoryError {
    fn from(_: Poisoned) -> Self {
        Self::query(POISONED)
    }
}

impl From<Poisoned> for UserPersistenceError {
    fn from(_: Poisoned) -> Self {
        Self::query(POISONED)
    }
}

impl From<Poisoned> for BallotBoxError {
    fn from(_: Poisoned) -> Self {
        Self::query(POISONED)
    }
}

#[async_trait]
impl ClubRepository for MemoryStore {
    async fn find_by_id(&self, id: &ClubId) -> Result<Option<Club>, ClubRepositoryError> {
        Ok(self.lock()?.clubs.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Club>, ClubRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .club_order
            .iter()
            .filter_map(|id| state.clubs.get(id).cloned())
            .collect())
    }

    async fn list_for_member(&self, user: &UserId) -> Result<Vec<Club>, ClubRepositoryError> {
        let state = self.lock()?;
        let Some(ids) = state.member_index.get(user) else {
            return Ok(Vec::new());
        };
        Ok(state
            .club_order
            .iter()
            .filter(|id| ids.contains(id))
            .filter_map(|id| state.clubs.get(id).cloned())
            .collect())
    }

    async fn save(
        &self,
        club: &Club,
        expected_revision: Option<u32>,
    ) -> Result<(), ClubRepositoryError> {
        let mut state = self.lock()?;
        let previous = state.clubs.get(&club.id).cloned();
        match (expected_revision, previous.as_ref()) {
            (None, Some(existing)) => {
                return Err(ClubRepositoryError::revision_mismatch(0_u32, existing.revision));
            }
            (None, None) => {
                let key = club.name.key();
                if state.club_names.contains_key(&key) {
                    return Err(ClubRepositoryError::duplicate_name(club.name.to_string()));
                }
                state.club_names.insert(key, club.id);
                state.club_order.push(club.id);
            }
            (Some(expected), Some(existing)) if existing.revision != expected => {
                return Err(ClubRepositoryError::revision_mismatch(
                    expected,
                    existing.revision,
                ));
            }
            (Some(expected), None) => {
                return Err(ClubRepositoryError::revision_mismatch(expected, 0_u32));
            }
            (Some(_), Some(_)) => {}
        }
        state.reindex_members(previous.as_ref(), club);
        state.clubs.insert(club.id, club.clone());
        Ok(())
    }
}

#[async_trait]
impl ElectionRepository for MemoryStore {
    async fn find_by_id(
        &self,
        id: &ElectionId,
    ) -> Result<Option<Election>, ElectionRepositoryError> {
        Ok(self.lock()?.elections.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Election>, ElectionRepositoryError> {
        let state = self.lock()?;
        let mut elections: Vec<Election> = state
            .election_order
            .iter()
            .filter_map(|id| state.elections.get(id).cloned())
            .collect();
        elections.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(elections)
    }

    async fn save(
        &self,
        election: &Election,
        expected_revision: Option<u32>,
    ) -> Result<(), ElectionRepositoryError> {
        let mut state = self.lock()?;
        let actual = state.elections.get(&election.id).map(|stored| stored.revision);
        match (expected_revision, actual) {
            (None, None) => state.election_order.push(election.id),
            (Some(expected), Some(actual)) if expected == actual => {}
            (expected, actual) => {
                return Err(ElectionRepositoryError::revision_mismatch(
                    expected.unwrap_or(0),
                    actual.unwrap_or(0),
                ));
            }
        }
        state.elections.insert(election.id, election.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;
        let key = account.username.key();
        if state.usernames.contains_key(&key) || state.users.contains_key(&account.id) {
            return Err(UserPersistenceError::duplicate_username(
                account.username.to_string(),
            ));
        }
        state.usernames.insert(key, account.id);
        state.users.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username_key: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .usernames
            .get(username_key)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    async fn update_login_state(
        &self,
        id: &UserId,
        failed_login_attempts: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), UserPersistenceError> {
        if let Some(account) = self.lock()?.users.get_mut(id) {
            account.failed_login_attempts = failed_login_attempts;
            account.locked_until = locked_until;
        }
        Ok(())
    }

    async fn set_role(&self, id: &UserId, role: Role) -> Result<(), UserPersistenceError> {
        if let Some(account) = self.lock()?.users.get_mut(id) {
            account.role = role;
        }
        Ok(())
    }

    async fn add_joined_club(
        &self,
        id: &UserId,
        club: &ClubId,
    ) -> Result<(), UserPersistenceError> {
        if let Some(account) = self.lock()?.users.get_mut(id) {
            account.joined_clubs.insert(*club);
        }
        Ok(())
    }

    async fn remove_joined_club(
        &self,
        id: &UserId,
        club: &ClubId,
    ) -> Result<(), UserPersistenceError> {
        if let Some(account) = self.lock()?.users.get_mut(id) {
            account.joined_clubs.remove(club);
        }
        Ok(())
    }
}

#[async_trait]
impl BallotBox for MemoryStore {
    async fn cast(&self, ballot: &Ballot) -> Result<Election, BallotBoxError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let election = state
            .elections
            .get_mut(&ballot.election_id)
            .ok_or(BallotBoxError::ElectionNotFound)?;
        if election.candidate(ballot.candidate_id).is_none() {
            return Err(BallotBoxError::CandidateNotFound);
        }
        let voter = state
            .users
            .get_mut(&ballot.user_id)
            .ok_or(BallotBoxError::UserNotFound)?;
        if voter.has_voted_in(&ballot.election_id) {
            return Err(BallotBoxError::AlreadyVoted);
        }
        election
            .record_vote(ballot.candidate_id)
            .map_err(BallotBoxError::from)?;
        // Ballots bump the revision like any other election write.
        election.advance_revision();
        voter.voted_elections.insert(ballot.election_id);
        Ok(election.clone())
    }
}
