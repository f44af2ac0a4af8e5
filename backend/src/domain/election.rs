//! Election aggregate, candidate counters and result tallying.
//!
//! Vote counting itself is performed atomically by the
//! [`BallotBox`](super::ports::BallotBox) port; the aggregate only supplies
//! the rules the port applies and the pure tally over stored counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::wire_enum::wire_enum;
use super::{CandidateId, ElectionId, Error};

/// Maximum election title length.
pub const ELECTION_TITLE_MAX: usize = 200;
/// Minimum number of candidates in an election.
pub const MIN_CANDIDATES: usize = 2;

wire_enum!(
    /// Election lifecycle status.
    ElectionStatus, "election status" {
        Pending => "pending",
        Active => "active",
        Completed => "completed",
        ResultsAnnounced => "results_announced",
    }
);

impl ElectionStatus {
    /// Closed elections no longer accept votes.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::ResultsAnnounced)
    }
}

/// Validation failures for new elections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElectionValidationError {
    #[error("title must not be empty")]
    BlankTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("an election needs at least {min} candidates")]
    TooFewCandidates { min: usize },
    #[error("candidate {index} must have a name")]
    BlankCandidateName { index: usize },
    #[error("end date must not be before start date")]
    EndBeforeStart,
}

impl ElectionValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTitle | Self::TitleTooLong { .. } => "title",
            Self::TooFewCandidates { .. } | Self::BlankCandidateName { .. } => "candidates",
            Self::EndBeforeStart => "endDate",
        }
    }
}

impl From<ElectionValidationError> for Error {
    fn from(value: ElectionValidationError) -> Self {
        Error::invalid_request(value.to_string()).with_details(json!({
            "field": value.field(),
            "code": "invalid_election",
        }))
    }
}

/// Rule violations raised by votes and lifecycle changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElectionRuleError {
    #[error("election is closed for voting")]
    Closed,
    #[error("candidate not found")]
    CandidateNotFound,
    #[error("You have already voted in this election")]
    AlreadyVoted,
    #[error("cannot move election from {from} to {to}")]
    InvalidTransition {
        from: ElectionStatus,
        to: ElectionStatus,
    },
    #[error("vote counter overflow")]
    CounterOverflow,
}

impl From<ElectionRuleError> for Error {
    fn from(value: ElectionRuleError) -> Self {
        let message = value.to_string();
        match value {
            ElectionRuleError::Closed => {
                Error::invalid_state(message).with_details(json!({ "code": "election_closed" }))
            }
            ElectionRuleError::CandidateNotFound => Error::not_found(message),
            ElectionRuleError::AlreadyVoted => {
                Error::conflict(message).with_details(json!({ "code": "already_voted" }))
            }
            ElectionRuleError::InvalidTransition { from, to } => Error::invalid_state(message)
                .with_details(json!({
                    "code": "invalid_transition",
                    "from": from.as_str(),
                    "to": to.as_str(),
                })),
            ElectionRuleError::CounterOverflow => Error::internal(message),
        }
    }
}

/// Candidate input for a new election.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCandidate {
    pub name: String,
    pub department: String,
    pub academic_year: String,
    pub profile_image: Option<String>,
    pub platform: Vec<String>,
}

/// Unvalidated input for [`Election::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionDraft {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub candidates: Vec<NewCandidate>,
    pub eligible_voters: u32,
}

/// Contestant with an accumulating vote counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub department: String,
    pub academic_year: String,
    pub profile_image: Option<String>,
    pub votes: u64,
    pub platform: Vec<String>,
}

impl Candidate {
    fn from_new(candidate: NewCandidate) -> Self {
        let mut platform: Vec<String> = Vec::with_capacity(candidate.platform.len());
        for item in candidate.platform {
            let item = item.trim();
            if !item.is_empty() && !platform.iter().any(|seen| seen == item) {
                platform.push(item.to_owned());
            }
        }
        Self {
            id: CandidateId::random(),
            name: candidate.name.trim().to_owned(),
            department: candidate.department.trim().to_owned(),
            academic_year: candidate.academic_year.trim().to_owned(),
            profile_image: candidate
                .profile_image
                .map(|image| image.trim().to_owned())
                .filter(|image| !image.is_empty()),
            votes: 0,
            platform,
        }
    }
}

/// Election aggregate.
///
/// ## Invariants
/// - `total_votes` equals the sum of candidate `votes`.
/// - `start_date <= end_date`.
/// - Counters only change through [`Election::record_vote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ElectionStatus,
    pub candidates: Vec<Candidate>,
    pub total_votes: u64,
    pub eligible_voters: u32,
    pub announced_at: Option<DateTime<Utc>>,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
}

impl Election {
    /// Validate a draft and build a pending election with zeroed counters.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::{Election, ElectionDraft, ElectionValidationError, NewCandidate};
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let draft = ElectionDraft {
    ///     title: "Student council".into(),
    ///     description: String::new(),
    ///     start_date: now,
    ///     end_date: now,
    ///     candidates: vec![NewCandidate { name: "Ada".into(), ..Default::default() }],
    ///     eligible_voters: 0,
    /// };
    /// assert_eq!(
    ///     Election::create(draft, now),
    ///     Err(ElectionValidationError::TooFewCandidates { min: 2 })
    /// );
    /// ```
    pub fn create(draft: ElectionDraft, now: DateTime<Utc>) -> Result<Self, ElectionValidationError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(ElectionValidationError::BlankTitle);
        }
        if title.chars().count() > ELECTION_TITLE_MAX {
            return Err(ElectionValidationError::TitleTooLong {
                max: ELECTION_TITLE_MAX,
            });
        }
        if draft.candidates.len() < MIN_CANDIDATES {
            return Err(ElectionValidationError::TooFewCandidates {
                min: MIN_CANDIDATES,
            });
        }
        if let Some(index) = draft
            .candidates
            .iter()
            .position(|candidate| candidate.name.trim().is_empty())
        {
            return Err(ElectionValidationError::BlankCandidateName { index });
        }
        if draft.end_date < draft.start_date {
            return Err(ElectionValidationError::EndBeforeStart);
        }

        Ok(Self {
            id: ElectionId::random(),
            title: title.to_owned(),
            description: draft.description.trim().to_owned(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: ElectionStatus::Pending,
            candidates: draft
                .candidates
                .into_iter()
                .map(Candidate::from_new)
                .collect(),
            total_votes: 0,
            eligible_voters: draft.eligible_voters,
            announced_at: None,
            revision: 1,
            created_at: now,
        })
    }

    /// Look up a candidate by id.
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| candidate.id == id)
    }

    /// Check that a vote for `candidate` would be accepted.
    pub fn check_vote(&self, candidate: CandidateId) -> Result<(), ElectionRuleError> {
        if self.candidate(candidate).is_none() {
            return Err(ElectionRuleError::CandidateNotFound);
        }
        if self.status.is_closed() {
            return Err(ElectionRuleError::Closed);
        }
        Ok(())
    }

    /// Add one vote for `candidate`, keeping `total_votes` in step.
    ///
    /// Both counters are checked before either changes.
    pub fn record_vote(&mut self, candidate: CandidateId) -> Result<(), ElectionRuleError> {
        self.check_vote(candidate)?;
        let total = self
            .total_votes
            .checked_add(1)
            .ok_or(ElectionRuleError::CounterOverflow)?;
        let entry = self
            .candidates
            .iter_mut()
            .find(|entry| entry.id == candidate)
            .ok_or(ElectionRuleError::CandidateNotFound)?;
        entry.votes = entry
            .votes
            .checked_add(1)
            .ok_or(ElectionRuleError::CounterOverflow)?;
        self.total_votes = total;
        Ok(())
    }

    /// Whether the stored total matches the candidate counters.
    pub fn tally_is_consistent(&self) -> bool {
        let sum = self
            .candidates
            .iter()
            .try_fold(0_u64, |acc, candidate| acc.checked_add(candidate.votes));
        sum == Some(self.total_votes)
    }

    /// Move between `pending`, `active` and `completed`.
    ///
    /// Setting the current status again is a no-op. Announcing goes through
    /// [`Election::announce`].
    pub fn set_status(&mut self, to: ElectionStatus) -> Result<(), ElectionRuleError> {
        let from = self.status;
        if from == to {
            return Ok(());
        }
        let allowed = matches!(
            (from, to),
            (ElectionStatus::Pending, ElectionStatus::Active)
                | (ElectionStatus::Active, ElectionStatus::Completed)
        );
        if !allowed {
            return Err(ElectionRuleError::InvalidTransition { from, to });
        }
        self.status = to;
        Ok(())
    }

    /// Mark results as announced. Returns `false` when already announced.
    ///
    /// `announced_at` is stamped the first time only; counters never change.
    pub fn announce(&mut self, now: DateTime<Utc>) -> bool {
        if matches!(self.status, ElectionStatus::ResultsAnnounced) {
            return false;
        }
        self.status = ElectionStatus::ResultsAnnounced;
        if self.announced_at.is_none() {
            self.announced_at = Some(now);
        }
        true
    }

    /// Bump the revision for a pending save and return the revision the
    /// stored document must still have.
    pub fn advance_revision(&mut self) -> u32 {
        let expected = self.revision;
        self.revision = expected.saturating_add(1);
        expected
    }

    /// Rank candidates by votes.
    ///
    /// Candidates are ordered by votes descending with ties kept in
    /// insertion order. Ranks are dense, so tied candidates share a rank and
    /// the next distinct count takes the following rank.
    pub fn results(&self) -> ElectionResults {
        let mut ordered: Vec<&Candidate> = self.candidates.iter().collect();
        ordered.sort_by(|a, b| b.votes.cmp(&a.votes));

        let mut ranked = Vec::with_capacity(ordered.len());
        let mut rank = 0_u32;
        let mut previous: Option<u64> = None;
        for candidate in ordered {
            if previous != Some(candidate.votes) {
                rank += 1;
                previous = Some(candidate.votes);
            }
            ranked.push(RankedCandidate {
                rank,
                candidate_id: candidate.id,
                name: candidate.name.clone(),
                department: candidate.department.clone(),
                votes: candidate.votes,
                share_percent: share_percent(candidate.votes, self.total_votes),
            });
        }

        let winners = match ranked.first() {
            Some(top) if top.votes > 0 => ranked
                .iter()
                .take_while(|entry| entry.votes == top.votes)
                .map(|entry| entry.candidate_id)
                .collect(),
            _ => Vec::new(),
        };

        ElectionResults {
            election_id: self.id,
            title: self.title.clone(),
            status: self.status,
            total_votes: self.total_votes,
            eligible_voters: self.eligible_voters,
            announced_at: self.announced_at,
            candidates: ranked,
            winners,
        }
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "vote counts stay far below 2^52 so f64 is exact"
)]
fn share_percent(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = votes as f64 * 100.0 / total as f64;
    (raw * 100.0).round() / 100.0
}

/// One entry in a ranked result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub rank: u32,
    pub candidate_id: CandidateId,
    pub name: String,
    pub department: String,
    pub votes: u64,
    pub share_percent: f64,
}

/// Tally derived from stored candidate counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionResults {
    pub election_id: ElectionId,
    pub title: String,
    pub status: ElectionStatus,
    pub total_votes: u64,
    pub eligible_voters: u32,
    pub announced_at: Option<DateTime<Utc>>,
    pub candidates: Vec<RankedCandidate>,
    /// Candidates sharing the top count; empty while no votes are cast.
    pub winners: Vec<CandidateId>,
}

#[cfg(test)]
mod tests;
