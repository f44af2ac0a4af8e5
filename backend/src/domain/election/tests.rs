//! Election rules and tally tests.

use super::*;
use crate::domain::ErrorCode;
use chrono::{Duration, TimeZone};
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0)
        .single()
        .expect("valid time")
}

fn candidate(name: &str) -> NewCandidate {
    NewCandidate {
        name: name.to_owned(),
        department: "Physics".to_owned(),
        academic_year: "3".to_owned(),
        profile_image: None,
        platform: Vec::new(),
    }
}

#[fixture]
fn draft(now: DateTime<Utc>) -> ElectionDraft {
    ElectionDraft {
        title: "Student council".to_owned(),
        description: "Annual vote".to_owned(),
        start_date: now,
        end_date: now + Duration::days(7),
        candidates: vec![candidate("Alice"), candidate("Bob"), candidate("Carol")],
        eligible_voters: 120,
    }
}

#[fixture]
fn election(draft: ElectionDraft, now: DateTime<Utc>) -> Election {
    Election::create(draft, now).expect("valid election")
}

fn cast(election: &mut Election, index: usize, times: usize) {
    let id = election.candidates[index].id;
    for _ in 0..times {
        election.record_vote(id).expect("vote accepted");
    }
}

#[rstest]
fn create_zeroes_counters(election: Election) {
    assert_eq!(election.status, ElectionStatus::Pending);
    assert_eq!(election.total_votes, 0);
    assert!(election.candidates.iter().all(|c| c.votes == 0));
    assert_eq!(election.eligible_voters, 120);
    assert!(election.announced_at.is_none());
}

#[rstest]
fn single_candidate_is_rejected(mut draft: ElectionDraft, now: DateTime<Utc>) {
    draft.candidates.truncate(1);
    let err = Election::create(draft, now).expect_err("too few candidates");
    assert_eq!(err, ElectionValidationError::TooFewCandidates { min: 2 });
    let error: Error = err.into();
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn blank_title_is_rejected(mut draft: ElectionDraft, now: DateTime<Utc>) {
    draft.title = "   ".to_owned();
    assert_eq!(
        Election::create(draft, now),
        Err(ElectionValidationError::BlankTitle)
    );
}

#[rstest]
fn blank_candidate_name_reports_index(mut draft: ElectionDraft, now: DateTime<Utc>) {
    draft.candidates[1].name = " ".to_owned();
    assert_eq!(
        Election::create(draft, now),
        Err(ElectionValidationError::BlankCandidateName { index: 1 })
    );
}

#[rstest]
fn end_before_start_is_rejected(mut draft: ElectionDraft, now: DateTime<Utc>) {
    draft.end_date = now - Duration::hours(1);
    let err = Election::create(draft, now).expect_err("inverted dates");
    assert_eq!(err.field(), "endDate");
}

#[rstest]
fn platform_duplicates_are_removed_in_first_seen_order(
    mut draft: ElectionDraft,
    now: DateTime<Utc>,
) {
    draft.candidates[0].platform = vec![
        "Longer library hours".to_owned(),
        "Cheaper coffee".to_owned(),
        "Longer library hours".to_owned(),
        "  ".to_owned(),
    ];
    let election = Election::create(draft, now).expect("valid election");
    assert_eq!(
        election.candidates[0].platform,
        vec!["Longer library hours", "Cheaper coffee"]
    );
}

#[rstest]
fn votes_keep_total_in_step(mut election: Election) {
    cast(&mut election, 0, 2);
    cast(&mut election, 2, 1);
    assert_eq!(election.total_votes, 3);
    assert!(election.tally_is_consistent());
}

#[rstest]
#[case(ElectionStatus::Completed)]
#[case(ElectionStatus::ResultsAnnounced)]
fn closed_elections_refuse_votes(mut election: Election, #[case] status: ElectionStatus) {
    election.status = status;
    let id = election.candidates[0].id;
    assert_eq!(election.record_vote(id), Err(ElectionRuleError::Closed));
    assert_eq!(election.total_votes, 0);
    let error: Error = ElectionRuleError::Closed.into();
    assert_eq!(error.code(), ErrorCode::InvalidState);
}

#[rstest]
fn closed_elections_report_unknown_candidates_first(mut election: Election) {
    election.status = ElectionStatus::Completed;
    assert_eq!(
        election.check_vote(CandidateId::random()),
        Err(ElectionRuleError::CandidateNotFound)
    );
}

#[rstest]
fn pending_elections_accept_votes(mut election: Election) {
    cast(&mut election, 1, 1);
    assert_eq!(election.candidates[1].votes, 1);
}

#[rstest]
fn unknown_candidate_is_not_found(mut election: Election) {
    let err = election
        .record_vote(CandidateId::random())
        .expect_err("missing candidate");
    assert_eq!(err, ElectionRuleError::CandidateNotFound);
    let error: Error = err.into();
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
fn already_voted_maps_to_conflict() {
    let error: Error = ElectionRuleError::AlreadyVoted.into();
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "You have already voted in this election");
}

#[rstest]
fn results_rank_ties_in_insertion_order(mut election: Election) {
    cast(&mut election, 0, 3);
    cast(&mut election, 1, 5);
    cast(&mut election, 2, 5);

    let results = election.results();
    let names: Vec<_> = results.candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bob", "Carol", "Alice"]);
    let ranks: Vec<_> = results.candidates.iter().map(|c| c.rank).collect();
    assert_eq!(ranks, vec![1, 1, 2]);
    assert_eq!(
        results.winners,
        vec![election.candidates[1].id, election.candidates[2].id]
    );
    assert_eq!(results.total_votes, 13);
    assert!((results.candidates[2].share_percent - 23.08).abs() < f64::EPSILON);
}

#[rstest]
fn results_without_votes_have_no_winner(election: Election) {
    let results = election.results();
    assert!(results.winners.is_empty());
    assert!(results.candidates.iter().all(|c| c.rank == 1));
    assert!(results.candidates.iter().all(|c| c.share_percent == 0.0));
}

#[rstest]
fn announce_is_idempotent_and_keeps_counters(mut election: Election, now: DateTime<Utc>) {
    cast(&mut election, 0, 2);
    assert!(election.announce(now));
    let first = election.results();

    assert!(!election.announce(now + Duration::hours(1)));
    assert_eq!(election.announced_at, Some(now));
    assert_eq!(election.results(), first);
    assert_eq!(election.total_votes, 2);
}

#[rstest]
#[case(ElectionStatus::Pending, ElectionStatus::Active, true)]
#[case(ElectionStatus::Active, ElectionStatus::Completed, true)]
#[case(ElectionStatus::Active, ElectionStatus::Active, true)]
#[case(ElectionStatus::Pending, ElectionStatus::Completed, false)]
#[case(ElectionStatus::Completed, ElectionStatus::Active, false)]
#[case(ElectionStatus::Active, ElectionStatus::ResultsAnnounced, false)]
#[case(ElectionStatus::ResultsAnnounced, ElectionStatus::Completed, false)]
fn status_transitions(
    mut election: Election,
    #[case] from: ElectionStatus,
    #[case] to: ElectionStatus,
    #[case] allowed: bool,
) {
    election.status = from;
    let outcome = election.set_status(to);
    assert_eq!(outcome.is_ok(), allowed);
    let expected = if allowed { to } else { from };
    assert_eq!(election.status, expected);
}

#[rstest]
fn election_document_uses_camel_case(election: Election) {
    let value = serde_json::to_value(&election).expect("serialise election");
    assert_eq!(value["totalVotes"], 0);
    assert_eq!(value["status"], "pending");
    assert_eq!(value["candidates"][0]["academicYear"], "3");
    let decoded: Election = serde_json::from_value(value).expect("deserialise election");
    assert_eq!(decoded, election);
}
