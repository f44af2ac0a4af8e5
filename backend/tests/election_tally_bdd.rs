//! Behaviour tests for ballot casting and result announcement.
//!
//! These scenarios confirm that a student is counted at most once per
//! election, even when ballots race, and that announcing results is
//! idempotent.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

#[allow(dead_code)]
#[path = "harness/campus.rs"]
mod campus_harness;

use std::cell::RefCell;
use std::collections::HashMap;

use campus::domain::ports::{ElectionCommand, ElectionQuery, VoteReceipt};
use campus::domain::{
    Actor, CandidateId, Election, ElectionDraft, ElectionResults, ElectionStatus, Error,
    NewCandidate,
};
use campus_harness::{Campus, code_of};
use chrono::{TimeDelta, Utc};
use futures::future::join_all;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

struct ElectionWorld {
    campus: Campus,
    admin: RefCell<Option<Actor>>,
    election: RefCell<Option<Election>>,
    students: RefCell<HashMap<String, Actor>>,
    votes: RefCell<Vec<Result<VoteReceipt, Error>>>,
    announcements: RefCell<Vec<ElectionResults>>,
}

impl ElectionWorld {
    fn new() -> Self {
        Self {
            campus: Campus::new(),
            admin: RefCell::new(None),
            election: RefCell::new(None),
            students: RefCell::new(HashMap::new()),
            votes: RefCell::new(Vec::new()),
            announcements: RefCell::new(Vec::new()),
        }
    }

    fn admin(&self) -> Actor {
        self.admin.borrow().expect("election step ran")
    }

    fn election(&self) -> Election {
        self.election.borrow().clone().expect("election step ran")
    }

    fn student(&self, name: &str) -> Actor {
        self.students
            .borrow()
            .get(name)
            .copied()
            .unwrap_or_else(|| panic!("student {name} was not registered"))
    }

    fn candidate(&self, name: &str) -> CandidateId {
        self.election()
            .candidates
            .iter()
            .find(|candidate| candidate.name == name)
            .map(|candidate| candidate.id)
            .unwrap_or_else(|| panic!("no candidate named {name}"))
    }

    fn vote(&self, voter: &str, candidate: &str) -> Result<VoteReceipt, Error> {
        let actor = self.student(voter);
        let election_id = self.election().id;
        let candidate_id = self.candidate(candidate);
        self.campus.block_on(
            self.campus
                .elections
                .cast_vote(&actor, &election_id, &candidate_id),
        )
    }

    fn refresh(&self) -> Election {
        let election_id = self.election().id;
        let election = self
            .campus
            .block_on(self.campus.elections.get(&election_id))
            .expect("election");
        *self.election.borrow_mut() = Some(election.clone());
        election
    }
}

fn draft(first: &str, second: &str) -> ElectionDraft {
    let now = Utc::now();
    ElectionDraft {
        title: "Student council".to_owned(),
        description: "Annual council election".to_owned(),
        start_date: now,
        end_date: now + TimeDelta::days(7),
        candidates: [first, second]
            .into_iter()
            .map(|name| NewCandidate {
                name: name.to_owned(),
                department: "Computing".to_owned(),
                academic_year: "3".to_owned(),
                ..NewCandidate::default()
            })
            .collect(),
        eligible_voters: 3,
    }
}

#[fixture]
fn world() -> ElectionWorld {
    ElectionWorld::new()
}

#[given("an election with candidates \"{first}\" and \"{second}\"")]
fn an_election_with_candidates(world: &ElectionWorld, first: String, second: String) {
    let admin = world.campus.admin();
    let election = world
        .campus
        .block_on(world.campus.elections.create(&admin, draft(&first, &second)))
        .expect("election created");
    *world.admin.borrow_mut() = Some(admin);
    *world.election.borrow_mut() = Some(election);
}

#[given("a student named \"{name}\"")]
fn a_student_named(world: &ElectionWorld, name: String) {
    let actor = world.campus.student(&name);
    world.students.borrow_mut().insert(name, actor);
}

#[given("the election is {status}")]
fn the_election_is(world: &ElectionWorld, status: String) {
    let status: ElectionStatus = status.parse().expect("known election status");
    let election_id = world.election().id;
    let election = world
        .campus
        .block_on(
            world
                .campus
                .elections
                .update_status(&world.admin(), &election_id, status),
        )
        .expect("status change");
    *world.election.borrow_mut() = Some(election);
}

#[given("{name} has voted for \"{candidate}\"")]
fn has_voted_for(world: &ElectionWorld, name: String, candidate: String) {
    world.vote(&name, &candidate).expect("vote accepted");
}

#[when("{name} votes for \"{candidate}\"")]
fn votes_for(world: &ElectionWorld, name: String, candidate: String) {
    let outcome = world.vote(&name, &candidate);
    world.votes.borrow_mut().push(outcome);
}

#[when("{name} submits {count} ballots for \"{candidate}\" at once")]
fn submits_ballots_at_once(world: &ElectionWorld, name: String, count: usize, candidate: String) {
    let actor = world.student(&name);
    let election_id = world.election().id;
    let candidate_id = world.candidate(&candidate);
    let elections = &world.campus.elections;
    let ballots =
        (0..count).map(|_| elections.cast_vote(&actor, &election_id, &candidate_id));
    let outcomes = world.campus.block_on(join_all(ballots));
    world.votes.borrow_mut().extend(outcomes);
}

#[when("the administrator announces the results twice")]
fn the_administrator_announces_twice(world: &ElectionWorld) {
    let admin = world.admin();
    let election_id = world.election().id;
    for _ in 0..2 {
        let results = world
            .campus
            .block_on(world.campus.elections.announce(&admin, &election_id))
            .expect("announcement");
        world.announcements.borrow_mut().push(results);
    }
}

#[then("the last vote fails with code \"{code}\"")]
fn the_last_vote_fails_with_code(world: &ElectionWorld, code: String) {
    let votes = world.votes.borrow();
    match votes.last() {
        Some(Err(err)) => assert_eq!(code_of(err), code),
        Some(Ok(receipt)) => panic!("expected failure with {code}, got {receipt:?}"),
        None => panic!("no vote was cast"),
    }
}

#[then("exactly {count} ballot is accepted")]
fn exactly_n_ballots_accepted(world: &ElectionWorld, count: usize) {
    let votes = world.votes.borrow();
    let accepted = votes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(accepted, count);
    for rejected in votes.iter().filter_map(|outcome| outcome.as_ref().err()) {
        assert_eq!(code_of(rejected), "conflict");
    }
}

#[then("the election has {count} total vote")]
fn the_election_has_total_votes(world: &ElectionWorld, count: u64) {
    let election = world.refresh();
    assert_eq!(election.total_votes, count);
    assert!(election.tally_is_consistent());
}

#[then("both announcements match")]
fn both_announcements_match(world: &ElectionWorld) {
    let announcements = world.announcements.borrow();
    let [first, second] = announcements.as_slice() else {
        panic!("expected two announcements, got {}", announcements.len());
    };
    assert_eq!(first, second);
    assert_eq!(first.status, ElectionStatus::ResultsAnnounced);
    assert!(first.announced_at.is_some());
}

#[then("\"{name}\" wins with {share} percent of the vote")]
fn wins_with_share(world: &ElectionWorld, name: String, share: f64) {
    let announcements = world.announcements.borrow();
    let results = announcements.last().expect("announcement");
    let winner = world.candidate(&name);
    assert_eq!(results.winners, vec![winner]);
    let top = results.candidates.first().expect("ranked candidates");
    assert_eq!(top.candidate_id, winner);
    assert_eq!(top.rank, 1);
    assert!((top.share_percent - share).abs() < f64::EPSILON);
}

#[scenario(
    path = "tests/features/election_tally.feature",
    name = "Each student votes once"
)]
fn each_student_votes_once(world: ElectionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/election_tally.feature",
    name = "Concurrent ballots from one student are counted once"
)]
fn concurrent_ballots_from_one_student_are_counted_once(world: ElectionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/election_tally.feature",
    name = "Completed elections refuse votes"
)]
fn completed_elections_refuse_votes(world: ElectionWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/election_tally.feature",
    name = "Announcing twice yields identical results"
)]
fn announcing_twice_yields_identical_results(world: ElectionWorld) {
    drop(world);
}
