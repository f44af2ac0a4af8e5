//! Tests for the membership service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{ClubRepositoryError, MockClubRepository, MockUserRepository};
use crate::domain::{ClubCategory, ClubName, ClubStatus, ErrorCode, LeadershipSlot, Role, UserId};
use crate::outbound::memory::MemoryStore;
use crate::test_support::{MutableClock, account, fixed_now, profile};

struct Harness {
    store: Arc<MemoryStore>,
    service: MembershipService<MemoryStore, MemoryStore>,
    admin: Actor,
    student: Actor,
    club_id: ClubId,
}

impl Harness {
    async fn club(&self) -> Club {
        ClubRepository::find_by_id(self.store.as_ref(), &self.club_id)
            .await
            .expect("lookup")
            .expect("club")
    }

    async fn joined_clubs(&self, actor: &Actor) -> Vec<ClubId> {
        UserRepository::find_by_id(self.store.as_ref(), &actor.user_id)
            .await
            .expect("lookup")
            .expect("user")
            .joined_clubs
            .into_iter()
            .collect()
    }

    async fn join(&self, actor: &Actor) -> MembershipId {
        self.service
            .request_join(actor, &self.club_id, profile("Ada Lovelace"))
            .await
            .expect("join")
            .membership_id
    }
}

async fn seed_club(store: &MemoryStore, status: ClubStatus) -> ClubId {
    let mut club = Club::new(
        ClubName::new("Chess Club").expect("valid name"),
        "",
        ClubCategory::Social,
        fixed_now(),
    )
    .expect("club");
    club.status = status;
    store.save(&club, None).await.expect("seed club");
    club.id
}

#[fixture]
async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let admin = account("root.admin", Role::Admin);
    let student = account("ada", Role::Student);
    store.insert(&admin).await.expect("seed admin");
    store.insert(&student).await.expect("seed student");
    let club_id = seed_club(&store, ClubStatus::Active).await;
    let service = MembershipService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(MutableClock::new(fixed_now())),
    );
    Harness {
        store,
        service,
        admin: admin.actor(),
        student: student.actor(),
        club_id,
    }
}

#[rstest]
#[tokio::test]
async fn join_creates_pending_request_without_touching_user(#[future] harness: Harness) {
    let harness = harness.await;
    let receipt = harness
        .service
        .request_join(&harness.student, &harness.club_id, profile("Ada Lovelace"))
        .await
        .expect("join");
    assert_eq!(receipt.status, MembershipStatus::Pending);

    let pending = harness
        .service
        .pending_requests(&harness.admin, &harness.club_id)
        .await
        .expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].profile.full_name, "Ada Lovelace");
    assert!(harness.joined_clubs(&harness.student).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn missing_club_is_not_found(#[future] harness: Harness) {
    let harness = harness.await;
    let err = harness
        .service
        .request_join(&harness.student, &ClubId::random(), profile("Ada"))
        .await
        .expect_err("missing club");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn inactive_club_refuses_join(#[future] harness: Harness) {
    let harness = harness.await;
    let other = seed_inactive(&harness).await;
    let err = harness
        .service
        .request_join(&harness.student, &other, profile("Ada"))
        .await
        .expect_err("inactive");
    assert_eq!(err.code(), ErrorCode::InvalidState);
    assert_eq!(err.message(), "Cannot join inactive club");
}

async fn seed_inactive(harness: &Harness) -> ClubId {
    let mut club = Club::new(
        ClubName::new("Sleepy Club").expect("valid name"),
        "",
        ClubCategory::Other,
        fixed_now(),
    )
    .expect("club");
    club.status = ClubStatus::Inactive;
    harness.store.save(&club, None).await.expect("seed");
    club.id
}

#[rstest]
#[tokio::test]
async fn duplicate_join_conflicts(#[future] harness: Harness) {
    let harness = harness.await;
    harness.join(&harness.student).await;
    let err = harness
        .service
        .request_join(&harness.student, &harness.club_id, profile("Ada"))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.message(),
        "You already have a pending request for this club"
    );
}

#[rstest]
#[tokio::test]
async fn approve_twice_leaves_one_back_reference(#[future] harness: Harness) {
    let harness = harness.await;
    let membership = harness.join(&harness.student).await;
    for _ in 0..2 {
        let approved = harness
            .service
            .approve(&harness.admin, &harness.club_id, &membership)
            .await
            .expect("approve");
        assert_eq!(approved.status, MembershipStatus::Approved);
    }
    assert_eq!(
        harness.joined_clubs(&harness.student).await,
        vec![harness.club_id]
    );
    // Only the first approval changed the document.
    assert_eq!(harness.club().await.revision, 3);
}

#[rstest]
#[tokio::test]
async fn students_cannot_moderate(#[future] harness: Harness) {
    let harness = harness.await;
    let membership = harness.join(&harness.student).await;
    let err = harness
        .service
        .approve(&harness.student, &harness.club_id, &membership)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    let err = harness
        .service
        .pending_requests(&harness.student, &harness.club_id)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn reject_pending_leaves_user_untouched(#[future] harness: Harness) {
    let harness = harness.await;
    let membership = harness.join(&harness.student).await;
    let rejected = harness
        .service
        .reject(&harness.admin, &harness.club_id, &membership)
        .await
        .expect("reject");
    assert_eq!(rejected.status, MembershipStatus::Rejected);
    assert!(harness.joined_clubs(&harness.student).await.is_empty());

    // Rejected applicants may try again.
    harness.join(&harness.student).await;
    let statuses: Vec<_> = harness
        .club()
        .await
        .members
        .iter()
        .map(|m| m.status)
        .collect();
    assert_eq!(
        statuses,
        vec![MembershipStatus::Rejected, MembershipStatus::Pending]
    );
}

#[rstest]
#[tokio::test]
async fn approving_a_stale_rejection_conflicts_with_the_newer_request(
    #[future] harness: Harness,
) {
    let harness = harness.await;
    let first = harness.join(&harness.student).await;
    harness
        .service
        .reject(&harness.admin, &harness.club_id, &first)
        .await
        .expect("reject");
    let second = harness.join(&harness.student).await;

    let err = harness
        .service
        .approve(&harness.admin, &harness.club_id, &first)
        .await
        .expect_err("stale approval");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert!(harness.joined_clubs(&harness.student).await.is_empty());

    harness
        .service
        .approve(&harness.admin, &harness.club_id, &second)
        .await
        .expect("approve newer request");
    harness
        .service
        .leave(&harness.student, &harness.club_id)
        .await
        .expect("leave");
    let club = harness.club().await;
    assert!(club.active_membership(harness.student.user_id).is_none());
    assert!(harness.joined_clubs(&harness.student).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn rejecting_approved_member_removes_back_reference(#[future] harness: Harness) {
    let harness = harness.await;
    let membership = harness.join(&harness.student).await;
    harness
        .service
        .approve(&harness.admin, &harness.club_id, &membership)
        .await
        .expect("approve");
    harness
        .service
        .reject(&harness.admin, &harness.club_id, &membership)
        .await
        .expect("reject");
    assert!(harness.joined_clubs(&harness.student).await.is_empty());
}

#[rstest]
#[tokio::test]
async fn unknown_membership_is_not_found(#[future] harness: Harness) {
    let harness = harness.await;
    let err = harness
        .service
        .approve(&harness.admin, &harness.club_id, &MembershipId::random())
        .await
        .expect_err("missing membership");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn leave_removes_membership_leadership_and_back_reference(#[future] harness: Harness) {
    let harness = harness.await;
    let membership = harness.join(&harness.student).await;
    harness
        .service
        .approve(&harness.admin, &harness.club_id, &membership)
        .await
        .expect("approve");
    let mut club = harness.club().await;
    club.assign_leader(LeadershipSlot::Treasurer, Some(harness.student.user_id))
        .expect("assign");
    let expected = club.advance_revision();
    harness
        .store
        .save(&club, Some(expected))
        .await
        .expect("save leadership");

    harness
        .service
        .leave(&harness.student, &harness.club_id)
        .await
        .expect("leave");
    let club = harness.club().await;
    assert!(club.members.is_empty());
    assert_eq!(club.leadership.treasurer, None);
    assert!(harness.joined_clubs(&harness.student).await.is_empty());

    let err = harness
        .service
        .leave(&harness.student, &harness.club_id)
        .await
        .expect_err("second leave");
    assert_eq!(err.code(), ErrorCode::InvalidState);
    assert_eq!(err.message(), "You are not a member of this club");
}

#[rstest]
#[tokio::test]
async fn my_memberships_lists_every_club(#[future] harness: Harness) {
    let harness = harness.await;
    harness.join(&harness.student).await;
    let summaries = harness
        .service
        .my_memberships(&harness.student)
        .await
        .expect("memberships");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].club_name, "Chess Club");
    assert_eq!(summaries[0].status, MembershipStatus::Pending);

    let none = harness
        .service
        .my_memberships(&harness.admin)
        .await
        .expect("memberships");
    assert!(none.is_empty());
}

#[tokio::test]
async fn store_outage_fails_fast_without_user_writes() {
    let mut clubs = MockClubRepository::new();
    clubs
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Err(ClubRepositoryError::connection("refused")));
    let mut users = MockUserRepository::new();
    users.expect_add_joined_club().never();

    let service = MembershipService::new(
        Arc::new(clubs),
        Arc::new(users),
        Arc::new(MutableClock::new(fixed_now())),
    );
    let admin = Actor::new(UserId::random(), Role::Admin);
    let err = service
        .approve(&admin, &ClubId::random(), &MembershipId::random())
        .await
        .expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
