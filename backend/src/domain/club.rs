//! Club aggregate and its embedded membership list.
//!
//! All membership transitions are pure functions over an in-memory [`Club`];
//! services load the document, apply one transition and save it back with a
//! revision check. Every rule is checked before the document is touched, so a
//! failed transition leaves the club unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::wire_enum::wire_enum;
use super::{Actor, ClubId, Error, MembershipId, UnknownVariant, UserId};

/// Minimum club name length.
pub const CLUB_NAME_MIN: usize = 3;
/// Maximum club name length.
pub const CLUB_NAME_MAX: usize = 64;
/// Maximum club description length.
pub const CLUB_DESCRIPTION_MAX: usize = 2000;

/// Validation failures for club and membership input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClubValidationError {
    #[error("club name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("description must be at most {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("{field} must not be empty")]
    BlankField { field: &'static str },
    #[error(transparent)]
    Unknown(#[from] UnknownVariant),
}

/// Rule violations raised by membership and leadership transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MembershipRuleError {
    #[error("Cannot join inactive club")]
    ClubInactive,
    #[error("You already have a pending request for this club")]
    PendingRequestExists,
    #[error("You are already a member of this club")]
    AlreadyMember,
    #[error("membership not found")]
    MembershipNotFound,
    #[error("You are not a member of this club")]
    NotAMember,
    #[error("leaders must be approved members of the club")]
    LeaderNotMember,
    #[error("User already has another active membership in this club")]
    OtherMembershipActive,
}

impl From<MembershipRuleError> for Error {
    fn from(value: MembershipRuleError) -> Self {
        let message = value.to_string();
        match value {
            MembershipRuleError::ClubInactive => Error::invalid_state(message)
                .with_details(json!({ "code": "club_inactive" })),
            MembershipRuleError::PendingRequestExists => Error::conflict(message)
                .with_details(json!({ "code": "pending_request_exists" })),
            MembershipRuleError::AlreadyMember => {
                Error::conflict(message).with_details(json!({ "code": "already_member" }))
            }
            MembershipRuleError::MembershipNotFound => Error::not_found(message),
            MembershipRuleError::NotAMember => {
                Error::invalid_state(message).with_details(json!({ "code": "not_a_member" }))
            }
            MembershipRuleError::LeaderNotMember => Error::invalid_state(message)
                .with_details(json!({ "code": "leader_not_member" })),
            MembershipRuleError::OtherMembershipActive => Error::conflict(message)
                .with_details(json!({ "code": "other_membership_active" })),
        }
    }
}

wire_enum!(
    /// Club lifecycle status; gates visibility and join eligibility.
    ClubStatus, "club status" {
        PendingApproval => "pending_approval",
        Active => "active",
        Inactive => "inactive",
    }
);

wire_enum!(
    /// Club category.
    ClubCategory, "club category" {
        Academic => "academic",
        Sports => "sports",
        Cultural => "cultural",
        Technical => "technical",
        Social => "social",
        Other => "other",
    }
);

wire_enum!(
    /// Join request status.
    MembershipStatus, "membership status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
);

wire_enum!(
    /// Role held inside a club.
    MemberRole, "member role" {
        Member => "member",
        Officer => "officer",
    }
);

wire_enum!(
    /// Named leadership positions.
    LeadershipSlot, "leadership slot" {
        President => "president",
        VicePresident => "vice_president",
        Secretary => "secretary",
        Treasurer => "treasurer",
    }
);

impl MembershipStatus {
    /// Pending and approved memberships count as active; rejected ones are history.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Club display name, unique ignoring case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClubName(String);

impl ClubName {
    /// Validate and construct a club name; surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ClubValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(CLUB_NAME_MIN..=CLUB_NAME_MAX).contains(&length) {
            return Err(ClubValidationError::NameLength {
                min: CLUB_NAME_MIN,
                max: CLUB_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Case-folded uniqueness key.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::ClubName;
    ///
    /// let name = ClubName::new("Chess Club").expect("valid name");
    /// assert_eq!(name.key(), "chess club");
    /// ```
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl AsRef<str> for ClubName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ClubName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ClubName> for String {
    fn from(value: ClubName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ClubName {
    type Error = ClubValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Applicant details captured when a join request is made.
///
/// This is a snapshot: later profile edits do not change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    pub full_name: String,
    pub department: String,
    pub year: String,
    pub background: String,
}

impl MemberProfile {
    /// Validate the applicant snapshot. Only `background` may be blank.
    pub fn try_new(
        full_name: &str,
        department: &str,
        year: &str,
        background: &str,
    ) -> Result<Self, ClubValidationError> {
        Ok(Self {
            full_name: required(full_name, "fullName")?,
            department: required(department, "department")?,
            year: required(year, "year")?,
            background: background.trim().to_owned(),
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ClubValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClubValidationError::BlankField { field });
    }
    Ok(trimmed.to_owned())
}

/// One user's membership record inside a club.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub profile: MemberProfile,
    pub role: MemberRole,
    pub status: MembershipStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// The four leadership positions, each optionally held by a member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leadership {
    pub president: Option<UserId>,
    pub vice_president: Option<UserId>,
    pub secretary: Option<UserId>,
    pub treasurer: Option<UserId>,
}

impl Leadership {
    fn slot_mut(&mut self, slot: LeadershipSlot) -> &mut Option<UserId> {
        match slot {
            LeadershipSlot::President => &mut self.president,
            LeadershipSlot::VicePresident => &mut self.vice_president,
            LeadershipSlot::Secretary => &mut self.secretary,
            LeadershipSlot::Treasurer => &mut self.treasurer,
        }
    }

    /// Holder of `slot`, if any.
    pub fn holder(&self, slot: LeadershipSlot) -> Option<UserId> {
        match slot {
            LeadershipSlot::President => self.president,
            LeadershipSlot::VicePresident => self.vice_president,
            LeadershipSlot::Secretary => self.secretary,
            LeadershipSlot::Treasurer => self.treasurer,
        }
    }

    /// Whether `user` holds any slot.
    pub fn holds_any(&self, user: UserId) -> bool {
        [
            self.president,
            self.vice_president,
            self.secretary,
            self.treasurer,
        ]
        .contains(&Some(user))
    }

    fn vacate(&mut self, user: UserId) {
        for slot in [
            &mut self.president,
            &mut self.vice_president,
            &mut self.secretary,
            &mut self.treasurer,
        ] {
            if *slot == Some(user) {
                *slot = None;
            }
        }
    }
}

/// Result of rejecting a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub user_id: UserId,
    /// The membership was approved before the rejection.
    pub was_approved: bool,
}

/// Club aggregate.
///
/// ## Invariants
/// - At most one active (pending or approved) membership per user.
/// - Leadership slots only reference users holding an approved membership.
/// - `revision` starts at 1 and increases by one per saved change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: ClubId,
    pub name: ClubName,
    pub description: String,
    pub category: ClubCategory,
    pub status: ClubStatus,
    pub members: Vec<Membership>,
    pub leadership: Leadership,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
}

impl Club {
    /// Create a club awaiting approval.
    pub fn new(
        name: ClubName,
        description: &str,
        category: ClubCategory,
        now: DateTime<Utc>,
    ) -> Result<Self, ClubValidationError> {
        let description = description.trim();
        if description.chars().count() > CLUB_DESCRIPTION_MAX {
            return Err(ClubValidationError::DescriptionTooLong {
                max: CLUB_DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            id: ClubId::random(),
            name,
            description: description.to_owned(),
            category,
            status: ClubStatus::PendingApproval,
            members: Vec::new(),
            leadership: Leadership::default(),
            revision: 1,
            created_at: now,
        })
    }

    /// Whether `actor` may see this club. Non-admins only see active clubs.
    pub fn is_visible_to(&self, actor: &Actor) -> bool {
        actor.is_admin() || matches!(self.status, ClubStatus::Active)
    }

    /// The user's active (pending or approved) membership, if any.
    pub fn active_membership(&self, user: UserId) -> Option<&Membership> {
        self.members
            .iter()
            .find(|member| member.user_id == user && member.status.is_active())
    }

    /// Most recent membership record for the user, including rejected ones.
    pub fn latest_membership(&self, user: UserId) -> Option<&Membership> {
        self.members
            .iter()
            .rev()
            .find(|member| member.user_id == user)
    }

    /// Pending requests in the order they were made.
    pub fn pending_requests(&self) -> Vec<Membership> {
        self.members
            .iter()
            .filter(|member| matches!(member.status, MembershipStatus::Pending))
            .cloned()
            .collect()
    }

    /// Number of approved members.
    pub fn approved_count(&self) -> usize {
        self.members
            .iter()
            .filter(|member| matches!(member.status, MembershipStatus::Approved))
            .count()
    }

    /// Append a pending join request for `user`.
    pub fn request_join(
        &mut self,
        user: UserId,
        profile: MemberProfile,
        now: DateTime<Utc>,
    ) -> Result<MembershipId, MembershipRuleError> {
        if !matches!(self.status, ClubStatus::Active) {
            return Err(MembershipRuleError::ClubInactive);
        }
        if let Some(existing) = self.active_membership(user) {
            return Err(match existing.status {
                MembershipStatus::Approved => MembershipRuleError::AlreadyMember,
                _ => MembershipRuleError::PendingRequestExists,
            });
        }
        let id = MembershipId::random();
        self.members.push(Membership {
            id,
            user_id: user,
            profile,
            role: MemberRole::Member,
            status: MembershipStatus::Pending,
            requested_at: now,
            decided_at: None,
        });
        Ok(id)
    }

    fn membership_mut(
        &mut self,
        membership: MembershipId,
    ) -> Result<&mut Membership, MembershipRuleError> {
        self.members
            .iter_mut()
            .find(|member| member.id == membership)
            .ok_or(MembershipRuleError::MembershipNotFound)
    }

    /// Approve a membership and return the member's user id.
    ///
    /// Approving an already approved membership is a no-op. A rejected
    /// request cannot be approved while the user holds a newer active one.
    pub fn approve(
        &mut self,
        membership: MembershipId,
        now: DateTime<Utc>,
    ) -> Result<UserId, MembershipRuleError> {
        let user = self
            .members
            .iter()
            .find(|member| member.id == membership)
            .map(|member| member.user_id)
            .ok_or(MembershipRuleError::MembershipNotFound)?;
        if self
            .active_membership(user)
            .is_some_and(|active| active.id != membership)
        {
            return Err(MembershipRuleError::OtherMembershipActive);
        }
        let entry = self.membership_mut(membership)?;
        if !matches!(entry.status, MembershipStatus::Approved) {
            entry.status = MembershipStatus::Approved;
            entry.decided_at = Some(now);
        }
        Ok(entry.user_id)
    }

    /// Reject a membership.
    ///
    /// Rejecting an approved member also vacates any leadership slot they held.
    pub fn reject(
        &mut self,
        membership: MembershipId,
        now: DateTime<Utc>,
    ) -> Result<Rejection, MembershipRuleError> {
        let entry = self.membership_mut(membership)?;
        let was_approved = matches!(entry.status, MembershipStatus::Approved);
        if !matches!(entry.status, MembershipStatus::Rejected) {
            entry.status = MembershipStatus::Rejected;
            entry.role = MemberRole::Member;
            entry.decided_at = Some(now);
        }
        let user_id = entry.user_id;
        if was_approved {
            self.leadership.vacate(user_id);
        }
        Ok(Rejection {
            user_id,
            was_approved,
        })
    }

    /// Remove the user's active membership entirely.
    pub fn leave(&mut self, user: UserId) -> Result<Membership, MembershipRuleError> {
        let index = self
            .members
            .iter()
            .position(|member| member.user_id == user && member.status.is_active())
            .ok_or(MembershipRuleError::NotAMember)?;
        let removed = self.members.remove(index);
        self.leadership.vacate(user);
        Ok(removed)
    }

    /// Assign or clear a leadership slot.
    ///
    /// Holders are promoted to `officer`; a member left without any slot
    /// returns to `member`.
    pub fn assign_leader(
        &mut self,
        slot: LeadershipSlot,
        user: Option<UserId>,
    ) -> Result<(), MembershipRuleError> {
        if let Some(candidate) = user {
            let approved = self.members.iter().any(|member| {
                member.user_id == candidate && matches!(member.status, MembershipStatus::Approved)
            });
            if !approved {
                return Err(MembershipRuleError::LeaderNotMember);
            }
        }
        let previous = std::mem::replace(self.leadership.slot_mut(slot), user);
        if let Some(candidate) = user {
            self.set_role(candidate, MemberRole::Officer);
        }
        if let Some(old) = previous.filter(|old| !self.leadership.holds_any(*old)) {
            self.set_role(old, MemberRole::Member);
        }
        Ok(())
    }

    fn set_role(&mut self, user: UserId, role: MemberRole) {
        for member in self
            .members
            .iter_mut()
            .filter(|member| member.user_id == user && member.status.is_active())
        {
            member.role = role;
        }
    }

    /// Bump the revision for a pending save and return the revision the
    /// stored document must still have.
    pub fn advance_revision(&mut self) -> u32 {
        let expected = self.revision;
        self.revision = expected.saturating_add(1);
        expected
    }
}
