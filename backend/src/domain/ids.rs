//! Strongly typed identifiers for aggregates and their embedded entities.
//!
//! Aggregates refer to one another only through these ids; no aggregate holds
//! a reference to another.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string is not a valid UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} must be a valid UUID")]
pub struct InvalidId {
    kind: &'static str,
}

impl InvalidId {
    /// Human-readable name of the identifier kind that failed to parse.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse an identifier from its hyphenated string form.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidId> {
                raw.as_ref().parse()
            }

            /// Access the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim() != s {
                    return Err(InvalidId { kind: $label });
                }
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| InvalidId { kind: $label })
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Stable user identifier.
    UserId,
    "user id"
);
define_id!(
    /// Club identifier.
    ClubId,
    "club id"
);
define_id!(
    /// Identifier of a membership entry embedded in a club.
    MembershipId,
    "membership id"
);
define_id!(
    /// Election identifier.
    ElectionId,
    "election id"
);
define_id!(
    /// Identifier of a candidate embedded in an election.
    CandidateId,
    "candidate id"
);
