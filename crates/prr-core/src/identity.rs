//! # Identity Newtypes
//!
//! UUID-backed identifiers for every persisted entity the service touches.
//! Each identifier is a distinct type: you cannot pass a [`UserId`] where
//! a [`PullRequestId`] is expected.
//!
//! All identifiers are valid by construction. Parsing from a string goes
//! through [`std::str::FromStr`] and reports
//! [`ValidationError::InvalidIdentifier`] on malformed input.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidIdentifier {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of a pull request.
    PullRequestId,
    "pull request"
);

uuid_identifier!(
    /// Identifier of a user. Authors and reviewers share this space.
    UserId,
    "user"
);

uuid_identifier!(
    /// Identifier of a pull request's status record.
    StatusId,
    "status"
);

uuid_identifier!(
    /// Identifier of a single reviewer assignment row.
    AssignmentId,
    "assignment"
);
