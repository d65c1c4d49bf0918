//! Identity tokens for projects and characters
//!
//! Both are ULIDs: unique across the catalog and sortable by creation time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::error::MvDirectorError;

/// Identity token of a project (one editing session)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Ulid);

/// Identity token of a character within a roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(Ulid);

macro_rules! ulid_id {
    ($name:ident, $label:literal) => {
        impl $name {
            /// Generate a fresh identifier
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = MvDirectorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ulid::from_string(s.trim())
                    .map(Self)
                    .map_err(|e| MvDirectorError::Validation(format!("Invalid {} '{}': {}", $label, s, e)))
            }
        }
    };
}

ulid_id!(ProjectId, "project id");
ulid_id!(CharacterId, "character id");
