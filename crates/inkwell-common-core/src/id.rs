//! Strongly-typed identifiers.
//!
//! Records are keyed by database-assigned positive integers. Each entity gets
//! its own newtype so a `PostId` can never be passed where a `UserId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A strongly-typed ID wrapper.
macro_rules! define_id {
    ($name:ident, $label:literal) => {
        #[doc = concat!("Identifier of a ", $label, " record.")]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw database key.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Parse from a decimal string. Surrounding whitespace is ignored.
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                let value: i64 = s
                    .trim()
                    .parse()
                    .map_err(|_| IdParseError::InvalidFormat)?;
                if value <= 0 {
                    return Err(IdParseError::NotPositive);
                }
                Ok(Self(value))
            }

            /// Get the raw key.
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

/// Error parsing an ID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    /// The ID is not an integer.
    #[error("invalid ID format")]
    InvalidFormat,
    /// The ID is zero or negative.
    #[error("ID must be a positive integer")]
    NotPositive,
}

define_id!(UserId, "user");
define_id!(PostId, "post");
define_id!(CategoryId, "category");
define_id!(ExportId, "export");
