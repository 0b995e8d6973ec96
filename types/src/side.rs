//! The two sides of the referendum ballot.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A voter's choice. On the wire a side is a single byte: `1` for yes,
/// `0` for no.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteSide {
    No,
    Yes,
}

impl VoteSide {
    pub const NO_CODE: u8 = 0;
    pub const YES_CODE: u8 = 1;

    /// The wire code for this side.
    pub fn code(self) -> u8 {
        match self {
            Self::No => Self::NO_CODE,
            Self::Yes => Self::YES_CODE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
        }
    }
}

impl TryFrom<u8> for VoteSide {
    type Error = TypesError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            Self::YES_CODE => Ok(Self::Yes),
            Self::NO_CODE => Ok(Self::No),
            other => Err(TypesError::InvalidSide(other)),
        }
    }
}

impl fmt::Display for VoteSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
