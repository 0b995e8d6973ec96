//! Account names as used by the host chain.
//!
//! A name is 1 to 12 characters drawn from `a-z`, `1-5` and `.`, and may not
//! end with a `.`. Byte-wise ordering of valid names matches the ordering of
//! their packed 64-bit encoding on chain, so ballots stored under name keys
//! enumerate in the same order the host would.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated account name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Maximum length of an account name.
    pub const MAX_LEN: usize = 12;

    /// Create an account name from a string known to be valid.
    ///
    /// # Panics
    /// Panics if the name is not a valid account name.
    pub fn new(raw: impl Into<String>) -> Self {
        match Self::parse(raw) {
            Ok(name) => name,
            Err(e) => panic!("{e}"),
        }
    }

    /// Parse and validate an account name.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(TypesError::InvalidAccountName(s))
        }
    }

    /// Whether `s` satisfies the account naming rules.
    pub fn is_valid(s: &str) -> bool {
        !s.is_empty()
            && s.len() <= Self::MAX_LEN
            && !s.ends_with('.')
            && s
                .bytes()
                .all(|b| matches!(b, b'a'..=b'z' | b'1'..=b'5' | b'.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountName {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<&[u8]> for AccountName {
    type Error = TypesError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let s = std::str::from_utf8(bytes)
            .map_err(|_| TypesError::InvalidAccountName(String::from_utf8_lossy(bytes).into()))?;
        Self::parse(s)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}
