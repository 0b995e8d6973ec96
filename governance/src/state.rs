//! The referendum state singleton.

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::config::ReferendumParams;
use crate::error::ReferendumError;

/// Where the referendum stands after the most recent tally.
///
/// `total_consecutive_days <= total_days` always holds. Once `vote_active`
/// is false the state is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferendumState {
    pub vote_active: bool,
    /// Days tallied so far.
    pub total_days: u64,
    /// Length of the current run of passing days.
    pub total_consecutive_days: u64,
}

impl ReferendumState {
    /// The state installed by `init`.
    pub fn initial() -> Self {
        Self {
            vote_active: true,
            total_days: 0,
            total_consecutive_days: 0,
        }
    }

    /// Days left in the vote window.
    pub fn days_remaining(&self, params: &ReferendumParams) -> u64 {
        params.vote_period_days.saturating_sub(self.total_days)
    }

    /// Whether the consecutive run has reached the sustained length.
    ///
    /// Informational only: reaching it does not close the referendum.
    pub fn sustained_reached(&self, params: &ReferendumParams) -> bool {
        self.total_consecutive_days >= params.sustained_vote_days
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReferendumError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReferendumError> {
        codec::decode(bytes)
    }
}

impl Default for ReferendumState {
    fn default() -> Self {
        Self::initial()
    }
}
