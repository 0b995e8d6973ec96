//! Referendum parameters.
//!
//! The constants below are the build-time defaults installed by `init`.
//! `total_available_stake` stands in for the circulating supply and is not
//! refreshed while the referendum runs.

use referendum_types::AccountName;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::ReferendumError;

/// Participation (percent of total available stake) a day must exceed.
pub const MINIMUM_VOTE_PARTICIPATION_PERCENTAGE: f64 = 15.0;
/// Maximum number of tallied days before the referendum gives up.
pub const REFERENDUM_VOTE_PERIOD_DAYS: u64 = 300;
/// Consecutive passing days the referendum is meant to sustain.
pub const SUSTAINED_VOTE_PERIOD_DAYS: u64 = 30;
/// Lead yes stake must hold over no stake. Compared against raw stake sums.
pub const YES_LEADING_VOTE_MARGIN: f64 = 5.0;
/// Total stake that could vote, in stake units.
pub const TOTAL_AVAILABLE_STAKE: f64 = 1_000_000_000.0;

/// Tunable thresholds of the referendum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferendumParams {
    pub min_participation_percent: f64,
    pub vote_period_days: u64,
    pub sustained_vote_days: u64,
    pub yes_lead_margin: f64,
    pub total_available_stake: f64,
}

impl Default for ReferendumParams {
    fn default() -> Self {
        Self {
            min_participation_percent: MINIMUM_VOTE_PARTICIPATION_PERCENTAGE,
            vote_period_days: REFERENDUM_VOTE_PERIOD_DAYS,
            sustained_vote_days: SUSTAINED_VOTE_PERIOD_DAYS,
            yes_lead_margin: YES_LEADING_VOTE_MARGIN,
            total_available_stake: TOTAL_AVAILABLE_STAKE,
        }
    }
}

impl ReferendumParams {
    /// Reject parameter sets that would make the participation figure
    /// meaningless (non-finite thresholds, or a non-positive stake total).
    pub fn validate(&self) -> Result<(), ReferendumError> {
        if !self.total_available_stake.is_finite() || self.total_available_stake <= 0.0 {
            return Err(ReferendumError::InvalidParams(format!(
                "total_available_stake must be positive and finite, got {}",
                self.total_available_stake
            )));
        }
        if !self.min_participation_percent.is_finite() {
            return Err(ReferendumError::InvalidParams(
                "min_participation_percent must be finite".into(),
            ));
        }
        if !self.yes_lead_margin.is_finite() {
            return Err(ReferendumError::InvalidParams(
                "yes_lead_margin must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// The configuration singleton written by `init`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferendumConfig {
    /// The account allowed to trigger tallies.
    pub publisher: AccountName,
    pub params: ReferendumParams,
}

impl ReferendumConfig {
    pub fn new(publisher: AccountName, params: ReferendumParams) -> Self {
        Self { publisher, params }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ReferendumError> {
        codec::encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReferendumError> {
        codec::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let p = ReferendumParams::default();
        assert_eq!(p.min_participation_percent, 15.0);
        assert_eq!(p.vote_period_days, 300);
        assert_eq!(p.sustained_vote_days, 30);
        assert_eq!(p.yes_lead_margin, 5.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_zero_stake_total() {
        let p = ReferendumParams {
            total_available_stake: 0.0,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ReferendumError::InvalidParams(_))));
    }

    #[test]
    fn rejects_nan_threshold() {
        let p = ReferendumParams {
            min_participation_percent: f64::NAN,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn config_bytes_round_trip() {
        let cfg = ReferendumConfig::new(AccountName::new("publisher"), ReferendumParams::default());
        let decoded = ReferendumConfig::from_bytes(&cfg.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, cfg);
    }
}
