//! The daily tally.
//!
//! Everything here is a pure function of the ballots, the stake each voter
//! holds right now, the parameters and the prior state. The engine supplies
//! those inputs and persists the result.
//!
//! Stake is summed as `f64` in ballot order (ascending voter name), so a
//! replay over the same snapshot reproduces the same figures bit for bit.

use referendum_types::{AccountName, VoteSide};
use serde::Serialize;

use crate::ballot::Ballot;
use crate::config::ReferendumParams;
use crate::oracle::StakeOracle;
use crate::schedule::ScheduledAction;
use crate::state::ReferendumState;

/// Figures for one tallied day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayTally {
    pub yes_stake: f64,
    pub no_stake: f64,
    pub total_voted: f64,
    /// `total_voted` as a percentage of the total available stake.
    pub participation_percent: f64,
    /// Share of the voted stake on each side; absent when nobody's stake counted.
    pub yes_percent: Option<f64>,
    pub no_percent: Option<f64>,
    /// Ballots whose voter still held stake.
    pub counted_ballots: usize,
    /// Ballots ignored this round because the voter no longer holds stake.
    pub skipped_ballots: usize,
    pub quorum_met: bool,
    pub margin_met: bool,
    pub passed: bool,
}

/// The result of one tally run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TallyOutcome {
    pub day: DayTally,
    pub previous: ReferendumState,
    pub next: ReferendumState,
    /// The recount to arm, present only while the referendum stays open.
    pub reschedule: Option<ScheduledAction>,
}

/// Weigh every ballot by its voter's current stake and decide the day.
///
/// A day passes when participation strictly exceeds the minimum and yes
/// stake strictly exceeds no stake plus the margin. The margin is a raw
/// stake amount, not a percentage. A day where no stake counted always
/// fails.
pub fn tally_day<O: StakeOracle + ?Sized>(
    params: &ReferendumParams,
    ballots: &[Ballot],
    oracle: &O,
) -> DayTally {
    let mut yes_stake = 0.0_f64;
    let mut no_stake = 0.0_f64;
    let mut counted_ballots = 0;
    let mut skipped_ballots = 0;

    for ballot in ballots {
        let Some(stake) = oracle.stake_of(&ballot.voter) else {
            tracing::debug!(voter = %ballot.voter, "voter no longer staked, ballot skipped");
            skipped_ballots += 1;
            continue;
        };
        match ballot.side {
            VoteSide::Yes => yes_stake += stake as f64,
            VoteSide::No => no_stake += stake as f64,
        }
        counted_ballots += 1;
        tracing::trace!(voter = %ballot.voter, side = %ballot.side, stake, "ballot counted");
    }

    let total_voted = yes_stake + no_stake;
    let participation_percent = total_voted / params.total_available_stake * 100.0;

    let (yes_percent, no_percent) = if total_voted == 0.0 {
        (None, None)
    } else {
        (
            Some(yes_stake / total_voted * 100.0),
            Some(no_stake / total_voted * 100.0),
        )
    };

    let quorum_met = participation_percent > params.min_participation_percent;
    let margin_met = yes_stake > no_stake + params.yes_lead_margin;
    let passed = total_voted != 0.0 && quorum_met && margin_met;

    DayTally {
        yes_stake,
        no_stake,
        total_voted,
        participation_percent,
        yes_percent,
        no_percent,
        counted_ballots,
        skipped_ballots,
        quorum_met,
        margin_met,
        passed,
    }
}

/// Advance the counters by one day.
///
/// A passing day extends the consecutive run and keeps the vote open; the
/// referendum does not close when the run reaches the sustained length. A
/// failing day resets the run and closes the vote once a fresh run of
/// `sustained_vote_days` can no longer fit in the window.
pub fn next_state(
    params: &ReferendumParams,
    prior: &ReferendumState,
    passed: bool,
) -> ReferendumState {
    let total_days = prior.total_days.saturating_add(1);

    if passed {
        ReferendumState {
            vote_active: true,
            total_days,
            total_consecutive_days: prior.total_consecutive_days.saturating_add(1),
        }
    } else {
        let out_of_time =
            total_days.saturating_add(params.sustained_vote_days) > params.vote_period_days;
        ReferendumState {
            vote_active: !out_of_time,
            total_days,
            total_consecutive_days: 0,
        }
    }
}

/// Run a complete tally: weigh the day, advance the state and decide
/// whether to arm the next recount.
pub fn run_tally<O: StakeOracle + ?Sized>(
    params: &ReferendumParams,
    prior: &ReferendumState,
    ballots: &[Ballot],
    oracle: &O,
    contract: &AccountName,
) -> TallyOutcome {
    let day = tally_day(params, ballots, oracle);
    let next = next_state(params, prior, day.passed);
    let reschedule = next
        .vote_active
        .then(|| ScheduledAction::recount(contract));

    TallyOutcome {
        day,
        previous: *prior,
        next,
        reschedule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn acct(name: &str) -> AccountName {
        AccountName::new(name)
    }

    /// Scenario configuration: 15% quorum, 300 day window, 30 day run, margin 5,
    /// 1000 units of stake available.
    fn scenario_params() -> ReferendumParams {
        ReferendumParams {
            min_participation_percent: 15.0,
            vote_period_days: 300,
            sustained_vote_days: 30,
            yes_lead_margin: 5.0,
            total_available_stake: 1000.0,
        }
    }

    fn two_voters(yes: u64, no: u64) -> (Vec<Ballot>, HashMap<AccountName, u64>) {
        let ballots = vec![
            Ballot::new(acct("nay"), VoteSide::No),
            Ballot::new(acct("yea"), VoteSide::Yes),
        ];
        let stakes = HashMap::from([(acct("yea"), yes), (acct("nay"), no)]);
        (ballots, stakes)
    }

    #[test]
    fn low_participation_fails_regardless_of_margin() {
        let params = scenario_params();
        let (ballots, stakes) = two_voters(60, 10);
        let outcome = run_tally(&params, &ReferendumState::initial(), &ballots, &stakes, &acct("referendum"));

        assert!((outcome.day.participation_percent - 7.0).abs() < 1e-9);
        assert!(!outcome.day.quorum_met);
        assert!(outcome.day.margin_met);
        assert!(!outcome.day.passed);
        assert_eq!(outcome.next.total_days, 1);
        assert_eq!(outcome.next.total_consecutive_days, 0);
        assert!(outcome.next.vote_active);
        assert!(outcome.reschedule.is_some());
    }

    #[test]
    fn quorum_and_margin_pass_the_day() {
        let params = scenario_params();
        let (ballots, stakes) = two_voters(200, 10);
        let prior = ReferendumState {
            vote_active: true,
            total_days: 4,
            total_consecutive_days: 2,
        };
        let outcome = run_tally(&params, &prior, &ballots, &stakes, &acct("referendum"));

        assert!((outcome.day.participation_percent - 21.0).abs() < 1e-9);
        assert!(outcome.day.passed);
        assert_eq!(outcome.next.total_days, 5);
        assert_eq!(outcome.next.total_consecutive_days, 3);
        assert!(outcome.next.vote_active);
        assert_eq!(outcome.previous, prior);
    }

    #[test]
    fn margin_is_compared_against_raw_stake() {
        let params = scenario_params();
        // 300 yes vs 296 no: 59.6% participation, yes leads by 4 units, margin is 5.
        let (ballots, stakes) = two_voters(300, 296);
        let day = tally_day(&params, &ballots, &stakes);
        assert!(day.quorum_met);
        assert!(!day.margin_met);
        assert!(!day.passed);

        // A lead of exactly the margin is still not enough.
        let (ballots, stakes) = two_voters(301, 296);
        assert!(!tally_day(&params, &ballots, &stakes).passed);

        let (ballots, stakes) = two_voters(302, 296);
        assert!(tally_day(&params, &ballots, &stakes).passed);
    }

    #[test]
    fn zero_turnout_fails_without_percentages() {
        let params = ReferendumParams {
            min_participation_percent: -1.0,
            yes_lead_margin: -1.0,
            ..scenario_params()
        };
        let stakes: HashMap<AccountName, u64> = HashMap::new();
        let day = tally_day(&params, &[], &stakes);

        assert_eq!(day.total_voted, 0.0);
        assert_eq!(day.yes_percent, None);
        assert_eq!(day.no_percent, None);
        assert!(!day.passed);
    }

    #[test]
    fn unstaked_voters_are_skipped() {
        let params = scenario_params();
        let ballots = vec![
            Ballot::new(acct("gone"), VoteSide::No),
            Ballot::new(acct("yea"), VoteSide::Yes),
        ];
        let stakes = HashMap::from([(acct("yea"), 400)]);
        let day = tally_day(&params, &ballots, &stakes);

        assert_eq!(day.counted_ballots, 1);
        assert_eq!(day.skipped_ballots, 1);
        assert_eq!(day.no_stake, 0.0);
        assert_eq!(day.yes_percent, Some(100.0));
        assert!(day.passed);
    }

    #[test]
    fn failure_closes_vote_when_no_run_can_fit() {
        let params = scenario_params();
        let prior = ReferendumState {
            vote_active: true,
            total_days: 270,
            total_consecutive_days: 12,
        };
        let stakes: HashMap<AccountName, u64> = HashMap::new();
        // Day 271 + 30 > 300.
        let outcome = run_tally(&params, &prior, &[], &stakes, &acct("referendum"));
        assert!(!outcome.next.vote_active);
        assert_eq!(outcome.next.total_days, 271);
        assert_eq!(outcome.next.total_consecutive_days, 0);
        assert!(outcome.reschedule.is_none());
    }

    #[test]
    fn failure_on_last_fitting_day_keeps_vote_open() {
        let params = scenario_params();
        let prior = ReferendumState {
            vote_active: true,
            total_days: 269,
            total_consecutive_days: 0,
        };
        // Day 270 + 30 == 300 still leaves room for a full run.
        let next = next_state(&params, &prior, false);
        assert!(next.vote_active);
    }

    #[test]
    fn passing_past_sustained_length_does_not_close() {
        let params = scenario_params();
        let prior = ReferendumState {
            vote_active: true,
            total_days: 100,
            total_consecutive_days: 30,
        };
        let next = next_state(&params, &prior, true);
        assert!(next.vote_active);
        assert_eq!(next.total_consecutive_days, 31);
        assert!(next.sustained_reached(&params));
    }

    #[test]
    fn passing_day_keeps_vote_open_even_past_window() {
        let params = scenario_params();
        let prior = ReferendumState {
            vote_active: true,
            total_days: 300,
            total_consecutive_days: 5,
        };
        let (ballots, stakes) = two_voters(500, 10);
        let outcome = run_tally(&params, &prior, &ballots, &stakes, &acct("referendum"));
        assert!(outcome.day.passed);
        assert!(outcome.next.vote_active);
        assert_eq!(outcome.next.total_days, 301);
        assert!(outcome.reschedule.is_some());
    }

    #[test]
    fn reschedule_targets_the_contract() {
        let params = scenario_params();
        let contract = acct("referendum");
        let stakes: HashMap<AccountName, u64> = HashMap::new();
        let outcome = run_tally(&params, &ReferendumState::initial(), &[], &stakes, &contract);
        assert_eq!(outcome.reschedule, Some(ScheduledAction::recount(&contract)));
    }
}
