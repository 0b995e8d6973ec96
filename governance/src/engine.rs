//! The referendum engine: the four actions over an injected store, stake
//! oracle and authorizer.
//!
//! Every action validates fully before it writes, and each writes through a
//! single store call, so a rejected action leaves nothing behind.
//!
//! Pending recounts live in the store as a [`DeferredQueue`]. A tally that
//! arms the next one writes the new state and the queue together.

use referendum_store::ReferendumStore;
use referendum_types::{AccountName, Timestamp, VoteSide};

use crate::auth::Authorizer;
use crate::ballot::{Ballot, BallotBox};
use crate::config::{ReferendumConfig, ReferendumParams};
use crate::error::ReferendumError;
use crate::oracle::StakeOracle;
use crate::schedule::{Action, DeferredQueue, ScheduledAction};
use crate::state::ReferendumState;
use crate::tally::{self, TallyOutcome};

pub struct ReferendumEngine<S, O, A> {
    /// The referendum's own account; scheduled recounts run under it.
    contract: AccountName,
    /// Parameters installed by `init`.
    defaults: ReferendumParams,
    store: S,
    oracle: O,
    authorizer: A,
}

impl<S, O, A> ReferendumEngine<S, O, A>
where
    S: ReferendumStore,
    O: StakeOracle,
    A: Authorizer,
{
    pub fn new(
        contract: AccountName,
        defaults: ReferendumParams,
        store: S,
        oracle: O,
        authorizer: A,
    ) -> Self {
        Self {
            contract,
            defaults,
            store,
            oracle,
            authorizer,
        }
    }

    pub fn contract(&self) -> &AccountName {
        &self.contract
    }

    pub fn defaults(&self) -> &ReferendumParams {
        &self.defaults
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    fn ballot_box(&self) -> BallotBox<'_, S> {
        BallotBox::new(&self.store)
    }

    fn require_auth(&self, caller: &AccountName, account: &AccountName) -> Result<(), ReferendumError> {
        if self.authorizer.authorize(caller, account) {
            Ok(())
        } else {
            Err(ReferendumError::Unauthorized(account.clone()))
        }
    }

    /// The current state, rejecting the action if voting has finished.
    fn require_active(&self) -> Result<ReferendumState, ReferendumError> {
        let state = self.state()?;
        if !state.vote_active {
            return Err(ReferendumError::VotingClosed);
        }
        Ok(state)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> Result<ReferendumConfig, ReferendumError> {
        let bytes = self
            .store
            .get_config()?
            .ok_or(ReferendumError::NotInitialized)?;
        ReferendumConfig::from_bytes(&bytes)
    }

    pub fn state(&self) -> Result<ReferendumState, ReferendumError> {
        let bytes = self
            .store
            .get_state()?
            .ok_or(ReferendumError::NotInitialized)?;
        ReferendumState::from_bytes(&bytes)
    }

    /// Every registered ballot, ascending by voter.
    pub fn ballots(&self) -> Result<Vec<Ballot>, ReferendumError> {
        self.ballot_box().all()
    }

    pub fn ballot_count(&self) -> Result<u64, ReferendumError> {
        self.ballot_box().count()
    }

    /// The persisted deferred actions; empty if none were ever armed.
    pub fn deferred(&self) -> Result<DeferredQueue, ReferendumError> {
        match self.store.get_deferred()? {
            Some(bytes) => DeferredQueue::from_bytes(&bytes),
            None => Ok(DeferredQueue::new()),
        }
    }

    pub fn save_deferred(&self, queue: &DeferredQueue) -> Result<(), ReferendumError> {
        self.store.put_deferred(&queue.to_bytes()?)?;
        Ok(())
    }

    // ── Actions ─────────────────────────────────────────────────────────

    /// Install the default configuration with `publisher` as the tally
    /// trigger and reset the state. Calling it again overwrites both;
    /// registered ballots are kept.
    pub fn init(&self, caller: &AccountName, publisher: &AccountName) -> Result<(), ReferendumError> {
        self.require_auth(caller, publisher)?;
        self.defaults.validate()?;

        if self.store.get_state()?.is_some() {
            tracing::warn!(%publisher, "re-initializing referendum, previous state is overwritten");
        }

        let config = ReferendumConfig::new(publisher.clone(), self.defaults.clone());
        let state = ReferendumState::initial();
        self.store.initialize(&config.to_bytes()?, &state.to_bytes()?)?;

        tracing::info!(
            %publisher,
            min_participation_percent = config.params.min_participation_percent,
            vote_period_days = config.params.vote_period_days,
            sustained_vote_days = config.params.sustained_vote_days,
            "referendum initialized"
        );
        Ok(())
    }

    /// Register `voter`'s ballot. `side` is the wire code: 1 for yes, 0 for no.
    pub fn vote(
        &self,
        caller: &AccountName,
        voter: &AccountName,
        side: u8,
    ) -> Result<Ballot, ReferendumError> {
        self.require_auth(caller, voter)?;
        self.require_active()?;

        if self.oracle.stake_of(voter).is_none() {
            return Err(ReferendumError::NotStaked(voter.clone()));
        }
        let side = VoteSide::try_from(side).map_err(|_| ReferendumError::InvalidSide(side))?;

        let ballots = self.ballot_box();
        if ballots.get(voter)?.is_some() {
            return Err(ReferendumError::AlreadyVoted(voter.clone()));
        }
        let ballot = Ballot::new(voter.clone(), side);
        ballots.insert(&ballot)?;

        tracing::info!(%voter, %side, "vote registered");
        Ok(ballot)
    }

    /// Withdraw `voter`'s ballot, returning it.
    pub fn unvote(&self, caller: &AccountName, voter: &AccountName) -> Result<Ballot, ReferendumError> {
        self.require_auth(caller, voter)?;
        self.require_active()?;

        let ballots = self.ballot_box();
        let ballot = ballots
            .get(voter)?
            .ok_or_else(|| ReferendumError::NotVoted(voter.clone()))?;
        ballots.remove(voter)?;

        tracing::info!(%voter, side = %ballot.side, "vote withdrawn");
        Ok(ballot)
    }

    /// Tally today's ballots and persist the new state.
    ///
    /// Only the configured publisher, or the referendum's own account (which
    /// is how scheduled recounts arrive), may trigger a tally. The returned
    /// outcome carries the recount to arm if voting continues; nothing is
    /// queued here. Hosts that keep the schedule in the store use
    /// [`count_votes_and_arm`](Self::count_votes_and_arm) instead.
    pub fn count_votes(
        &self,
        caller: &AccountName,
        publisher: &AccountName,
    ) -> Result<TallyOutcome, ReferendumError> {
        let outcome = self.prepare_tally(caller, publisher)?;
        self.store.put_state(&outcome.next.to_bytes()?)?;
        log_tally(&outcome);
        Ok(outcome)
    }

    /// Tally like [`count_votes`](Self::count_votes) and queue the recount
    /// it returns in the persisted schedule, replacing any pending one from
    /// the referendum. State and schedule are written in one store call.
    pub fn count_votes_and_arm(
        &self,
        caller: &AccountName,
        publisher: &AccountName,
        now: Timestamp,
    ) -> Result<TallyOutcome, ReferendumError> {
        let mut queue = self.deferred()?;
        self.arm_tally(caller, publisher, now, &mut queue)
    }

    /// Run every persisted action due at `now`, queueing whatever they
    /// schedule in turn. Returns how many ran. A failing action is logged
    /// and dropped from the schedule.
    pub fn run_due(&self, now: Timestamp) -> Result<u64, ReferendumError> {
        let mut queue = self.deferred()?;
        let due = queue.pop_due(now);
        let mut ran = 0;

        for scheduled in due {
            let mut attempt = queue.clone();
            let result = match &scheduled.action {
                Action::CountVotes { publisher } => self
                    .arm_tally(&scheduled.authorization, publisher, now, &mut attempt)
                    .map(|_| ()),
                other => self
                    .dispatch(&scheduled.authorization, other)
                    .and_then(|_| self.save_deferred(&attempt)),
            };
            match result {
                Ok(()) => {
                    queue = attempt;
                    ran += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        action = scheduled.action.name(),
                        error = %e,
                        "scheduled action failed"
                    );
                    self.save_deferred(&queue)?;
                }
            }
        }
        Ok(ran)
    }

    /// Every check `countvotes` makes, then the tally itself. Writes nothing.
    fn prepare_tally(
        &self,
        caller: &AccountName,
        publisher: &AccountName,
    ) -> Result<TallyOutcome, ReferendumError> {
        self.require_auth(caller, publisher)?;
        let config = self.config()?;
        if *publisher != config.publisher && *publisher != self.contract {
            return Err(ReferendumError::Unauthorized(config.publisher));
        }
        let prior = self.require_active()?;

        let ballots = self.ballot_box().all()?;
        Ok(tally::run_tally(&config.params, &prior, &ballots, &self.oracle, &self.contract))
    }

    fn arm_tally(
        &self,
        caller: &AccountName,
        publisher: &AccountName,
        now: Timestamp,
        queue: &mut DeferredQueue,
    ) -> Result<TallyOutcome, ReferendumError> {
        let outcome = self.prepare_tally(caller, publisher)?;
        if let Some(next) = &outcome.reschedule {
            let due = queue.enqueue(next.clone(), now)?;
            tracing::info!(%due, "next tally scheduled");
        }
        self.store
            .commit_tally(&outcome.next.to_bytes()?, &queue.to_bytes()?)?;
        log_tally(&outcome);
        Ok(outcome)
    }

    /// Run any action. Returns the deferred action to queue, if the action
    /// produced one.
    pub fn dispatch(
        &self,
        caller: &AccountName,
        action: &Action,
    ) -> Result<Option<ScheduledAction>, ReferendumError> {
        tracing::debug!(%caller, action = action.name(), "dispatching action");
        match action {
            Action::Init { publisher } => self.init(caller, publisher).map(|_| None),
            Action::Vote { voter, side } => self.vote(caller, voter, *side).map(|_| None),
            Action::Unvote { voter } => self.unvote(caller, voter).map(|_| None),
            Action::CountVotes { publisher } => {
                self.count_votes(caller, publisher).map(|outcome| outcome.reschedule)
            }
        }
    }
}

fn log_tally(outcome: &TallyOutcome) {
    tracing::info!(
        day = outcome.next.total_days,
        passed = outcome.day.passed,
        yes_stake = outcome.day.yes_stake,
        no_stake = outcome.day.no_stake,
        participation_percent = outcome.day.participation_percent,
        consecutive_days = outcome.next.total_consecutive_days,
        vote_active = outcome.next.vote_active,
        "votes counted"
    );
    if !outcome.next.vote_active {
        tracing::info!(
            total_days = outcome.next.total_days,
            "vote window exhausted, referendum closed"
        );
    }
}
