//! The ballot box: one registered choice per voter account.

use referendum_store::{ReferendumStore, StoreError};
use referendum_types::{AccountName, VoteSide};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::ReferendumError;

/// A registered choice. Never edited in place: changing sides means
/// withdrawing and voting again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: AccountName,
    pub side: VoteSide,
}

impl Ballot {
    pub fn new(voter: AccountName, side: VoteSide) -> Self {
        Self { voter, side }
    }
}

/// Typed view over the ballot table of a [`ReferendumStore`].
pub struct BallotBox<'a, S: ReferendumStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ReferendumStore + ?Sized> BallotBox<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The ballot cast by `voter`, if any.
    pub fn get(&self, voter: &AccountName) -> Result<Option<Ballot>, ReferendumError> {
        match self.store.get_ballot(voter)? {
            Some(bytes) => Ok(Some(codec::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert a new ballot; `AlreadyVoted` if the voter has one.
    pub fn insert(&self, ballot: &Ballot) -> Result<(), ReferendumError> {
        let bytes = codec::encode(ballot)?;
        match self.store.insert_ballot(&ballot.voter, &bytes) {
            Err(StoreError::Duplicate(_)) => Err(ReferendumError::AlreadyVoted(ballot.voter.clone())),
            other => Ok(other?),
        }
    }

    /// Remove the ballot cast by `voter`; `NotVoted` if there is none.
    pub fn remove(&self, voter: &AccountName) -> Result<(), ReferendumError> {
        match self.store.delete_ballot(voter) {
            Err(StoreError::NotFound(_)) => Err(ReferendumError::NotVoted(voter.clone())),
            other => Ok(other?),
        }
    }

    /// Snapshot of every ballot, ascending by voter name.
    pub fn all(&self) -> Result<Vec<Ballot>, ReferendumError> {
        let mut ballots = Vec::new();
        for (voter, bytes) in self.store.iter_ballots()? {
            let ballot: Ballot = codec::decode(&bytes)?;
            if ballot.voter != voter {
                return Err(ReferendumError::Serialization(format!(
                    "ballot stored under {voter} belongs to {}",
                    ballot.voter
                )));
            }
            ballots.push(ballot);
        }
        ballots.sort_by(|a, b| a.voter.cmp(&b.voter));
        Ok(ballots)
    }

    /// Number of registered ballots, without decoding them.
    pub fn count(&self) -> Result<u64, ReferendumError> {
        Ok(self.store.ballot_count()?)
    }
}
