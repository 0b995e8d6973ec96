//! Referendum storage trait.
//!
//! Values are opaque, already-encoded bytes; the governance crate owns the
//! encoding. Three singletons (configuration, state and the pending
//! deferred actions) plus one table of ballots keyed by voter account.

use crate::StoreError;
use referendum_types::AccountName;

/// Trait for storing the referendum's configuration, state and ballot box.
pub trait ReferendumStore {
    /// Get the encoded configuration, if the referendum has been initialized.
    fn get_config(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Get the encoded referendum state, if the referendum has been initialized.
    fn get_state(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the referendum state.
    fn put_state(&self, state: &[u8]) -> Result<(), StoreError>;

    /// Write configuration and state together. Either both are written or
    /// neither is. Existing values are overwritten.
    fn initialize(&self, config: &[u8], state: &[u8]) -> Result<(), StoreError>;

    /// Get the encoded queue of pending deferred actions, if one was saved.
    fn get_deferred(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the queue of pending deferred actions.
    fn put_deferred(&self, deferred: &[u8]) -> Result<(), StoreError>;

    /// Write the state and the deferred queue together, as one tally that
    /// also re-arms the next one. Either both are written or neither is.
    fn commit_tally(&self, state: &[u8], deferred: &[u8]) -> Result<(), StoreError>;

    /// Get the encoded ballot cast by `voter`.
    fn get_ballot(&self, voter: &AccountName) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert a ballot. Fails with [`StoreError::Duplicate`] if `voter`
    /// already has one.
    fn insert_ballot(&self, voter: &AccountName, ballot: &[u8]) -> Result<(), StoreError>;

    /// Remove a ballot. Fails with [`StoreError::NotFound`] if `voter` has none.
    fn delete_ballot(&self, voter: &AccountName) -> Result<(), StoreError>;

    /// All ballots in ascending voter-name order.
    fn iter_ballots(&self) -> Result<Vec<(AccountName, Vec<u8>)>, StoreError>;

    /// Number of registered ballots.
    fn ballot_count(&self) -> Result<u64, StoreError>;
}
