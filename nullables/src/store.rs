//! Nullable store: thread-safe in-memory storage for testing.

use referendum_store::{ReferendumStore, StoreError};
use referendum_types::AccountName;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// An in-memory referendum store for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Writes can be made to fail on demand, and every successful write is
/// counted, so tests can check that a rejected action wrote nothing.
pub struct NullStore {
    config: Mutex<Option<Vec<u8>>>,
    state: Mutex<Option<Vec<u8>>>,
    deferred: Mutex<Option<Vec<u8>>>,
    ballots: Mutex<BTreeMap<AccountName, Vec<u8>>>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(None),
            state: Mutex::new(None),
            deferred: Mutex::new(None),
            ballots: Mutex::new(BTreeMap::new()),
            fail_writes: AtomicBool::new(false),
            writes: AtomicU64::new(0),
        }
    }

    /// Make every subsequent write fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of writes that reached the store.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".into()));
        }
        Ok(())
    }

    fn commit_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferendumStore for NullStore {
    fn get_config(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.config.lock().unwrap().clone())
    }

    fn get_state(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.lock().unwrap().clone())
    }

    fn put_state(&self, state: &[u8]) -> Result<(), StoreError> {
        self.begin_write()?;
        *self.state.lock().unwrap() = Some(state.to_vec());
        self.commit_write();
        Ok(())
    }

    fn initialize(&self, config: &[u8], state: &[u8]) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut config_slot = self.config.lock().unwrap();
        let mut state_slot = self.state.lock().unwrap();
        *config_slot = Some(config.to_vec());
        *state_slot = Some(state.to_vec());
        self.commit_write();
        Ok(())
    }

    fn get_deferred(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.deferred.lock().unwrap().clone())
    }

    fn put_deferred(&self, deferred: &[u8]) -> Result<(), StoreError> {
        self.begin_write()?;
        *self.deferred.lock().unwrap() = Some(deferred.to_vec());
        self.commit_write();
        Ok(())
    }

    fn commit_tally(&self, state: &[u8], deferred: &[u8]) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut state_slot = self.state.lock().unwrap();
        let mut deferred_slot = self.deferred.lock().unwrap();
        *state_slot = Some(state.to_vec());
        *deferred_slot = Some(deferred.to_vec());
        self.commit_write();
        Ok(())
    }

    fn get_ballot(&self, voter: &AccountName) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.ballots.lock().unwrap().get(voter).cloned())
    }

    fn insert_ballot(&self, voter: &AccountName, ballot: &[u8]) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut ballots = self.ballots.lock().unwrap();
        if ballots.contains_key(voter) {
            return Err(StoreError::Duplicate(voter.to_string()));
        }
        ballots.insert(voter.clone(), ballot.to_vec());
        self.commit_write();
        Ok(())
    }

    fn delete_ballot(&self, voter: &AccountName) -> Result<(), StoreError> {
        self.begin_write()?;
        self.ballots
            .lock()
            .unwrap()
            .remove(voter)
            .ok_or_else(|| StoreError::NotFound(voter.to_string()))?;
        self.commit_write();
        Ok(())
    }

    fn iter_ballots(&self) -> Result<Vec<(AccountName, Vec<u8>)>, StoreError> {
        Ok(self
            .ballots
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn ballot_count(&self) -> Result<u64, StoreError> {
        Ok(self.ballots.lock().unwrap().len() as u64)
    }
}
