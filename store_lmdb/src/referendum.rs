//! LMDB implementation of ReferendumStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use referendum_store::{ReferendumStore, StoreError};
use referendum_types::AccountName;

use crate::LmdbError;

const CONFIG_KEY: &[u8] = b"config";
const STATE_KEY: &[u8] = b"state";
const DEFERRED_KEY: &[u8] = b"deferred";

pub struct LmdbReferendumStore {
    pub(crate) env: Arc<Env>,
    pub(crate) singletons_db: Database<Bytes, Bytes>,
    pub(crate) ballots_db: Database<Bytes, Bytes>,
}

impl LmdbReferendumStore {
    fn get_singleton(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .singletons_db
            .get(&rtxn, key)
            .map_err(LmdbError::from)?;
        Ok(val.map(|bytes| bytes.to_vec()))
    }

    fn put_singleton(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.singletons_db
            .put(&mut wtxn, key, value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}

impl ReferendumStore for LmdbReferendumStore {
    fn get_config(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.get_singleton(CONFIG_KEY)
    }

    fn get_state(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.get_singleton(STATE_KEY)
    }

    fn put_state(&self, state: &[u8]) -> Result<(), StoreError> {
        self.put_singleton(STATE_KEY, state)
    }

    fn initialize(&self, config: &[u8], state: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.singletons_db
            .put(&mut wtxn, CONFIG_KEY, config)
            .map_err(LmdbError::from)?;
        self.singletons_db
            .put(&mut wtxn, STATE_KEY, state)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_deferred(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.get_singleton(DEFERRED_KEY)
    }

    fn put_deferred(&self, deferred: &[u8]) -> Result<(), StoreError> {
        self.put_singleton(DEFERRED_KEY, deferred)
    }

    fn commit_tally(&self, state: &[u8], deferred: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.singletons_db
            .put(&mut wtxn, STATE_KEY, state)
            .map_err(LmdbError::from)?;
        self.singletons_db
            .put(&mut wtxn, DEFERRED_KEY, deferred)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_ballot(&self, voter: &AccountName) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .ballots_db
            .get(&rtxn, voter.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(|bytes| bytes.to_vec()))
    }

    fn insert_ballot(&self, voter: &AccountName, ballot: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let exists = self
            .ballots_db
            .get(&wtxn, voter.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        if exists {
            return Err(LmdbError::Duplicate(format!("ballot for {voter}")).into());
        }
        self.ballots_db
            .put(&mut wtxn, voter.as_bytes(), ballot)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete_ballot(&self, voter: &AccountName) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let deleted = self
            .ballots_db
            .delete(&mut wtxn, voter.as_bytes())
            .map_err(LmdbError::from)?;
        if !deleted {
            return Err(LmdbError::NotFound(format!("ballot for {voter}")).into());
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn iter_ballots(&self) -> Result<Vec<(AccountName, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for item in self.ballots_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, val) = item.map_err(LmdbError::from)?;
            let voter = AccountName::try_from(key)
                .map_err(|e| LmdbError::Corruption(format!("ballot key: {e}")))?;
            results.push((voter, val.to_vec()));
        }
        Ok(results)
    }

    fn ballot_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.ballots_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
