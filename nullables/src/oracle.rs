//! Nullable stake oracle: a stake table the test edits directly.

use std::collections::HashMap;
use std::sync::Mutex;

use referendum_governance::StakeOracle;
use referendum_types::AccountName;

/// A stake oracle backed by an in-memory table.
///
/// Stakes can be changed between actions to model voters staking or
/// unstaking after they voted.
pub struct NullStakeOracle {
    stakes: Mutex<HashMap<AccountName, u64>>,
}

impl NullStakeOracle {
    pub fn new() -> Self {
        Self {
            stakes: Mutex::new(HashMap::new()),
        }
    }

    /// Build an oracle from `(account, stake)` pairs.
    pub fn with_stakes<'a>(entries: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let oracle = Self::new();
        for (name, stake) in entries {
            oracle.set_stake(&AccountName::new(name), stake);
        }
        oracle
    }

    pub fn set_stake(&self, account: &AccountName, stake: u64) {
        self.stakes.lock().unwrap().insert(account.clone(), stake);
    }

    /// Remove the account's stake entirely (the account is no longer staked).
    pub fn unstake(&self, account: &AccountName) {
        self.stakes.lock().unwrap().remove(account);
    }
}

impl Default for NullStakeOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl StakeOracle for NullStakeOracle {
    fn stake_of(&self, account: &AccountName) -> Option<u64> {
        self.stakes.lock().unwrap().get(account).copied()
    }
}
