//! The stake oracle seam.

use std::collections::HashMap;

use referendum_types::AccountName;

/// Reports how much stake an account holds.
///
/// `None` means the account is not staked at all; `Some(0)` is a staked
/// account with no weight.
pub trait StakeOracle {
    fn stake_of(&self, account: &AccountName) -> Option<u64>;
}

/// A fixed stake table.
impl StakeOracle for HashMap<AccountName, u64> {
    fn stake_of(&self, account: &AccountName) -> Option<u64> {
        self.get(account).copied()
    }
}
