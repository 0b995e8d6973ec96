//! Nullable authorizer: grants and revocations controlled by the test.

use std::collections::HashSet;
use std::sync::Mutex;

use referendum_governance::Authorizer;
use referendum_types::AccountName;

/// An authorizer that grants every account its own authority, plus any
/// delegated `(caller, account)` pairs the test adds. Individual accounts
/// can be locked out to simulate a failed signature check.
pub struct NullAuthorizer {
    delegations: Mutex<HashSet<(AccountName, AccountName)>>,
    locked: Mutex<HashSet<AccountName>>,
}

impl NullAuthorizer {
    pub fn new() -> Self {
        Self {
            delegations: Mutex::new(HashSet::new()),
            locked: Mutex::new(HashSet::new()),
        }
    }

    /// Let `caller` act with `account`'s authority.
    pub fn grant(&self, caller: &AccountName, account: &AccountName) {
        self.delegations
            .lock()
            .unwrap()
            .insert((caller.clone(), account.clone()));
    }

    /// Refuse every request requiring `account`'s authority.
    pub fn lock(&self, account: &AccountName) {
        self.locked.lock().unwrap().insert(account.clone());
    }

    fn decide(&self, caller: &AccountName, required: &AccountName) -> bool {
        if self.locked.lock().unwrap().contains(required) {
            return false;
        }
        caller == required
            || self
                .delegations
                .lock()
                .unwrap()
                .contains(&(caller.clone(), required.clone()))
    }
}

impl Default for NullAuthorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Authorizer for NullAuthorizer {
    fn authorize(&self, caller: &AccountName, required: &AccountName) -> bool {
        self.decide(caller, required)
    }
}
