//! Deferred actions.
//!
//! The engine never sleeps or sets timers. When a tally leaves the
//! referendum open it returns a [`ScheduledAction`] describing the next
//! `countvotes` call, and whoever hosts the engine queues it. [`DeferredQueue`]
//! is that queue: one pending action per sender, popped once due. The engine
//! keeps it in the store so a recount armed by one process is seen by the
//! next.

use std::collections::BTreeMap;

use referendum_types::{AccountName, Timestamp};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::ReferendumError;

/// Delay between consecutive tallies.
pub const TALLY_INTERVAL_SECS: u64 = 86_400;

/// One of the four referendum actions, with its arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Init { publisher: AccountName },
    Vote { voter: AccountName, side: u8 },
    Unvote { voter: AccountName },
    CountVotes { publisher: AccountName },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Vote { .. } => "vote",
            Self::Unvote { .. } => "unvote",
            Self::CountVotes { .. } => "countvotes",
        }
    }
}

/// An action to run after a delay, under the authority of `authorization`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAction {
    /// Identifies the deferral; at most one is pending per sender.
    pub sender_id: AccountName,
    pub authorization: AccountName,
    pub action: Action,
    pub delay_secs: u64,
    /// Whether this replaces a pending action from the same sender.
    pub replace_existing: bool,
}

impl ScheduledAction {
    /// The self-addressed recount the referendum arms after each open tally.
    pub fn recount(contract: &AccountName) -> Self {
        Self {
            sender_id: contract.clone(),
            authorization: contract.clone(),
            action: Action::CountVotes {
                publisher: contract.clone(),
            },
            delay_secs: TALLY_INTERVAL_SECS,
            replace_existing: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Deferred {
    due: Timestamp,
    seq: u64,
    action: ScheduledAction,
}

/// Pending deferred actions keyed by sender.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DeferredQueue {
    pending: BTreeMap<AccountName, Deferred>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire `action.delay_secs` after `now`.
    ///
    /// Returns the due time. A pending action from the same sender is
    /// replaced when `replace_existing` is set, otherwise the new one is
    /// rejected with `DeferredExists`.
    pub fn enqueue(
        &mut self,
        action: ScheduledAction,
        now: Timestamp,
    ) -> Result<Timestamp, ReferendumError> {
        if self.pending.contains_key(&action.sender_id) && !action.replace_existing {
            return Err(ReferendumError::DeferredExists(action.sender_id));
        }
        let due = now.plus_secs(action.delay_secs);
        let seq = self.next_seq;
        self.next_seq += 1;
        if self
            .pending
            .insert(action.sender_id.clone(), Deferred { due, seq, action })
            .is_some()
        {
            tracing::debug!("replaced pending deferred action");
        }
        Ok(due)
    }

    /// The action pending from `sender` and when it is due.
    pub fn pending(&self, sender: &AccountName) -> Option<(Timestamp, &ScheduledAction)> {
        self.pending.get(sender).map(|d| (d.due, &d.action))
    }

    /// When the earliest pending action becomes due.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.pending.values().map(|d| d.due).min()
    }

    /// Remove and return every action due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: Timestamp) -> Vec<ScheduledAction> {
        let due_senders: Vec<AccountName> = self
            .pending
            .iter()
            .filter(|(_, d)| d.due <= now)
            .map(|(sender, _)| sender.clone())
            .collect();

        let mut due: Vec<Deferred> = due_senders
            .iter()
            .filter_map(|sender| self.pending.remove(sender))
            .collect();
        due.sort_by_key(|d| (d.due, d.seq));
        due.into_iter().map(|d| d.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
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

    fn acct(name: &str) -> AccountName {
        AccountName::new(name)
    }

    #[test]
    fn recount_is_self_addressed_daily() {
        let contract = acct("referendum");
        let action = ScheduledAction::recount(&contract);
        assert_eq!(action.sender_id, contract);
        assert_eq!(action.authorization, contract);
        assert_eq!(action.delay_secs, 86_400);
        assert!(action.replace_existing);
        assert_eq!(action.action.name(), "countvotes");
    }

    #[test]
    fn action_becomes_due_after_delay() {
        let mut queue = DeferredQueue::new();
        let due = queue
            .enqueue(ScheduledAction::recount(&acct("referendum")), Timestamp::new(100))
            .unwrap();
        assert_eq!(due, Timestamp::new(100 + TALLY_INTERVAL_SECS));
        assert!(queue.pop_due(Timestamp::new(100 + TALLY_INTERVAL_SECS - 1)).is_empty());
        assert_eq!(queue.pop_due(due).len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn same_sender_replaces_pending() {
        let mut queue = DeferredQueue::new();
        let contract = acct("referendum");
        queue
            .enqueue(ScheduledAction::recount(&contract), Timestamp::new(0))
            .unwrap();
        queue
            .enqueue(ScheduledAction::recount(&contract), Timestamp::new(500))
            .unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(Timestamp::new(500 + TALLY_INTERVAL_SECS)));
    }

    #[test]
    fn same_sender_without_replace_is_rejected() {
        let mut queue = DeferredQueue::new();
        let contract = acct("referendum");
        queue
            .enqueue(ScheduledAction::recount(&contract), Timestamp::new(0))
            .unwrap();
        let mut second = ScheduledAction::recount(&contract);
        second.replace_existing = false;
        match queue.enqueue(second, Timestamp::new(10)) {
            Err(ReferendumError::DeferredExists(sender)) => assert_eq!(sender, contract),
            other => panic!("expected DeferredExists, got {other:?}"),
        }
    }

    #[test]
    fn due_actions_pop_in_due_order() {
        let mut queue = DeferredQueue::new();
        let mut late = ScheduledAction::recount(&acct("aaa"));
        late.delay_secs = 50;
        let mut early = ScheduledAction::recount(&acct("zzz"));
        early.delay_secs = 10;
        queue.enqueue(late, Timestamp::new(0)).unwrap();
        queue.enqueue(early, Timestamp::new(0)).unwrap();

        let popped = queue.pop_due(Timestamp::new(100));
        let senders: Vec<&str> = popped.iter().map(|a| a.sender_id.as_str()).collect();
        assert_eq!(senders, vec!["zzz", "aaa"]);
    }

    #[test]
    fn decoded_queue_keeps_due_times_and_order() {
        let mut queue = DeferredQueue::new();
        let contract = acct("referendum");
        queue
            .enqueue(ScheduledAction::recount(&contract), Timestamp::new(40))
            .unwrap();

        let mut decoded = DeferredQueue::from_bytes(&queue.to_bytes().unwrap()).unwrap();
        let (due, action) = decoded.pending(&contract).unwrap();
        assert_eq!(due, Timestamp::new(40 + TALLY_INTERVAL_SECS));
        assert_eq!(*action, ScheduledAction::recount(&contract));

        // Sequence numbering carries on, so later entries still sort after.
        let mut other = ScheduledAction::recount(&acct("aaa"));
        other.delay_secs = TALLY_INTERVAL_SECS;
        decoded.enqueue(other, Timestamp::new(40)).unwrap();
        let popped = decoded.pop_due(Timestamp::new(40 + TALLY_INTERVAL_SECS));
        let senders: Vec<&str> = popped.iter().map(|a| a.sender_id.as_str()).collect();
        assert_eq!(senders, vec!["referendum", "aaa"]);
    }
}
