//! A recurring, stake-weighted yes/no referendum.
//!
//! Voters register one ballot each. Once a day the publisher (and after
//! that, the referendum itself via a deferred action) tallies every ballot
//! against the voters' current stake:
//!
//! - a day passes when participation beats the quorum and yes stake leads
//!   no stake by more than the margin;
//! - passing days extend a consecutive run, failing days reset it;
//! - after a failure the vote closes once a full sustained run can no
//!   longer fit in the vote window.
//!
//! Identity, stake and scheduling are supplied by the host through the
//! [`Authorizer`], [`StakeOracle`] and [`DeferredQueue`] seams.

pub mod auth;
pub mod ballot;
mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod schedule;
pub mod state;
pub mod tally;

pub use auth::{Authorizer, SignerAuthorizer};
pub use ballot::{Ballot, BallotBox};
pub use config::{ReferendumConfig, ReferendumParams};
pub use engine::ReferendumEngine;
pub use error::ReferendumError;
pub use oracle::StakeOracle;
pub use schedule::{Action, DeferredQueue, ScheduledAction, TALLY_INTERVAL_SECS};
pub use state::ReferendumState;
pub use tally::{DayTally, TallyOutcome};
