//! Fundamental types for the referendum workspace.
//!
//! Account names, ballot sides and timestamps shared by every other crate.

pub mod account;
pub mod error;
pub mod side;
pub mod time;

pub use account::AccountName;
pub use error::TypesError;
pub use side::VoteSide;
pub use time::Timestamp;
