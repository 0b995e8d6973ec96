//! Nullable infrastructure for deterministic testing.
//!
//! Everything the referendum engine reaches outside itself for (storage,
//! stake balances, signature checks, time) sits behind a trait. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod auth;
pub mod clock;
pub mod oracle;
pub mod store;

pub use auth::NullAuthorizer;
pub use clock::NullClock;
pub use oracle::NullStakeOracle;
pub use store::NullStore;
