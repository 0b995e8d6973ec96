//! Abstract storage traits for the referendum.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod referendum;

pub use error::StoreError;
pub use referendum::ReferendumStore;
